//! `argumem` — terminal client for the ArguMem knowledge base.
//!
//! # Usage
//!
//! ```
//! argumem --url http://localhost:8000
//! argumem --config ~/.config/argumem/config.toml
//! ```

mod app;
mod client;
mod credential;
mod form;
mod ui;

#[cfg(test)]
mod tests;

use std::{
  fs::{self, OpenOptions},
  io,
  path::{Path, PathBuf},
  sync::Mutex,
  time::Duration,
};

use anyhow::{Context, Result};
use app::{App, Fetched};
use argumem_core::{credential::CredentialStore, gateway::Gateway};
use clap::Parser;
use client::{ApiConfig, HttpGateway};
use credential::FileCredentialStore;
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "argumem", version, about = "Terminal client for ArguMem")]
struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the ArguMem API (default: http://localhost:8000).
  #[arg(long, env = "ARGUMEM_URL")]
  url: Option<String>,

  /// Where the API key is stored.
  #[arg(long, value_name = "FILE")]
  credential_file: Option<PathBuf>,

  /// Where log output goes.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,
}

// ─── Settings ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Settings {
  base_url:        String,
  timeout_secs:    u64,
  credential_file: PathBuf,
  log_file:        PathBuf,
}

fn app_dir(base: Option<PathBuf>) -> PathBuf {
  base.unwrap_or_else(|| PathBuf::from(".")).join("argumem")
}

fn path_str(path: Option<&Path>) -> Option<String> {
  path.map(|p| p.display().to_string())
}

/// Defaults, then the config file, then `ARGUMEM_*`, then flags.
fn load_settings(args: &Args) -> Result<Settings> {
  let config_file = args
    .config
    .clone()
    .unwrap_or_else(|| app_dir(dirs::config_dir()).join("config.toml"));
  let credential_default = FileCredentialStore::default_path()
    .unwrap_or_else(|| app_dir(None).join("credentials.toml"));
  let log_default = app_dir(dirs::data_dir()).join("argumem.log");

  let settings = config::Config::builder()
    .set_default("base_url", "http://localhost:8000")?
    .set_default("timeout_secs", 120)?
    .set_default("credential_file", credential_default.display().to_string())?
    .set_default("log_file", log_default.display().to_string())?
    .add_source(config::File::from(config_file).required(args.config.is_some()))
    .add_source(config::Environment::with_prefix("ARGUMEM"))
    .set_override_option("base_url", args.url.clone())?
    .set_override_option("credential_file", path_str(args.credential_file.as_deref()))?
    .set_override_option("log_file", path_str(args.log_file.as_deref()))?
    .build()
    .context("failed to read configuration")?;

  settings
    .try_deserialize()
    .context("failed to deserialise settings")
}

// ─── Logging ──────────────────────────────────────────────────────────────────

/// Log to `path`; the terminal belongs to the UI. Returns whether logging is
/// on.
fn init_logging(path: &Path) -> bool {
  if let Some(parent) = path.parent() {
    let _ = fs::create_dir_all(parent);
  }
  let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
    return false;
  };

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var("ARGUMEM_LOG")
        .from_env_lossy(),
    )
    .with_writer(Mutex::new(file))
    .with_ansi(false)
    .init();
  true
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let settings = load_settings(&args)?;

  let logging = init_logging(&settings.log_file);

  let gateway = HttpGateway::new(ApiConfig {
    base_url: settings.base_url,
    timeout:  Duration::from_secs(settings.timeout_secs),
  })?;
  let credentials = FileCredentialStore::new(settings.credential_file);
  if logging {
    tracing::info!(
      base_url = gateway.base_url(),
      credential_file = %credentials.path().display(),
      "starting argumem"
    );
  }
  let (mut app, rx) = App::new(gateway, credentials);

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  app.start();

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app, rx).await;

  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop<G, C>(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App<G, C>,
  mut rx: UnboundedReceiver<Fetched>,
) -> Result<()>
where
  G: Gateway + 'static,
  C: CredentialStore,
{
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Fold in whatever finished since the last frame.
    while let Ok(msg) = rx.try_recv() {
      app.apply(msg);
    }

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event {
      if key.kind == KeyEventKind::Press && !app.handle_key(key) {
        break;
      }
    }
  }

  Ok(())
}
