//! File-backed [`CredentialStore`]: the terminal equivalent of the browser's
//! local storage.

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::{
  fs,
  io::{ErrorKind, Write},
  path::{Path, PathBuf},
};

use argumem_core::{
  Error, Result,
  credential::{Credential, CredentialStore},
};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

/// On-disk shape: `api_key = "sk-..."`.
#[derive(Serialize, Deserialize, Default)]
struct CredentialFile {
  #[serde(default)]
  api_key: String,
}

/// Stores the API key in a small TOML file.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
  path: PathBuf,
}

impl FileCredentialStore {
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

  pub fn path(&self) -> &Path { &self.path }

  /// `<config dir>/argumem/credentials.toml`
  pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("argumem").join("credentials.toml"))
  }
}

fn storage(action: &str, path: &Path, err: impl std::fmt::Display) -> Error {
  Error::Storage(format!("{action} {}: {err}", path.display()))
}

impl CredentialStore for FileCredentialStore {
  fn load(&self) -> Result<Option<Credential>> {
    let raw = match fs::read_to_string(&self.path) {
      Ok(raw) => raw,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(storage("reading", &self.path, e)),
    };
    let file: CredentialFile =
      toml::from_str(&raw).map_err(|e| storage("parsing", &self.path, e))?;
    Ok(Credential::new(&file.api_key).ok())
  }

  /// Written to a temporary file next to the target, then renamed over it,
  /// so a reader never sees a partial key. On unix the file is `0600`.
  fn save(&self, credential: &Credential) -> Result<()> {
    let dir = match self.path.parent() {
      Some(parent) if !parent.as_os_str().is_empty() => parent,
      _ => Path::new("."),
    };
    fs::create_dir_all(dir)
      .map_err(|e| storage("creating directory for", &self.path, e))?;
    let body = toml::to_string(&CredentialFile {
      api_key: credential.as_str().to_string(),
    })
    .map_err(|e| storage("encoding", &self.path, e))?;

    let mut tmp = NamedTempFile::new_in(dir)
      .map_err(|e| storage("creating temporary file for", &self.path, e))?;
    #[cfg(unix)]
    tmp
      .as_file()
      .set_permissions(fs::Permissions::from_mode(0o600))
      .map_err(|e| storage("restricting permissions on", &self.path, e))?;
    tmp
      .write_all(body.as_bytes())
      .map_err(|e| storage("writing", &self.path, e))?;
    tmp
      .persist(&self.path)
      .map_err(|e| storage("replacing", &self.path, e))?;

    tracing::info!(path = %self.path.display(), "API key saved");
    Ok(())
  }

  fn clear(&self) -> Result<()> {
    match fs::remove_file(&self.path) {
      Ok(()) => {
        tracing::info!(path = %self.path.display(), "API key cleared");
        Ok(())
      }
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
      Err(e) => Err(storage("removing", &self.path, e)),
    }
  }
}
