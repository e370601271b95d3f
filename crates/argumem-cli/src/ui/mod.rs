//! TUI rendering: header, sidebar, active view, status bar and modals.

pub mod memory_form;
pub mod modal;
pub mod quotation_detail;
pub mod quotation_list;
pub mod recent;
pub mod sidebar;
pub mod source_detail;
pub mod source_list;

use argumem_core::{
  confirm::ClearPhase, credential::CredentialStore, gateway::Gateway,
  load::Load,
};
use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::{App, Pane};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw<G, C>(f: &mut Frame, app: &App<G, C>)
where
  G: Gateway + 'static,
  C: CredentialStore,
{
  let area = f.area();

  // Vertical stack: header, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(2), // title + subtitle
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  draw_body(f, rows[1], app);
  draw_status(f, rows[2], app);

  // Modals last so they sit on top.
  if let Some(prompt) = &app.prompt {
    modal::draw_credential_prompt(f, area, prompt, app.credential.is_some());
  } else if app.confirmer.phase() != ClearPhase::Idle {
    modal::draw_clear_confirm(f, area, app);
  }
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header<G, C>(f: &mut Frame, area: Rect, app: &App<G, C>)
where
  G: Gateway + 'static,
  C: CredentialStore,
{
  let heading = app.heading();
  let date = Local::now().format("%Y-%m-%d").to_string();

  let title = Span::styled(
    format!(" {}", heading.title),
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(format!("{date} "), Style::default().fg(Color::DarkGray));

  let pad = area
    .width
    .saturating_sub(title.content.chars().count() as u16)
    .saturating_sub(right.content.len() as u16);

  let lines = vec![
    Line::from(vec![title, Span::raw(" ".repeat(pad as usize)), right]),
    Line::from(Span::styled(
      format!(" {}", heading.subtitle),
      Style::default().fg(Color::Gray),
    )),
  ];

  f.render_widget(
    Paragraph::new(lines).style(Style::default().bg(Color::DarkGray)),
    area,
  );
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body<G, C>(f: &mut Frame, area: Rect, app: &App<G, C>)
where
  G: Gateway + 'static,
  C: CredentialStore,
{
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Length(26), Constraint::Min(0)])
    .split(area);

  sidebar::draw(f, cols[0], app);

  match &app.pane {
    Pane::Add => memory_form::draw(f, cols[1], &app.form),
    Pane::Sources(_) => source_list::draw(f, cols[1], app),
    Pane::Quotations(_) => quotation_list::draw(f, cols[1], app),
    Pane::Recent(load) => recent::draw(f, cols[1], load, app.cursor),
    Pane::SourceDetail(load) => source_detail::draw(f, cols[1], load, app.cursor),
    Pane::QuotationDetail(load) => {
      quotation_detail::draw(f, cols[1], load, app.cursor)
    }
  }
}

/// Bordered content block titled `title`.
pub(crate) fn pane_block(title: &str) -> Block<'static> {
  Block::default()
    .title(format!(" {title} "))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray))
}

/// Render the loading or error state of `load`.
///
/// Returns `true` if something was drawn, meaning the slot is not ready.
pub(crate) fn draw_unready<T>(
  f: &mut Frame,
  area: Rect,
  load: &Load<T>,
  what: &str,
) -> bool {
  let (text, style) = match load {
    Load::Ready(_) => return false,
    Load::Pending(_) => (
      format!("Loading {what}…"),
      Style::default().fg(Color::DarkGray),
    ),
    Load::Failed(message) => (format!("Error: {message}"), Style::default().fg(Color::Red)),
  };
  f.render_widget(
    Paragraph::new(text).style(style).wrap(Wrap { trim: true }),
    area,
  );
  true
}

/// A dimmed one-line hint, used for empty states.
pub(crate) fn hint(f: &mut Frame, area: Rect, text: &str) {
  f.render_widget(
    Paragraph::new(text.to_string())
      .style(Style::default().fg(Color::DarkGray))
      .wrap(Wrap { trim: true }),
    area,
  );
}

/// Filter bar on the last line of `area`, shrinking `area` to make room.
pub(crate) fn draw_filter<G, C>(f: &mut Frame, area: &mut Rect, app: &App<G, C>)
where
  G: Gateway + 'static,
  C: CredentialStore,
{
  if !(app.filter_active || !app.filter.is_empty()) || area.height < 3 {
    return;
  }
  let filter_area = Rect {
    y: area.y + area.height - 1,
    height: 1,
    ..*area
  };
  area.height -= 1;

  let text = if app.filter_active {
    format!("/{}_", app.filter)
  } else {
    format!("/{}", app.filter)
  };
  f.render_widget(
    Paragraph::new(text).style(Style::default().fg(Color::Yellow)),
    filter_area,
  );
}

/// Row style for the cursor line.
pub(crate) fn cursor_style(selected: bool) -> Style {
  if selected {
    Style::default()
      .bg(Color::Blue)
      .fg(Color::White)
      .add_modifier(Modifier::BOLD)
  } else {
    Style::default()
  }
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status<G, C>(f: &mut Frame, area: Rect, app: &App<G, C>)
where
  G: Gateway + 'static,
  C: CredentialStore,
{
  let (mode_label, hints) = if app.prompt.is_some() {
    ("API KEY", "Enter save  Ctrl-R show/hide  Ctrl-X clear saved key")
  } else if app.confirmer.phase() != ClearPhase::Idle {
    ("CONFIRM", "y confirm  n/Esc cancel")
  } else if app.filter_active {
    ("SEARCH", "Type to filter  Esc cancel  Enter select")
  } else if app.form.editing && matches!(app.pane, Pane::Add) {
    ("EDIT", "Type to edit  Tab next field  Esc stop editing  Ctrl-S submit")
  } else {
    match &app.pane {
      Pane::Add => (
        "ADD",
        "Tab/jk field  Enter edit  Ctrl-S submit  o open source  1-4 views  q quit",
      ),
      Pane::Sources(_) => ("SOURCES", "jk navigate  Enter open  / search  r refresh  q quit"),
      Pane::Quotations(_) => (
        "QUOTATIONS",
        "jk navigate  Enter open  s source  / search  r refresh  q quit",
      ),
      Pane::Recent(_) => ("RECENT", "jk navigate  Enter open  r refresh  q quit"),
      Pane::SourceDetail(_) => ("SOURCE", "jk navigate  Enter quotation  Esc back  q quit"),
      Pane::QuotationDetail(_) => ("QUOTATION", "s source  Esc back  q quit"),
    }
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let line = Line::from(vec![
    Span::styled(
      format!(" {mode_label} "),
      Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    ),
    Span::styled(format!("  {status}"), Style::default().fg(Color::DarkGray)),
  ]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}
