//! Centered overlays: the API-key prompt and the clear-database confirmation.

use argumem_core::{
  confirm::ClearPhase, credential::CredentialStore, gateway::Gateway,
};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Flex, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::{App, CredentialPrompt};

fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let [row] = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(height)])
    .flex(Flex::Center)
    .areas(area);
  let [cell] = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Length(width)])
    .flex(Flex::Center)
    .areas(row);
  cell
}

fn modal_block(title: &str, color: Color) -> Block<'static> {
  Block::default()
    .title(format!(" {title} "))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(color))
}

pub fn draw_credential_prompt(
  f: &mut Frame,
  area: Rect,
  prompt: &CredentialPrompt,
  has_saved: bool,
) {
  let rect = centered(area, 64.min(area.width), 11.min(area.height));
  f.render_widget(Clear, rect);

  let shown = if prompt.reveal {
    prompt.input.clone()
  } else {
    "•".repeat(prompt.input.chars().count())
  };
  let dim = Style::default().fg(Color::DarkGray);

  let mut lines = vec![
    Line::from("Enter your OpenAI API key. It is sent with each new memory"),
    Line::from("so the server can extract quotations."),
    Line::from(""),
    Line::from(vec![
      Span::styled("Key: ", Style::default().fg(Color::Cyan)),
      Span::raw(format!("{shown}_")),
    ]),
    Line::from(""),
  ];
  if let Some(error) = &prompt.error {
    lines.push(Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red))));
  }
  let clear_hint = if has_saved { "  Ctrl-X clear saved key" } else { "" };
  lines.push(Line::from(Span::styled(
    format!(
      "Enter save  Ctrl-R {}{clear_hint}",
      if prompt.reveal { "hide" } else { "show" }
    ),
    dim,
  )));

  f.render_widget(
    Paragraph::new(lines)
      .block(modal_block("OpenAI API Key", Color::Cyan))
      .wrap(Wrap { trim: false }),
    rect,
  );
}

pub fn draw_clear_confirm<G, C>(f: &mut Frame, area: Rect, app: &App<G, C>)
where
  G: Gateway + 'static,
  C: CredentialStore,
{
  let rect = centered(area, 56.min(area.width), 12.min(area.height));
  f.render_widget(Clear, rect);

  let warn = Style::default()
    .fg(Color::Red)
    .add_modifier(Modifier::BOLD);
  let mut lines = vec![
    Line::from(Span::styled("This permanently deletes everything:", warn)),
    Line::from(""),
  ];
  if let Some(stats) = app.stats.ready() {
    for (label, n) in [
      ("sources", stats.total_sources),
      ("quotations", stats.total_quotations),
      ("propositions", stats.total_propositions),
      ("arguments", stats.total_arguments),
    ] {
      lines.push(Line::from(format!("  • {n} {label}")));
    }
  }
  lines.push(Line::from(""));
  lines.push(match app.confirmer.phase() {
    ClearPhase::Clearing => Line::from(Span::styled(
      "Clearing…",
      Style::default().fg(Color::Yellow),
    )),
    _ => Line::from(Span::styled(
      "y  yes, clear all data    n  cancel",
      Style::default().fg(Color::DarkGray),
    )),
  });

  f.render_widget(
    Paragraph::new(lines).block(modal_block("Clear Database", Color::Red)),
    rect,
  );
}
