//! Left column: view navigation, database stats and key hints.

use argumem_core::{
  credential::CredentialStore, gateway::Gateway, load::Load,
  model::DatabaseStats, view::ViewKind,
};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::App;

pub fn draw<G, C>(f: &mut Frame, area: Rect, app: &App<G, C>)
where
  G: Gateway + 'static,
  C: CredentialStore,
{
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(ViewKind::ALL.len() as u16 + 2),
      Constraint::Length(7),
      Constraint::Min(0),
    ])
    .split(area);

  draw_nav(f, rows[0], app.view().section());
  draw_stats(f, rows[1], &app.stats);
  draw_footer(f, rows[2], app.credential.as_ref().map(|c| c.masked()));
}

fn draw_nav(f: &mut Frame, area: Rect, active: ViewKind) {
  let block = Block::default()
    .title(" ArguMem ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let lines: Vec<Line> = ViewKind::ALL
    .iter()
    .enumerate()
    .map(|(i, kind)| {
      let style = if *kind == active {
        Style::default()
          .fg(Color::Cyan)
          .add_modifier(Modifier::BOLD)
      } else {
        Style::default()
      };
      Line::from(vec![
        Span::styled(format!(" {} ", i + 1), Style::default().fg(Color::DarkGray)),
        Span::styled(kind.label(), style),
      ])
    })
    .collect();

  f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_stats(f: &mut Frame, area: Rect, stats: &Load<DatabaseStats>) {
  let block = Block::default()
    .title(" Database ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let lines = match stats {
    Load::Pending(_) => vec![Line::from(Span::styled(
      "Loading…",
      Style::default().fg(Color::DarkGray),
    ))],
    Load::Failed(message) => vec![Line::from(Span::styled(
      message.clone(),
      Style::default().fg(Color::Red),
    ))],
    Load::Ready(stats) => [
      ("Sources", stats.total_sources, Some(ViewKind::Sources)),
      ("Quotations", stats.total_quotations, Some(ViewKind::Quotations)),
      ("Propositions", stats.total_propositions, None),
      ("Arguments", stats.total_arguments, None),
    ]
    .into_iter()
    .map(|(label, n, view)| {
      let mut spans = vec![
        Span::styled(format!("{label:<13}"), Style::default().fg(Color::Cyan)),
        Span::raw(n.to_string()),
      ];
      // Shortcut key for lists that have something in them.
      if let Some(key) = view.filter(|_| n > 0).and_then(shortcut) {
        spans.push(Span::styled(
          format!(" [{key}]"),
          Style::default().fg(Color::DarkGray),
        ));
      }
      Line::from(spans)
    })
    .collect(),
  };

  f.render_widget(Paragraph::new(lines), inner);
}

/// Number key that jumps to `kind`.
fn shortcut(kind: ViewKind) -> Option<usize> {
  ViewKind::ALL.iter().position(|k| *k == kind).map(|i| i + 1)
}

fn draw_footer(f: &mut Frame, area: Rect, masked_key: Option<String>) {
  let key_line = match masked_key {
    Some(masked) => Line::from(vec![
      Span::styled("key ", Style::default().fg(Color::DarkGray)),
      Span::raw(masked),
    ]),
    None => Line::from(Span::styled(
      "no API key",
      Style::default().fg(Color::Yellow),
    )),
  };
  let lines = vec![
    key_line,
    Line::from(""),
    Line::from(Span::styled(
      "a  API key",
      Style::default().fg(Color::DarkGray),
    )),
    Line::from(Span::styled(
      "X  clear database",
      Style::default().fg(Color::DarkGray),
    )),
  ];
  f.render_widget(
    Paragraph::new(lines).block(Block::default().borders(Borders::LEFT | Borders::RIGHT)),
    area,
  );
}
