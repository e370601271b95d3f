//! One source: metadata, raw text, and the quotations extracted from it.

use argumem_core::{aggregate::SourceDetail, load::Load, model::format_timestamp};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use super::{cursor_style, draw_unready, hint, pane_block};

pub fn draw(f: &mut Frame, area: Rect, load: &Load<SourceDetail>, cursor: usize) {
  let Some(detail) = load.ready() else {
    let block = pane_block("Source");
    let inner = block.inner(area);
    f.render_widget(block, area);
    draw_unready(f, inner, load, "source");
    return;
  };
  let source = &detail.source;

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
    .split(area);

  // ── Source ──────────────────────────────────────────────────────────────

  let block = pane_block(&source.display_title());
  let label = Style::default()
    .fg(Color::Cyan)
    .add_modifier(Modifier::BOLD);
  let mut lines = vec![
    Line::from(vec![
      Span::styled(format!("{:<10}", "Context"), label),
      Span::raw(source.context.clone()),
    ]),
    Line::from(vec![
      Span::styled(format!("{:<10}", "Added"), label),
      Span::raw(format_timestamp(&source.timestamp)),
    ]),
    Line::from(""),
  ];
  lines.extend(source.raw_text.lines().map(|l| Line::from(l.to_string())));

  f.render_widget(
    Paragraph::new(lines)
      .block(block)
      .wrap(Wrap { trim: false }),
    rows[0],
  );

  // ── Quotations ──────────────────────────────────────────────────────────

  let block = Block::default()
    .title(format!(" Quotations ({}) ", detail.quotations.len()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(rows[1]);
  f.render_widget(block, rows[1]);

  if detail.quotations.is_empty() {
    hint(f, inner, "No quotations were extracted from this source.");
    return;
  }

  let items: Vec<ListItem> = detail
    .quotations
    .iter()
    .enumerate()
    .map(|(i, q)| {
      let mut spans = vec![Span::styled(
        format!("\"{}\"", q.quotation_text),
        cursor_style(i == cursor),
      )];
      if let Some(locator) = &q.locator {
        spans.push(Span::styled(
          format!("  ({locator})"),
          Style::default().fg(Color::DarkGray),
        ));
      }
      ListItem::new(Line::from(spans))
    })
    .collect();

  let mut state = ListState::default();
  state.select(Some(cursor));
  f.render_stateful_widget(List::new(items), inner, &mut state);
}
