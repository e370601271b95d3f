//! One quotation with its source excerpt and derived propositions.

use argumem_core::{aggregate::QuotationView, load::Load, model::format_timestamp};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Paragraph, Wrap},
};

use super::{draw_unready, pane_block};

pub fn draw(f: &mut Frame, area: Rect, load: &Load<QuotationView>, cursor: usize) {
  let block = pane_block("Quotation");
  let inner = block.inner(area);
  f.render_widget(block, area);

  if draw_unready(f, inner, load, "quotation") {
    return;
  }
  let Some(view) = load.ready() else {
    return;
  };
  let q = &view.quotation;

  let heading = Style::default()
    .fg(Color::Cyan)
    .add_modifier(Modifier::BOLD);
  let dim = Style::default().fg(Color::DarkGray);

  let mut lines = vec![
    Line::from(Span::styled(
      format!("\"{}\"", q.quotation_text),
      Style::default().add_modifier(Modifier::ITALIC),
    )),
  ];
  if let Some(locator) = &q.locator {
    lines.push(Line::from(Span::styled(format!("Location: {locator}"), dim)));
  }

  lines.push(Line::from(""));
  lines.push(Line::from(Span::styled("Source", heading)));
  lines.push(Line::from(vec![
    Span::raw(q.source_display_title()),
    Span::styled(format!("  {}", format_timestamp(&q.source_timestamp)), dim),
  ]));
  lines.push(Line::from(Span::styled(q.source_context.clone(), dim)));
  lines.extend(q.source_text.lines().map(|l| Line::from(format!("  {l}"))));

  lines.push(Line::from(""));
  lines.push(Line::from(Span::styled(
    format!("Propositions ({})", view.propositions.len()),
    heading,
  )));
  if view.propositions.is_empty() {
    lines.push(Line::from(Span::styled(
      "No propositions derived from this quotation.",
      dim,
    )));
  }
  for (i, p) in view.propositions.iter().enumerate() {
    let marker = if i == cursor { "▸ " } else { "  " };
    lines.push(Line::from(vec![
      Span::styled(marker, Style::default().fg(Color::Yellow)),
      Span::raw(p.proposition_text.clone()),
    ]));
    if let Some(paraphrase) = &p.paraphrase {
      lines.push(Line::from(Span::styled(format!("    {paraphrase}"), dim)));
    }
  }

  f.render_widget(
    Paragraph::new(lines).wrap(Wrap { trim: false }),
    inner,
  );
}
