//! "Add Memory" form and the result of the last submission.

use argumem_core::model::truncate;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::form::{Field, MemoryForm, Outcome};

pub fn draw(f: &mut Frame, area: Rect, form: &MemoryForm) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(3), // title
      Constraint::Length(3), // context
      Constraint::Min(6),    // content
      Constraint::Length(8), // outcome
    ])
    .split(area);

  for (field, row) in Field::ALL.into_iter().zip(rows.iter()) {
    draw_field(f, *row, form, field);
  }
  draw_outcome(f, rows[3], form);
}

fn draw_field(f: &mut Frame, area: Rect, form: &MemoryForm, field: Field) {
  let focused = form.focus == field;
  let border = match (focused, form.editing) {
    (true, true) => Style::default().fg(Color::Yellow),
    (true, false) => Style::default().fg(Color::Cyan),
    _ => Style::default().fg(Color::DarkGray),
  };

  let mut text = form.value(field).to_string();
  if focused && form.editing {
    text.push('_');
  }

  let block = Block::default()
    .title(format!(" {} ", field.label()))
    .borders(Borders::ALL)
    .border_style(border);

  f.render_widget(
    Paragraph::new(text)
      .block(block)
      .wrap(Wrap { trim: false }),
    area,
  );
}

fn draw_outcome(f: &mut Frame, area: Rect, form: &MemoryForm) {
  let block = Block::default()
    .borders(Borders::TOP)
    .border_style(Style::default().fg(Color::DarkGray));

  let lines: Vec<Line> = if form.submitting {
    vec![Line::from(Span::styled(
      "Processing…",
      Style::default().fg(Color::Yellow),
    ))]
  } else {
    match &form.outcome {
      None => Vec::new(),
      Some(Outcome::Failed(message)) => vec![Line::from(Span::styled(
        message.clone(),
        Style::default().fg(Color::Red),
      ))],
      Some(Outcome::Created {
        message,
        quotations,
        ..
      }) => {
        let mut lines = vec![Line::from(Span::styled(
          message.clone(),
          Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
        ))];
        if quotations.is_empty() {
          lines.push(Line::from(Span::styled(
            "No quotations extracted.",
            Style::default().fg(Color::DarkGray),
          )));
        } else {
          lines.push(Line::from(format!(
            "Extracted {} quotation(s):",
            quotations.len()
          )));
          lines.extend(quotations.iter().map(|q| {
            Line::from(vec![
              Span::styled("  • ", Style::default().fg(Color::DarkGray)),
              Span::raw(format!("\"{}\"", truncate(&q.quotation_text, 100))),
            ])
          }));
        }
        lines
      }
    }
  };

  f.render_widget(
    Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
    area,
  );
}
