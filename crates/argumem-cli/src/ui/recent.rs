//! Recent activity across all entity kinds.

use argumem_core::{
  load::Load,
  model::{format_timestamp, truncate},
  recent::RecentItem,
};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{List, ListItem, ListState},
};

use super::{cursor_style, draw_unready, hint, pane_block};

fn kind_color(item: &RecentItem) -> Color {
  match item {
    RecentItem::Source(_) => Color::Green,
    RecentItem::Quotation(_) => Color::Cyan,
    RecentItem::Proposition(_) => Color::Magenta,
  }
}

pub fn draw(f: &mut Frame, area: Rect, load: &Load<Vec<RecentItem>>, cursor: usize) {
  let block = pane_block("Recent Activity");
  let inner = block.inner(area);
  f.render_widget(block, area);

  if draw_unready(f, inner, load, "recent items") {
    return;
  }
  let Some(items) = load.ready() else {
    return;
  };
  if items.is_empty() {
    hint(f, inner, "No recent activity.");
    return;
  }

  let rows: Vec<ListItem> = items
    .iter()
    .enumerate()
    .map(|(i, item)| {
      let mut header = vec![
        Span::styled(
          format!("{:<12}", item.kind()),
          Style::default()
            .fg(kind_color(item))
            .add_modifier(Modifier::BOLD),
        ),
        Span::styled(item.display_title(), cursor_style(i == cursor)),
        Span::styled(
          format!("  {}", format_timestamp(item.timestamp())),
          Style::default().fg(Color::DarkGray),
        ),
      ];
      if item.target().is_none() {
        header.push(Span::styled("  (no link)", Style::default().fg(Color::DarkGray)));
      }

      let mut lines = vec![
        Line::from(header),
        Line::from(Span::raw(format!("            {}", truncate(item.preview(), 120)))),
      ];
      if let Some(detail) = item.detail() {
        lines.push(Line::from(Span::styled(
          format!("            {detail}"),
          Style::default().fg(Color::Gray),
        )));
      }
      ListItem::new(lines)
    })
    .collect();

  let mut state = ListState::default();
  state.select(Some(cursor));
  f.render_stateful_widget(List::new(rows), inner, &mut state);
}
