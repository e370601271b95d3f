//! All sources, newest first.

use argumem_core::{
  credential::CredentialStore,
  gateway::Gateway,
  model::{format_timestamp, truncate},
};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Style},
  text::{Line, Span},
  widgets::{List, ListItem, ListState},
};

use super::{cursor_style, draw_filter, draw_unready, hint, pane_block};
use crate::app::{App, Pane};

pub fn draw<G, C>(f: &mut Frame, area: Rect, app: &App<G, C>)
where
  G: Gateway + 'static,
  C: CredentialStore,
{
  let Pane::Sources(load) = &app.pane else {
    return;
  };
  let total = load.ready().map_or(0, Vec::len);
  let visible = app.visible_sources();

  let title = if app.filter_active || !app.filter.is_empty() {
    format!("Sources ({}/{})", visible.len(), total)
  } else {
    format!("Sources ({total})")
  };
  let block = pane_block(&title);
  let mut inner = block.inner(area);
  f.render_widget(block, area);

  if draw_unready(f, inner, load, "sources") {
    return;
  }
  if total == 0 {
    hint(f, inner, "No sources yet. Add a memory to get started.");
    return;
  }
  draw_filter(f, &mut inner, app);

  let items: Vec<ListItem> = visible
    .iter()
    .enumerate()
    .map(|(i, source)| {
      let style = cursor_style(i == app.cursor);
      ListItem::new(vec![
        Line::from(vec![
          Span::styled(source.display_title(), style),
          Span::styled(
            format!("  {}", format_timestamp(&source.timestamp)),
            Style::default().fg(Color::DarkGray),
          ),
        ]),
        Line::from(Span::styled(
          format!("  {}", truncate(&source.context, 80)),
          Style::default().fg(Color::Gray),
        )),
      ])
    })
    .collect();

  let mut state = ListState::default();
  state.select((!visible.is_empty()).then_some(app.cursor));
  f.render_stateful_widget(List::new(items), inner, &mut state);
}
