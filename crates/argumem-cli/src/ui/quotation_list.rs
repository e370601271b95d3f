//! All quotations with their source attribution.

use argumem_core::{credential::CredentialStore, gateway::Gateway, model::truncate};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
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
  let Pane::Quotations(load) = &app.pane else {
    return;
  };
  let total = load.ready().map_or(0, Vec::len);
  let visible = app.visible_quotations();

  let title = if app.filter_active || !app.filter.is_empty() {
    format!("Quotations ({}/{})", visible.len(), total)
  } else {
    format!("Quotations ({total})")
  };
  let block = pane_block(&title);
  let mut inner = block.inner(area);
  f.render_widget(block, area);

  if draw_unready(f, inner, load, "quotations") {
    return;
  }
  if total == 0 {
    hint(f, inner, "No quotations found.");
    return;
  }
  draw_filter(f, &mut inner, app);

  let width = inner.width.saturating_sub(4) as usize;
  let items: Vec<ListItem> = visible
    .iter()
    .enumerate()
    .map(|(i, q)| {
      let style = cursor_style(i == app.cursor);
      let mut attribution = vec![Span::styled(
        format!("  — {}", q.source_label().unwrap_or_else(|| "Unknown source".into())),
        Style::default()
          .fg(Color::Cyan)
          .add_modifier(Modifier::ITALIC),
      )];
      if let Some(locator) = &q.locator {
        attribution.push(Span::styled(
          format!(" ({locator})"),
          Style::default().fg(Color::DarkGray),
        ));
      }
      ListItem::new(vec![
        Line::from(Span::styled(
          format!("\"{}\"", truncate(&q.quotation_text, width.max(20))),
          style,
        )),
        Line::from(attribution),
      ])
    })
    .collect();

  let mut state = ListState::default();
  state.select((!visible.is_empty()).then_some(app.cursor));
  f.render_stateful_widget(List::new(items), inner, &mut state);
}
