//! The heterogeneous "recent activity" feed.
//!
//! `GET /recent` interleaves sources, quotations and propositions. Each row
//! carries a `type` discriminant plus fields that only make sense for that
//! type, so it is decoded into a tagged enum rather than a struct of options.

use serde::{Deserialize, Serialize};

use crate::{
  model::{PropositionId, QuotationId, SourceId, display_source_title},
  view::ViewState,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecentItem {
  Source(RecentSource),
  Quotation(RecentQuotation),
  Proposition(RecentProposition),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentSource {
  pub id:        SourceId,
  pub timestamp: String,
  #[serde(default)]
  pub title:     Option<String>,
  #[serde(default)]
  pub preview:   String,
  #[serde(default)]
  pub context:   String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentQuotation {
  pub id:           QuotationId,
  pub timestamp:    String,
  #[serde(default)]
  pub title:        Option<String>,
  #[serde(default)]
  pub preview:      String,
  #[serde(default)]
  pub locator:      Option<String>,
  #[serde(default)]
  pub source_id:    Option<SourceId>,
  #[serde(default)]
  pub source_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentProposition {
  pub id:           PropositionId,
  pub timestamp:    String,
  #[serde(default)]
  pub title:        Option<String>,
  #[serde(default)]
  pub preview:      String,
  #[serde(default)]
  pub paraphrase:   Option<String>,
  #[serde(default)]
  pub quotation_id: Option<QuotationId>,
}

impl RecentItem {
  pub fn id(&self) -> i64 {
    match self {
      Self::Source(s) => s.id,
      Self::Quotation(q) => q.id,
      Self::Proposition(p) => p.id,
    }
  }

  pub fn timestamp(&self) -> &str {
    match self {
      Self::Source(s) => &s.timestamp,
      Self::Quotation(q) => &q.timestamp,
      Self::Proposition(p) => &p.timestamp,
    }
  }

  pub fn preview(&self) -> &str {
    match self {
      Self::Source(s) => &s.preview,
      Self::Quotation(q) => &q.preview,
      Self::Proposition(p) => &p.preview,
    }
  }

  /// Wire discriminant, also used as the row label.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Source(_) => "source",
      Self::Quotation(_) => "quotation",
      Self::Proposition(_) => "proposition",
    }
  }

  /// Heading for the row, falling back to `<Kind> #<id>`.
  pub fn display_title(&self) -> String {
    match self {
      Self::Source(s) => display_source_title(s.id, s.title.as_deref()),
      Self::Quotation(q) => q
        .title
        .clone()
        .unwrap_or_else(|| format!("Quotation #{}", q.id)),
      Self::Proposition(p) => p
        .title
        .clone()
        .unwrap_or_else(|| format!("Proposition #{}", p.id)),
    }
  }

  /// Secondary line: context, locator/source, or paraphrase.
  pub fn detail(&self) -> Option<String> {
    match self {
      Self::Source(s) => (!s.context.is_empty()).then(|| s.context.clone()),
      Self::Quotation(q) => {
        let source = q
          .source_id
          .map(|id| display_source_title(id, q.source_title.as_deref()));
        match (q.locator.as_deref(), source) {
          (Some(loc), Some(src)) => Some(format!("{src} • {loc}")),
          (Some(loc), None) => Some(loc.to_string()),
          (None, src) => src,
        }
      }
      Self::Proposition(p) => p.paraphrase.clone(),
    }
  }

  /// Where selecting this row navigates to.
  ///
  /// Propositions have no detail view of their own; they open their
  /// quotation when the server says which one it is.
  pub fn target(&self) -> Option<ViewState> {
    match self {
      Self::Source(s) => Some(ViewState::SourceDetail(s.id)),
      Self::Quotation(q) => Some(ViewState::QuotationDetail(q.id)),
      Self::Proposition(p) => p.quotation_id.map(ViewState::QuotationDetail),
    }
  }
}

/// Row shape of the legacy `GET /sources/recent` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyRecentSource {
  pub id:          SourceId,
  #[serde(default)]
  pub title:       Option<String>,
  pub created_at:  String,
  pub last_edited: String,
}

impl From<LegacyRecentSource> for RecentItem {
  fn from(legacy: LegacyRecentSource) -> Self {
    Self::Source(RecentSource {
      id:        legacy.id,
      timestamp: legacy.last_edited,
      title:     legacy.title,
      preview:   String::new(),
      context:   String::new(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const FEED: &str = r#"[
    {"type": "source", "id": 2, "timestamp": "2024-05-02 09:00:00",
     "title": null, "preview": "X said 'Y'.", "content": "X said 'Y'.",
     "context": "test"},
    {"type": "quotation", "id": 5, "timestamp": "2024-05-02 09:00:00",
     "title": "Quotation from: Source #2", "preview": "Y", "content": "Y",
     "locator": "p. 4", "source_id": 2, "source_title": null},
    {"type": "proposition", "id": 9, "timestamp": "2024-05-01 08:00:00",
     "title": null, "preview": "Y holds", "paraphrase": "it holds"}
  ]"#;

  #[test]
  fn decodes_mixed_feed_in_server_order() {
    let items: Vec<RecentItem> = serde_json::from_str(FEED).unwrap();
    let kinds: Vec<_> = items.iter().map(RecentItem::kind).collect();
    assert_eq!(kinds, ["source", "quotation", "proposition"]);
    assert_eq!(items[0].display_title(), "Source #2");
    assert_eq!(items[0].detail().as_deref(), Some("test"));
    assert_eq!(items[1].detail().as_deref(), Some("Source #2 • p. 4"));
    assert_eq!(items[2].display_title(), "Proposition #9");
  }

  #[test]
  fn targets_follow_the_item_kind() {
    let items: Vec<RecentItem> = serde_json::from_str(FEED).unwrap();
    assert_eq!(items[0].target(), Some(ViewState::SourceDetail(2)));
    assert_eq!(items[1].target(), Some(ViewState::QuotationDetail(5)));
    assert_eq!(items[2].target(), None);
  }

  #[test]
  fn unknown_discriminant_is_rejected() {
    let res: Result<RecentItem, _> =
      serde_json::from_str(r#"{"type": "argument", "id": 1}"#);
    assert!(res.is_err());
  }

  #[test]
  fn legacy_rows_become_sources() {
    let legacy: LegacyRecentSource = serde_json::from_str(
      r#"{"id": 4, "title": "Notes", "created_at": "a", "last_edited": "b"}"#,
    )
    .unwrap();
    let item = RecentItem::from(legacy);
    assert_eq!(item.target(), Some(ViewState::SourceDetail(4)));
    assert_eq!(item.timestamp(), "b");
  }
}
