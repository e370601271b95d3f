//! Entity projections served by the ArguMem backend.
//!
//! All records are owned by the server. The client holds read-only copies and
//! re-fetches them on every view activation; the only thing it builds locally
//! is a [`NewMemory`] draft.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub type SourceId = i64;
pub type QuotationId = i64;
pub type PropositionId = i64;

// ─── Sources ─────────────────────────────────────────────────────────────────

/// A stored unit of raw text plus the context it was recorded in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
  pub id:        SourceId,
  pub timestamp: String,
  #[serde(default)]
  pub title:     Option<String>,
  pub context:   String,
  pub raw_text:  String,
}

impl Source {
  /// The title, or `Source #<id>` for untitled sources.
  pub fn display_title(&self) -> String {
    display_source_title(self.id, self.title.as_deref())
  }
}

/// Shared fallback used wherever a source is named by id and optional title.
pub fn display_source_title(id: SourceId, title: Option<&str>) -> String {
  match title.map(str::trim) {
    Some(t) if !t.is_empty() => t.to_string(),
    _ => format!("Source #{id}"),
  }
}

// ─── Quotations ──────────────────────────────────────────────────────────────

/// A text span extracted from a source.
///
/// `GET /quotations` includes the denormalised source fields;
/// `GET /sources/{id}/quotations` omits them, hence the options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quotation {
  pub id:             QuotationId,
  pub quotation_text: String,
  #[serde(default)]
  pub locator:        Option<String>,
  #[serde(default)]
  pub source_id:      Option<SourceId>,
  #[serde(default)]
  pub source_title:   Option<String>,
  #[serde(default)]
  pub source_context: Option<String>,
}

impl Quotation {
  /// Name of the owning source for list display, if the row carries one.
  pub fn source_label(&self) -> Option<String> {
    self
      .source_id
      .map(|id| display_source_title(id, self.source_title.as_deref()))
  }
}

/// `GET /quotations/{id}`: a quotation with its source embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotationDetail {
  pub id:               QuotationId,
  pub quotation_text:   String,
  #[serde(default)]
  pub locator:          Option<String>,
  pub source_id:        SourceId,
  #[serde(default)]
  pub source_title:     Option<String>,
  pub source_context:   String,
  pub source_text:      String,
  pub source_timestamp: String,
}

impl QuotationDetail {
  pub fn source_display_title(&self) -> String {
    display_source_title(self.source_id, self.source_title.as_deref())
  }
}

// ─── Propositions ────────────────────────────────────────────────────────────

/// A claim derived from a quotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposition {
  pub id:               PropositionId,
  pub proposition_text: String,
  #[serde(default)]
  pub paraphrase:       Option<String>,
}

// ─── Stats ───────────────────────────────────────────────────────────────────

/// `GET /database/info`, recomputed by the server on every request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseStats {
  pub total_sources:      u64,
  pub total_quotations:   u64,
  pub total_propositions: u64,
  pub total_arguments:    u64,
}

impl DatabaseStats {
  pub fn total(&self) -> u64 {
    self.total_sources
      + self.total_quotations
      + self.total_propositions
      + self.total_arguments
  }

  pub fn is_empty(&self) -> bool { self.total() == 0 }
}

// ─── Memory creation ─────────────────────────────────────────────────────────

/// Body of `POST /memories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewMemory {
  pub content: String,
  pub context: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title:   Option<String>,
}

impl NewMemory {
  /// Build a draft from raw form input.
  ///
  /// Every field is trimmed and a blank title becomes `None`. Blank content
  /// or context is a [`Error::ValidationError`].
  pub fn new(content: &str, context: &str, title: &str) -> Result<Self> {
    let content = content.trim();
    let context = context.trim();
    let title = title.trim();

    if context.is_empty() {
      return Err(Error::ValidationError("Context is required".into()));
    }
    if content.is_empty() {
      return Err(Error::ValidationError("Content is required".into()));
    }

    Ok(Self {
      content: content.to_string(),
      context: context.to_string(),
      title:   (!title.is_empty()).then(|| title.to_string()),
    })
  }
}

/// Response of `POST /memories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryCreated {
  pub source_id: SourceId,
  pub message:   String,
}

// ─── Display helpers ─────────────────────────────────────────────────────────

/// Render a server timestamp as `YYYY-MM-DD HH:MM`.
///
/// Accepts RFC 3339 and SQLite's `YYYY-MM-DD HH:MM:SS` (with or without a
/// `T` separator and fractional seconds). Anything else is returned as-is.
pub fn format_timestamp(raw: &str) -> String {
  const OUT: &str = "%Y-%m-%d %H:%M";

  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return dt.format(OUT).to_string();
  }
  for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
      return dt.format(OUT).to_string();
    }
  }
  raw.to_string()
}

/// Cut `text` to at most `max` characters, appending `...` when shortened.
pub fn truncate(text: &str, max: usize) -> String {
  match text.char_indices().nth(max) {
    Some((idx, _)) => format!("{}...", &text[..idx]),
    None => text.to_string(),
  }
}
