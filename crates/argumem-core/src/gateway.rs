//! The `Gateway` trait: every request the client issues to the backend.
//!
//! The trait is implemented by the HTTP client in `argumem-cli` and by
//! [`crate::testing::StubGateway`]. Views and the controller depend on this
//! abstraction, not on reqwest.
//!
//! Calls are single-shot and never retried. A failure carries the server's
//! message when it sent one, otherwise a per-operation fallback (see
//! [`fallback`]).

use std::future::Future;

use crate::{
  Result,
  credential::Credential,
  model::{
    DatabaseStats, MemoryCreated, NewMemory, Proposition, Quotation,
    QuotationDetail, QuotationId, Source, SourceId,
  },
  recent::{LegacyRecentSource, RecentItem},
};

/// Generic messages used when the backend gives no reason of its own.
pub mod fallback {
  pub const LIST_SOURCES: &str = "Failed to fetch sources";
  pub const GET_SOURCE: &str = "Failed to fetch source data";
  pub const CREATE_SOURCE: &str = "Failed to add memory";
  pub const LIST_QUOTATIONS: &str = "Failed to fetch quotations";
  pub const GET_QUOTATION: &str = "Failed to fetch quotation data";
  pub const PROPOSITIONS: &str = "Failed to fetch propositions";
  pub const RECENT: &str = "Failed to fetch recent items";
  pub const STATS: &str = "Failed to fetch database stats";
  pub const CLEAR: &str = "Failed to clear database";
  pub const HEALTH: &str = "ArguMem API is unreachable";
}

/// Abstraction over the ArguMem backend.
///
/// All methods return `Send` futures so calls can be spawned onto a
/// multi-threaded runtime and report back to the UI loop.
pub trait Gateway: Send + Sync {
  // ── Sources ───────────────────────────────────────────────────────────

  /// `GET /sources`
  fn list_sources(
    &self,
  ) -> impl Future<Output = Result<Vec<Source>>> + Send + '_;

  /// `GET /sources/{id}`
  fn get_source(
    &self,
    id: SourceId,
  ) -> impl Future<Output = Result<Source>> + Send + '_;

  /// `POST /memories`. Stores a source and runs extraction on it.
  ///
  /// The credential is forwarded as a request header on every call.
  fn create_source<'a>(
    &'a self,
    memory: &'a NewMemory,
    credential: &'a Credential,
  ) -> impl Future<Output = Result<MemoryCreated>> + Send + 'a;

  /// `GET /sources/{id}/quotations`
  fn quotations_for_source(
    &self,
    id: SourceId,
  ) -> impl Future<Output = Result<Vec<Quotation>>> + Send + '_;

  // ── Quotations ────────────────────────────────────────────────────────

  /// `GET /quotations`
  fn list_quotations(
    &self,
  ) -> impl Future<Output = Result<Vec<Quotation>>> + Send + '_;

  /// `GET /quotations/{id}`
  fn get_quotation(
    &self,
    id: QuotationId,
  ) -> impl Future<Output = Result<QuotationDetail>> + Send + '_;

  /// `GET /quotations/{id}/propositions`
  fn propositions_for_quotation(
    &self,
    id: QuotationId,
  ) -> impl Future<Output = Result<Vec<Proposition>>> + Send + '_;

  // ── Activity and maintenance ──────────────────────────────────────────

  /// `GET /recent`. Pre-sorted by the server; callers must keep the order.
  fn recent_items(
    &self,
  ) -> impl Future<Output = Result<Vec<RecentItem>>> + Send + '_;

  /// `GET /sources/recent`, the older sources-only feed.
  fn recent_sources(
    &self,
  ) -> impl Future<Output = Result<Vec<LegacyRecentSource>>> + Send + '_;

  /// `GET /database/info`
  fn stats(&self) -> impl Future<Output = Result<DatabaseStats>> + Send + '_;

  /// `DELETE /database`. Irreversible; follow it with [`Gateway::stats`].
  fn clear_database(&self) -> impl Future<Output = Result<()>> + Send + '_;

  /// `GET /`. Returns the banner message.
  fn health(&self) -> impl Future<Output = Result<String>> + Send + '_;
}
