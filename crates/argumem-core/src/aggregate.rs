//! Master-detail aggregation: an entity fetched together with its children.
//!
//! Both requests are issued concurrently and joined with "all complete or
//! first failure" semantics. Either both halves come back or the caller gets
//! the error and nothing else, so a detail view never renders half an entity.

use futures::try_join;

use crate::{
  Error, Result,
  gateway::Gateway,
  model::{Proposition, Quotation, QuotationDetail, QuotationId, Source, SourceId},
  recent::RecentItem,
};

/// A source and the quotations extracted from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDetail {
  pub source:     Source,
  pub quotations: Vec<Quotation>,
}

/// A quotation (with its source embedded) and the propositions derived from
/// it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotationView {
  pub quotation:    QuotationDetail,
  pub propositions: Vec<Proposition>,
}

pub async fn load_source_detail<G: Gateway>(
  gateway: &G,
  id: SourceId,
) -> Result<SourceDetail> {
  let (source, quotations) =
    try_join!(gateway.get_source(id), gateway.quotations_for_source(id))?;
  Ok(SourceDetail { source, quotations })
}

pub async fn load_quotation_view<G: Gateway>(
  gateway: &G,
  id: QuotationId,
) -> Result<QuotationView> {
  let (quotation, propositions) = try_join!(
    gateway.get_quotation(id),
    gateway.propositions_for_quotation(id)
  )?;
  Ok(QuotationView {
    quotation,
    propositions,
  })
}

/// The recent-activity feed, in server order.
///
/// Backends that predate the unified `/recent` endpoint answer it with 404;
/// those fall back to the sources-only `/sources/recent` feed.
pub async fn load_recent<G: Gateway>(gateway: &G) -> Result<Vec<RecentItem>> {
  match gateway.recent_items().await {
    Err(Error::NotFound(reason)) => {
      tracing::info!(%reason, "unified feed unavailable, using /sources/recent");
      let legacy = gateway.recent_sources().await?;
      Ok(legacy.into_iter().map(RecentItem::from).collect())
    }
    other => other,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    Error,
    testing::{Op, StubGateway},
  };

  #[tokio::test]
  async fn source_detail_issues_one_fetch_of_each_half() {
    let gw = StubGateway::seeded();
    let detail = load_source_detail(&gw, 1).await.unwrap();

    assert_eq!(detail.source.id, 1);
    assert_eq!(detail.quotations.len(), 2);
    assert_eq!(gw.calls(Op::GetSource), 1);
    assert_eq!(gw.calls(Op::QuotationsForSource), 1);
  }

  #[tokio::test]
  async fn source_with_no_quotations_is_still_a_success() {
    let gw = StubGateway::seeded();
    let detail = load_source_detail(&gw, 2).await.unwrap();
    assert!(detail.quotations.is_empty());
  }

  #[tokio::test]
  async fn failure_of_either_half_yields_only_the_error() {
    let gw = StubGateway::seeded();
    gw.fail(Op::QuotationsForSource);
    let err = load_source_detail(&gw, 1).await.unwrap_err();
    assert!(matches!(err, Error::ServerError { .. }));

    let gw = StubGateway::seeded();
    let err = load_source_detail(&gw, 404).await.unwrap_err();
    assert_eq!(err, Error::NotFound("Source 404 not found".into()));
  }

  #[tokio::test]
  async fn quotation_view_joins_detail_and_propositions() {
    let gw = StubGateway::seeded();
    let view = load_quotation_view(&gw, 10).await.unwrap();
    assert_eq!(view.quotation.source_id, 1);
    assert_eq!(view.propositions.len(), 1);
    assert_eq!(gw.calls(Op::GetQuotation), 1);
    assert_eq!(gw.calls(Op::PropositionsForQuotation), 1);

    gw.fail(Op::GetQuotation);
    assert!(load_quotation_view(&gw, 10).await.is_err());
  }

  #[tokio::test]
  async fn recent_keeps_server_order_without_fallback() {
    let gw = StubGateway::seeded();
    let items = load_recent(&gw).await.unwrap();
    let ids: Vec<_> = items.iter().map(|i| (i.kind(), i.id())).collect();
    assert_eq!(ids, [
      ("source", 2),
      ("source", 1),
      ("quotation", 11),
      ("quotation", 10)
    ]);
    assert_eq!(gw.calls(Op::RecentSources), 0);
  }

  #[tokio::test]
  async fn missing_unified_feed_falls_back_to_legacy_sources() {
    let gw = StubGateway::seeded();
    gw.fail_with(Op::RecentItems, Error::NotFound("Not Found".into()));
    let items = load_recent(&gw).await.unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|i| i.kind() == "source"));
    assert_eq!(gw.calls(Op::RecentSources), 1);
  }

  #[tokio::test]
  async fn server_errors_on_recent_are_not_masked_by_the_fallback() {
    let gw = StubGateway::seeded();
    gw.fail(Op::RecentItems);
    assert!(load_recent(&gw).await.is_err());
    assert_eq!(gw.calls(Op::RecentSources), 0);
  }
}
