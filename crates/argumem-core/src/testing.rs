//! In-memory [`Gateway`] for tests.
//!
//! Counts calls per operation and can be told to fail any of them, which is
//! what the aggregation and controller tests need to check "exactly one
//! fetch" and "no partial render" properties.

use std::{
  collections::HashMap,
  sync::{Mutex, MutexGuard},
};

use crate::{
  Error, Result,
  credential::Credential,
  gateway::Gateway,
  model::{
    DatabaseStats, MemoryCreated, NewMemory, Proposition, Quotation,
    QuotationDetail, QuotationId, Source, SourceId,
  },
  recent::{LegacyRecentSource, RecentItem, RecentQuotation, RecentSource},
};

/// One entry per [`Gateway`] method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
  ListSources,
  GetSource,
  CreateSource,
  QuotationsForSource,
  ListQuotations,
  GetQuotation,
  PropositionsForQuotation,
  RecentItems,
  RecentSources,
  Stats,
  ClearDatabase,
  Health,
}

const STUB_TIMESTAMP: &str = "2024-05-01 12:00:00";

#[derive(Debug, Default)]
struct Data {
  sources:      Vec<Source>,
  quotations:   Vec<QuotationDetail>,
  propositions: Vec<(QuotationId, Proposition)>,
  arguments:    u64,
}

#[derive(Debug, Default)]
pub struct StubGateway {
  data:            Mutex<Data>,
  calls:           Mutex<HashMap<Op, usize>>,
  failing:         Mutex<HashMap<Op, Error>>,
  last_credential: Mutex<Option<String>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
  m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl StubGateway {
  /// An empty database.
  pub fn new() -> Self { Self::default() }

  /// Two sources: #1 "On Liberty" with quotations #10 and #11 (one
  /// proposition on #10), and untitled #2 with no quotations.
  pub fn seeded() -> Self {
    let gw = Self::new();
    {
      let mut data = lock(&gw.data);
      data.sources = vec![
        Source {
          id:        1,
          timestamp: "2024-04-30 09:00:00".into(),
          title:     Some("On Liberty".into()),
          context:   "Chapter II".into(),
          raw_text:  "Mill wrote 'truth gains by collision with error'."
            .into(),
        },
        Source {
          id:        2,
          timestamp: "2024-05-01 09:00:00".into(),
          title:     None,
          context:   "Notebook".into(),
          raw_text:  "Nothing quotable here.".into(),
        },
      ];
      data.quotations = vec![
        quotation_row(&data.sources[0], 10, "truth gains by collision", Some("p. 52")),
        quotation_row(&data.sources[0], 11, "with error", None),
      ];
      data.propositions = vec![(10, Proposition {
        id:               100,
        proposition_text: "Open debate improves understanding".into(),
        paraphrase:       Some("Arguing helps".into()),
      })];
      data.arguments = 1;
    }
    gw
  }

  /// Make every later call to `op` fail with a server error.
  pub fn fail(&self, op: Op) {
    self.fail_with(op, Error::ServerError {
      status:  500,
      message: format!("stub failure: {op:?}"),
    });
  }

  /// Make every later call to `op` fail with `error`.
  pub fn fail_with(&self, op: Op, error: Error) {
    lock(&self.failing).insert(op, error);
  }

  /// Undo [`StubGateway::fail`].
  pub fn recover(&self, op: Op) { lock(&self.failing).remove(&op); }

  /// How many times `op` has been called, failed calls included.
  pub fn calls(&self, op: Op) -> usize {
    lock(&self.calls).get(&op).copied().unwrap_or(0)
  }

  /// The credential forwarded by the most recent create call.
  pub fn last_credential(&self) -> Option<String> {
    lock(&self.last_credential).clone()
  }

  fn hit(&self, op: Op) -> Result<()> {
    *lock(&self.calls).entry(op).or_default() += 1;
    match lock(&self.failing).get(&op) {
      Some(error) => Err(error.clone()),
      None => Ok(()),
    }
  }
}

fn quotation_row(
  source: &Source,
  id: QuotationId,
  text: &str,
  locator: Option<&str>,
) -> QuotationDetail {
  QuotationDetail {
    id,
    quotation_text: text.into(),
    locator: locator.map(Into::into),
    source_id: source.id,
    source_title: source.title.clone(),
    source_context: source.context.clone(),
    source_text: source.raw_text.clone(),
    source_timestamp: source.timestamp.clone(),
  }
}

/// Text between matching single quotes; stands in for the extraction
/// pipeline.
fn quoted_spans(text: &str) -> Vec<&str> {
  text
    .split('\'')
    .skip(1)
    .step_by(2)
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .collect()
}

impl Gateway for StubGateway {
  async fn list_sources(&self) -> Result<Vec<Source>> {
    self.hit(Op::ListSources)?;
    let mut sources = lock(&self.data).sources.clone();
    sources.reverse();
    Ok(sources)
  }

  async fn get_source(&self, id: SourceId) -> Result<Source> {
    self.hit(Op::GetSource)?;
    lock(&self.data)
      .sources
      .iter()
      .find(|s| s.id == id)
      .cloned()
      .ok_or_else(|| Error::NotFound(format!("Source {id} not found")))
  }

  async fn create_source<'a>(
    &'a self,
    memory: &'a NewMemory,
    credential: &'a Credential,
  ) -> Result<MemoryCreated> {
    self.hit(Op::CreateSource)?;
    *lock(&self.last_credential) = Some(credential.as_str().to_string());

    let mut data = lock(&self.data);
    let id = data.sources.iter().map(|s| s.id).max().unwrap_or(0) + 1;
    let source = Source {
      id,
      timestamp: STUB_TIMESTAMP.into(),
      title: memory.title.clone(),
      context: memory.context.clone(),
      raw_text: memory.content.clone(),
    };
    let mut next_q = data.quotations.iter().map(|q| q.id).max().unwrap_or(0);
    let rows: Vec<_> = quoted_spans(&memory.content)
      .into_iter()
      .map(|span| {
        next_q += 1;
        quotation_row(&source, next_q, span, None)
      })
      .collect();
    data.quotations.extend(rows);
    data.sources.push(source);

    Ok(MemoryCreated {
      source_id: id,
      message:   format!("Memory added successfully with ID {id}"),
    })
  }

  async fn quotations_for_source(&self, id: SourceId) -> Result<Vec<Quotation>> {
    self.hit(Op::QuotationsForSource)?;
    Ok(
      lock(&self.data)
        .quotations
        .iter()
        .filter(|q| q.source_id == id)
        .map(|q| Quotation {
          id:             q.id,
          quotation_text: q.quotation_text.clone(),
          locator:        q.locator.clone(),
          source_id:      None,
          source_title:   None,
          source_context: None,
        })
        .collect(),
    )
  }

  async fn list_quotations(&self) -> Result<Vec<Quotation>> {
    self.hit(Op::ListQuotations)?;
    Ok(
      lock(&self.data)
        .quotations
        .iter()
        .map(|q| Quotation {
          id:             q.id,
          quotation_text: q.quotation_text.clone(),
          locator:        q.locator.clone(),
          source_id:      Some(q.source_id),
          source_title:   q.source_title.clone(),
          source_context: Some(q.source_context.clone()),
        })
        .collect(),
    )
  }

  async fn get_quotation(&self, id: QuotationId) -> Result<QuotationDetail> {
    self.hit(Op::GetQuotation)?;
    lock(&self.data)
      .quotations
      .iter()
      .find(|q| q.id == id)
      .cloned()
      .ok_or_else(|| Error::NotFound(format!("Quotation {id} not found")))
  }

  async fn propositions_for_quotation(
    &self,
    id: QuotationId,
  ) -> Result<Vec<Proposition>> {
    self.hit(Op::PropositionsForQuotation)?;
    Ok(
      lock(&self.data)
        .propositions
        .iter()
        .filter(|(qid, _)| *qid == id)
        .map(|(_, p)| p.clone())
        .collect(),
    )
  }

  async fn recent_items(&self) -> Result<Vec<RecentItem>> {
    self.hit(Op::RecentItems)?;
    let data = lock(&self.data);
    let sources = data.sources.iter().rev().map(|s| {
      RecentItem::Source(RecentSource {
        id:        s.id,
        timestamp: s.timestamp.clone(),
        title:     s.title.clone(),
        preview:   s.raw_text.clone(),
        context:   s.context.clone(),
      })
    });
    let quotations = data.quotations.iter().rev().map(|q| {
      RecentItem::Quotation(RecentQuotation {
        id:           q.id,
        timestamp:    q.source_timestamp.clone(),
        title:        Some(format!(
          "Quotation from: {}",
          q.source_display_title()
        )),
        preview:      q.quotation_text.clone(),
        locator:      q.locator.clone(),
        source_id:    Some(q.source_id),
        source_title: q.source_title.clone(),
      })
    });
    Ok(sources.chain(quotations).collect())
  }

  async fn recent_sources(&self) -> Result<Vec<LegacyRecentSource>> {
    self.hit(Op::RecentSources)?;
    Ok(
      lock(&self.data)
        .sources
        .iter()
        .rev()
        .map(|s| LegacyRecentSource {
          id:          s.id,
          title:       s.title.clone(),
          created_at:  s.timestamp.clone(),
          last_edited: s.timestamp.clone(),
        })
        .collect(),
    )
  }

  async fn stats(&self) -> Result<DatabaseStats> {
    self.hit(Op::Stats)?;
    let data = lock(&self.data);
    Ok(DatabaseStats {
      total_sources:      data.sources.len() as u64,
      total_quotations:   data.quotations.len() as u64,
      total_propositions: data.propositions.len() as u64,
      total_arguments:    data.arguments,
    })
  }

  async fn clear_database(&self) -> Result<()> {
    self.hit(Op::ClearDatabase)?;
    *lock(&self.data) = Data::default();
    Ok(())
  }

  async fn health(&self) -> Result<String> {
    self.hit(Op::Health)?;
    Ok("ArguMem API is running".into())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn quoted_spans_pick_single_quoted_text() {
    assert_eq!(quoted_spans("X said 'Y'."), ["Y"]);
    assert_eq!(quoted_spans("no quotes"), Vec::<&str>::new());
    assert_eq!(quoted_spans("'a' and 'b'"), ["a", "b"]);
  }

  #[tokio::test]
  async fn create_assigns_next_id_and_records_credential() {
    let gw = StubGateway::seeded();
    let memory = NewMemory::new("X said 'Y'.", "test", "").unwrap();
    let key = Credential::new("sk-stub").unwrap();

    let created = gw.create_source(&memory, &key).await.unwrap();
    assert_eq!(created.source_id, 3);
    assert_eq!(gw.last_credential().as_deref(), Some("sk-stub"));

    let quotations = gw.quotations_for_source(3).await.unwrap();
    assert_eq!(quotations.len(), 1);
    assert_eq!(quotations[0].quotation_text, "Y");
  }

  #[tokio::test]
  async fn failing_op_still_counts_the_call() {
    let gw = StubGateway::new();
    gw.fail(Op::Stats);
    assert!(gw.stats().await.is_err());
    gw.recover(Op::Stats);
    assert!(gw.stats().await.unwrap().is_empty());
    assert_eq!(gw.calls(Op::Stats), 2);
  }
}
