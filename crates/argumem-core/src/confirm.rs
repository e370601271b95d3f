//! Two-step guard around the one irreversible action: wiping the database.
//!
//! ```text
//! Idle ──request──▶ ConfirmPending ──cancel──▶ Idle
//!                         │
//!                      confirm
//!                         ▼
//!                      Clearing ──finish──▶ Idle
//! ```

use crate::{Guard, Result, gateway::Gateway, model::DatabaseStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClearPhase {
  #[default]
  Idle,
  ConfirmPending,
  Clearing,
}

#[derive(Debug, Default)]
pub struct ClearConfirmer {
  phase: ClearPhase,
}

impl ClearConfirmer {
  pub fn new() -> Self { Self::default() }

  pub fn phase(&self) -> ClearPhase { self.phase }

  /// Whether the "clear all data" action should be offered at all.
  pub fn can_request(&self, stats: Option<&DatabaseStats>) -> bool {
    self.phase == ClearPhase::Idle && stats.is_some_and(|s| !s.is_empty())
  }

  pub fn can_cancel(&self) -> bool { self.phase == ClearPhase::ConfirmPending }

  pub fn can_confirm(&self) -> bool { self.phase == ClearPhase::ConfirmPending }

  /// Ask for confirmation. Refused when the latest stats are unknown or all
  /// zero, and while a clear is already pending or running.
  pub fn request(&mut self, stats: Option<&DatabaseStats>) -> Result<()> {
    match self.phase {
      ClearPhase::Clearing => return Err(Guard::ClearInProgress.into()),
      ClearPhase::ConfirmPending => return Ok(()),
      ClearPhase::Idle => {}
    }
    match stats {
      None => return Err(Guard::StatsUnavailable.into()),
      Some(stats) if stats.is_empty() => return Err(Guard::NothingToClear.into()),
      Some(_) => {}
    }
    self.phase = ClearPhase::ConfirmPending;
    Ok(())
  }

  /// Back out of a pending confirmation. Returns `false` if there was none
  /// or a clear is already running.
  pub fn cancel(&mut self) -> bool {
    if self.phase != ClearPhase::ConfirmPending {
      return false;
    }
    self.phase = ClearPhase::Idle;
    true
  }

  /// Commit to clearing. The caller must then run [`clear_and_refresh`] and
  /// call [`ClearConfirmer::finish`] when it settles.
  pub fn confirm(&mut self) -> Result<()> {
    match self.phase {
      ClearPhase::ConfirmPending => {
        self.phase = ClearPhase::Clearing;
        Ok(())
      }
      ClearPhase::Clearing => Err(Guard::ClearInProgress.into()),
      ClearPhase::Idle => Err(Guard::NotAwaitingConfirmation.into()),
    }
  }

  /// The clear request settled, successfully or not.
  pub fn finish(&mut self) {
    if self.phase == ClearPhase::Clearing {
      self.phase = ClearPhase::Idle;
    }
  }
}

/// Wipe the database, then re-read the stats so dependent views can render
/// the empty state.
pub async fn clear_and_refresh<G: Gateway>(gateway: &G) -> Result<DatabaseStats> {
  gateway.clear_database().await?;
  tracing::info!("database cleared");
  gateway.stats().await
}
