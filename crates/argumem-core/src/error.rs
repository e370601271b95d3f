//! Error types for `argumem-core`.

use thiserror::Error;

/// Every failure the client can surface. `Display` is the user-facing text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  /// The request never completed (connection refused, timeout, ...).
  #[error("{0}")]
  NetworkFailure(String),

  /// The backend answered with a non-success status.
  #[error("{message}")]
  ServerError { status: u16, message: String },

  /// A detail fetch for an id the backend does not know.
  #[error("{0}")]
  NotFound(String),

  /// A required field was missing before submission.
  #[error("{0}")]
  ValidationError(String),

  #[error("{0}")]
  GuardViolation(Guard),

  /// The local credential file could not be read or written.
  #[error("credential storage: {0}")]
  Storage(String),
}

/// Operations refused up front because their precondition does not hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Guard {
  #[error("an API key is required before adding memories")]
  NoCredential,

  #[error("the database is already empty")]
  NothingToClear,

  #[error("database stats are not loaded yet")]
  StatsUnavailable,

  #[error("the database is being cleared")]
  ClearInProgress,

  #[error("no clear operation is awaiting confirmation")]
  NotAwaitingConfirmation,
}

impl From<Guard> for Error {
  fn from(guard: Guard) -> Self { Self::GuardViolation(guard) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
