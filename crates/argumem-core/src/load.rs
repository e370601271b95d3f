//! Generation-guarded load slots.
//!
//! Every view activation draws a fresh [`Generation`]. Fetches remember the
//! generation they were issued under and a [`Load`] slot only accepts a
//! result for the generation it is waiting on. A response that arrives after
//! the user has moved on is therefore dropped instead of overwriting newer
//! state.

use crate::Result;

/// Opaque activation ticket. Larger is newer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

/// Monotonic source of [`Generation`]s.
#[derive(Debug, Default)]
pub struct GenerationCounter {
  current: u64,
}

impl GenerationCounter {
  pub fn new() -> Self { Self::default() }

  pub fn current(&self) -> Generation { Generation(self.current) }

  /// Invalidate everything issued so far and return the new generation.
  pub fn advance(&mut self) -> Generation {
    self.current += 1;
    Generation(self.current)
  }

  pub fn is_current(&self, generation: Generation) -> bool {
    generation.0 == self.current
  }
}

/// The lifecycle of one fetched snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Load<T> {
  /// Waiting on the fetch issued under this generation.
  Pending(Generation),
  Ready(T),
  /// User-facing failure message.
  Failed(String),
}

impl<T> Load<T> {
  /// Apply `result` if this slot is still waiting on `generation`.
  ///
  /// Returns `true` when the slot changed. Results for any other generation,
  /// or for a slot that already settled, are ignored.
  pub fn resolve(&mut self, generation: Generation, result: Result<T>) -> bool {
    match self {
      Self::Pending(expected) if *expected == generation => {
        *self = match result {
          Ok(value) => Self::Ready(value),
          Err(e) => Self::Failed(e.to_string()),
        };
        true
      }
      _ => false,
    }
  }

  pub fn is_pending(&self) -> bool { matches!(self, Self::Pending(_)) }

  pub fn ready(&self) -> Option<&T> {
    match self {
      Self::Ready(value) => Some(value),
      _ => None,
    }
  }
}
