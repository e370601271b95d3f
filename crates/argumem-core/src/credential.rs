//! The locally held API key that gates memory creation.

use std::{fmt, sync::Mutex};

use crate::{Error, Result};

/// A non-empty, trimmed API key.
///
/// `Debug` never prints the key.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
  /// Trim `raw` and wrap it. Blank input is a validation error.
  pub fn new(raw: &str) -> Result<Self> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
      return Err(Error::ValidationError("API key must not be empty".into()));
    }
    Ok(Self(trimmed.to_string()))
  }

  pub fn as_str(&self) -> &str { &self.0 }

  /// `sk-a…wxyz`-style rendering for status lines.
  pub fn masked(&self) -> String {
    let chars: Vec<char> = self.0.chars().collect();
    if chars.len() <= 8 {
      return "•".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
  }
}

impl fmt::Debug for Credential {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("Credential(<redacted>)")
  }
}

/// Persistence for the single credential.
///
/// At most one value is stored; saving replaces it.
pub trait CredentialStore: Send + Sync {
  /// Read the persisted value, if any. Never touches the network.
  fn load(&self) -> Result<Option<Credential>>;

  fn save(&self, credential: &Credential) -> Result<()>;

  /// Remove the persisted value. Clearing nothing is not an error.
  fn clear(&self) -> Result<()>;
}

/// Process-local store, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
  value: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
  pub fn new() -> Self { Self::default() }

  pub fn with(credential: Credential) -> Self {
    Self {
      value: Mutex::new(Some(credential)),
    }
  }

  fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<Credential>>> {
    self
      .value
      .lock()
      .map_err(|_| Error::Storage("credential lock poisoned".into()))
  }
}

impl CredentialStore for MemoryCredentialStore {
  fn load(&self) -> Result<Option<Credential>> { Ok(self.slot()?.clone()) }

  fn save(&self, credential: &Credential) -> Result<()> {
    *self.slot()? = Some(credential.clone());
    Ok(())
  }

  fn clear(&self) -> Result<()> {
    *self.slot()? = None;
    Ok(())
  }
}
