//! Core types and client-side logic for the ArguMem memory browser.
//!
//! No HTTP, terminal or filesystem code lives here. The binary supplies a
//! [`gateway::Gateway`] and a [`credential::CredentialStore`]; navigation,
//! stale-response handling and write guards are implemented on top of them.

pub mod aggregate;
pub mod confirm;
pub mod credential;
pub mod error;
pub mod gateway;
pub mod load;
pub mod model;
pub mod recent;
pub mod view;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{Error, Guard, Result};
