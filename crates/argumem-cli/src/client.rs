//! Async HTTP gateway wrapping the ArguMem JSON API.

use std::time::Duration;

use anyhow::Context as _;
use argumem_core::{
  Error, Result,
  credential::Credential,
  gateway::{Gateway, fallback},
  model::{
    DatabaseStats, MemoryCreated, NewMemory, Proposition, Quotation,
    QuotationDetail, QuotationId, Source, SourceId,
  },
  recent::{LegacyRecentSource, RecentItem},
};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};

/// Header the backend reads the extraction API key from.
pub const CREDENTIAL_HEADER: &str = "X-OpenAI-API-Key";

/// Connection settings for the ArguMem API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  /// Per-request timeout. Memory creation runs extraction synchronously on
  /// the server, so this needs to be generous.
  pub timeout:  Duration,
}

/// Async HTTP client for the ArguMem REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpGateway {
  client: Client,
  config: ApiConfig,
}

impl HttpGateway {
  pub fn new(config: ApiConfig) -> anyhow::Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  pub fn base_url(&self) -> &str { &self.config.base_url }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  async fn get_json<T: DeserializeOwned>(
    &self,
    path: &str,
    fallback: &'static str,
  ) -> Result<T> {
    tracing::debug!(path, "GET");
    let resp = self
      .client
      .get(self.url(path))
      .send()
      .await
      .map_err(|e| network_failure("GET", path, fallback, e))?;
    decode(resp, fallback).await
  }
}

// ─── Response handling ────────────────────────────────────────────────────────

fn network_failure(
  method: &str,
  path: &str,
  fallback: &'static str,
  err: reqwest::Error,
) -> Error {
  tracing::warn!(method, path, error = %err, "request failed");
  Error::NetworkFailure(fallback.to_string())
}

async fn decode<T: DeserializeOwned>(
  resp: Response,
  fallback: &'static str,
) -> Result<T> {
  let status = resp.status();
  if !status.is_success() {
    return Err(error_from_response(resp, fallback).await);
  }
  resp.json().await.map_err(|e| {
    tracing::warn!(error = %e, "undecodable response body");
    Error::ServerError {
      status:  status.as_u16(),
      message: fallback.to_string(),
    }
  })
}

async fn error_from_response(resp: Response, fallback: &'static str) -> Error {
  let status = resp.status();
  let body = resp.text().await.unwrap_or_default();
  let message = server_message(&body).unwrap_or_else(|| fallback.to_string());
  tracing::warn!(%status, %message, "backend returned an error");

  if status == StatusCode::NOT_FOUND {
    Error::NotFound(message)
  } else {
    Error::ServerError {
      status: status.as_u16(),
      message,
    }
  }
}

/// Pull the human-readable reason out of an error body.
///
/// FastAPI sends `{"detail": "..."}`. `{"error": ...}` and `{"message": ...}`
/// are accepted too, as is a short plain-text body. Structured details
/// (validation error arrays) fall through to the caller's fallback.
fn server_message(body: &str) -> Option<String> {
  if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
    return ["detail", "error", "message"]
      .iter()
      .find_map(|key| value.get(key)?.as_str())
      .map(str::trim)
      .filter(|m| !m.is_empty())
      .map(str::to_string);
  }
  let text = body.trim();
  (!text.is_empty() && text.len() <= 200 && !text.starts_with('<'))
    .then(|| text.to_string())
}

#[derive(Deserialize)]
struct Banner {
  message: String,
}

// ─── Gateway ──────────────────────────────────────────────────────────────────

impl Gateway for HttpGateway {
  // ── Sources ───────────────────────────────────────────────────────────────

  /// `GET /sources`
  async fn list_sources(&self) -> Result<Vec<Source>> {
    self.get_json("/sources", fallback::LIST_SOURCES).await
  }

  /// `GET /sources/{id}`
  async fn get_source(&self, id: SourceId) -> Result<Source> {
    self
      .get_json(&format!("/sources/{id}"), fallback::GET_SOURCE)
      .await
  }

  /// `POST /memories` with the credential header.
  async fn create_source<'a>(
    &'a self,
    memory: &'a NewMemory,
    credential: &'a Credential,
  ) -> Result<MemoryCreated> {
    tracing::debug!(path = "/memories", "POST");
    let resp = self
      .client
      .post(self.url("/memories"))
      .header(CREDENTIAL_HEADER, credential.as_str())
      .json(memory)
      .send()
      .await
      .map_err(|e| network_failure("POST", "/memories", fallback::CREATE_SOURCE, e))?;
    let created: MemoryCreated = decode(resp, fallback::CREATE_SOURCE).await?;
    tracing::info!(source_id = created.source_id, "memory created");
    Ok(created)
  }

  /// `GET /sources/{id}/quotations`
  async fn quotations_for_source(&self, id: SourceId) -> Result<Vec<Quotation>> {
    self
      .get_json(
        &format!("/sources/{id}/quotations"),
        fallback::LIST_QUOTATIONS,
      )
      .await
  }

  // ── Quotations ────────────────────────────────────────────────────────────

  /// `GET /quotations`
  async fn list_quotations(&self) -> Result<Vec<Quotation>> {
    self.get_json("/quotations", fallback::LIST_QUOTATIONS).await
  }

  /// `GET /quotations/{id}`
  async fn get_quotation(&self, id: QuotationId) -> Result<QuotationDetail> {
    self
      .get_json(&format!("/quotations/{id}"), fallback::GET_QUOTATION)
      .await
  }

  /// `GET /quotations/{id}/propositions`
  async fn propositions_for_quotation(
    &self,
    id: QuotationId,
  ) -> Result<Vec<Proposition>> {
    self
      .get_json(
        &format!("/quotations/{id}/propositions"),
        fallback::PROPOSITIONS,
      )
      .await
  }

  // ── Activity and maintenance ──────────────────────────────────────────────

  /// `GET /recent`
  async fn recent_items(&self) -> Result<Vec<RecentItem>> {
    self.get_json("/recent", fallback::RECENT).await
  }

  /// `GET /sources/recent`
  async fn recent_sources(&self) -> Result<Vec<LegacyRecentSource>> {
    self.get_json("/sources/recent", fallback::RECENT).await
  }

  /// `GET /database/info`
  async fn stats(&self) -> Result<DatabaseStats> {
    self.get_json("/database/info", fallback::STATS).await
  }

  /// `DELETE /database`. The response body is ignored.
  async fn clear_database(&self) -> Result<()> {
    tracing::debug!(path = "/database", "DELETE");
    let resp = self
      .client
      .delete(self.url("/database"))
      .send()
      .await
      .map_err(|e| network_failure("DELETE", "/database", fallback::CLEAR, e))?;
    if !resp.status().is_success() {
      return Err(error_from_response(resp, fallback::CLEAR).await);
    }
    Ok(())
  }

  /// `GET /`
  async fn health(&self) -> Result<String> {
    let banner: Banner = self.get_json("/", fallback::HEALTH).await?;
    Ok(banner.message)
  }
}
