//! Async HTTP client wrapping the SETA reporting API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use seta_core::{config::Granularity, record::RecordKind, report::ReportDocument};

/// Connection settings for the SETA API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// Async HTTP client for the SETA JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

#[derive(Deserialize)]
struct Inserted {
  inserted: usize,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  // ── Records ───────────────────────────────────────────────────────────────

  /// `POST /api/records`. `records` are passed through unnormalised; the
  /// server validates them.
  pub async fn import_records(
    &self,
    kind: RecordKind,
    records: Vec<serde_json::Value>,
  ) -> Result<usize> {
    let resp = self
      .client
      .post(self.url("/records"))
      .json(&json!({ "kind": kind, "records": records }))
      .send()
      .await
      .context("POST /records failed")?;

    let body: Inserted = check(resp, "POST /records")
      .await?
      .json()
      .await
      .context("deserialising insert result")?;
    Ok(body.inserted)
  }

  // ── Reports ───────────────────────────────────────────────────────────────

  /// `GET /api/reports/<kind>?granularity=<g>&start=<date>&end=<date>`
  pub async fn report(
    &self,
    kind: RecordKind,
    granularity: Granularity,
    start: NaiveDate,
    end: NaiveDate,
  ) -> Result<ReportDocument> {
    let resp = self
      .client
      .get(self.url(&format!("/reports/{kind}")))
      .query(&[
        ("granularity", granularity.to_string()),
        ("start", start.to_string()),
        ("end", end.to_string()),
      ])
      .send()
      .await
      .context("GET /reports failed")?;

    check(resp, "GET /reports")
      .await?
      .json()
      .await
      .context("deserialising report")
  }
}

/// Turn a non-2xx response into an error carrying the server's message.
async fn check(resp: Response, what: &str) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let message = resp
    .json::<serde_json::Value>()
    .await
    .ok()
    .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_owned))
    .unwrap_or_default();
  Err(anyhow!("{what} → {status} {message}"))
}
