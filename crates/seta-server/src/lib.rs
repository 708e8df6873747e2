//! HTTP server wiring for SETA reports.
//!
//! Mounts the JSON API from `seta-api` under `/api` and adds request tracing.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{Router, routing::get};
use serde::Deserialize;
use seta_core::source::{CollectLimits, RecordSource};
use thiserror::Error;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `SETA_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  /// Records requested per page when collecting report input.
  #[serde(default = "default_page_size")]
  pub page_size:  usize,
  /// Upper bound on pages fetched for a single report.
  #[serde(default = "default_max_pages")]
  pub max_pages:  usize,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("seta.db") }
fn default_page_size() -> usize { CollectLimits::default().page_size }
fn default_max_pages() -> usize { CollectLimits::default().max_pages }

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("page_size must be at least 1")]
  ZeroPageSize,
  #[error("max_pages must be at least 1")]
  ZeroMaxPages,
}

impl ServerConfig {
  /// The paging limits for report collection, validated.
  pub fn limits(&self) -> Result<CollectLimits, ConfigError> {
    if self.page_size == 0 {
      return Err(ConfigError::ZeroPageSize);
    }
    if self.max_pages == 0 {
      return Err(ConfigError::ZeroMaxPages);
    }
    Ok(CollectLimits {
      page_size: self.page_size,
      max_pages: self.max_pages,
    })
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the top-level [`Router`]: `/api/*` plus a `/health` probe.
pub fn router<S>(store: Arc<S>, limits: CollectLimits) -> Router
where
  S: RecordSource + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route("/health", get(|| async { "ok" }))
    .nest("/api", seta_api::api_router(store, limits))
    .layer(TraceLayer::new_for_http())
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Integration tests ────────────────────────────────────────────────────────
