//! JSON REST API for SETA verification and enrollment reports.
//!
//! Exposes an axum [`Router`] backed by any [`RecordSource`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", seta_api::api_router(store.clone(), limits))
//! ```

pub mod error;
pub mod extract;
pub mod records;
pub mod reports;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use seta_core::source::{CollectLimits, RecordSource};

pub use error::ApiError;

/// State shared by every handler.
pub struct ApiState<S> {
  pub store:  Arc<S>,
  /// Paging bounds applied when collecting report input.
  pub limits: CollectLimits,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      limits: self.limits,
    }
  }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, limits: CollectLimits) -> Router<()>
where
  S: RecordSource + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Records
    .route("/records", get(records::list::<S>).post(records::create::<S>))
    // Reports
    .route("/reports", post(reports::aggregate_inline::<S>))
    .route("/reports/{kind}", get(reports::generate::<S>))
    .with_state(ApiState { store, limits })
}
