//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use seta_core::source::CollectError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  /// The request could not be extracted; `status` is the one axum chose.
  #[error("{message}")]
  Rejected { status: StatusCode, message: String },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

/// Core errors only arise from caller input (bad granularity, range,
/// outcome, limits).
impl From<seta_core::Error> for ApiError {
  fn from(e: seta_core::Error) -> Self { Self::BadRequest(e.to_string()) }
}

impl From<JsonRejection> for ApiError {
  fn from(r: JsonRejection) -> Self {
    Self::Rejected {
      status:  r.status(),
      message: r.body_text(),
    }
  }
}

impl From<QueryRejection> for ApiError {
  fn from(r: QueryRejection) -> Self {
    Self::Rejected {
      status:  r.status(),
      message: r.body_text(),
    }
  }
}

impl<E> From<CollectError<E>> for ApiError
where
  E: std::error::Error + Send + Sync + 'static,
{
  fn from(e: CollectError<E>) -> Self {
    match e {
      CollectError::Core(e) => e.into(),
      CollectError::Source(e) => Self::store(e),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Rejected { status, message } => (*status, message.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "record store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
