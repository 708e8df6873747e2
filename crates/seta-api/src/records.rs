//! Handlers for `/records` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/records` | `?kind` required; optional `start`, `end`, `page`, `page_size` |
//! | `POST` | `/records` | Body: [`RecordBatch`]; returns 201 + `{"inserted": n}` |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use seta_core::{
  config::{end_of_day, start_of_day},
  id_number::{is_valid_id_number, mask_id_number},
  record::{
    Outcome, Record, RecordKind, StoredRecord, deserialize_lenient_timestamp,
  },
  source::{RecordQuery, RecordSource},
};
use uuid::Uuid;

use crate::{
  ApiState,
  error::ApiError,
  extract::{JsonBody, QueryParams},
};

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const MAX_PAGE_SIZE: usize = 500;

// ─── Incoming records ─────────────────────────────────────────────────────────

/// A record as submitted by a source system, before normalisation.
#[derive(Debug, Deserialize)]
pub struct IncomingRecord {
  pub subject_id: String,
  #[serde(default, deserialize_with = "deserialize_lenient_timestamp")]
  pub timestamp:  Option<NaiveDateTime>,
  pub outcome:    String,
}

impl IncomingRecord {
  /// Normalise the outcome and check it belongs to `kind`.
  pub fn normalize(self, kind: RecordKind) -> seta_core::Result<Record> {
    let record =
      Record::new(self.subject_id, self.timestamp, Outcome::parse(&self.outcome)?);
    record.check_kind(kind)?;
    Ok(record)
  }
}

pub fn normalize_all(
  kind: RecordKind,
  incoming: Vec<IncomingRecord>,
) -> seta_core::Result<Vec<Record>> {
  incoming.into_iter().map(|r| r.normalize(kind)).collect()
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /records`.
#[derive(Debug, Deserialize)]
pub struct RecordBatch {
  pub kind:    String,
  pub records: Vec<IncomingRecord>,
}

/// `POST /records`. The whole batch is rejected if any record is invalid.
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  JsonBody(body): JsonBody<RecordBatch>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordSource,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let kind = RecordKind::parse(&body.kind)?;
  let records = normalize_all(kind, body.records)?;

  let stored = state
    .store
    .insert_records(kind, records)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(json!({ "inserted": stored.len() }))))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub kind:      String,
  /// First day to include.
  pub start:     Option<NaiveDate>,
  /// Last day to include (whole day).
  pub end:       Option<NaiveDate>,
  #[serde(default)]
  pub page:      usize,
  pub page_size: Option<usize>,
}

/// A stored record with its subject identifier masked for display.
#[derive(Debug, Serialize)]
pub struct MaskedRecord {
  pub record_id:   Uuid,
  pub kind:        RecordKind,
  pub subject_id:  String,
  /// Whether the unmasked identifier is a well-formed SA ID number.
  pub id_valid:    bool,
  pub timestamp:   Option<NaiveDateTime>,
  pub outcome:     Outcome,
  pub recorded_at: DateTime<Utc>,
}

impl From<StoredRecord> for MaskedRecord {
  fn from(s: StoredRecord) -> Self {
    MaskedRecord {
      record_id:   s.record_id,
      kind:        s.kind,
      id_valid:    is_valid_id_number(&s.record.subject_id),
      subject_id:  mask_id_number(&s.record.subject_id),
      timestamp:   s.record.timestamp,
      outcome:     s.record.outcome,
      recorded_at: s.recorded_at,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct RecordListing {
  pub records:   Vec<MaskedRecord>,
  pub page:      usize,
  pub page_size: usize,
  pub total:     u64,
}

/// `GET /records?kind=<kind>[&start=YYYY-MM-DD][&end=YYYY-MM-DD][&page=n][&page_size=n]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<RecordListing>, ApiError>
where
  S: RecordSource,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let kind = RecordKind::parse(&params.kind)?;
  let page_size = params
    .page_size
    .unwrap_or(DEFAULT_PAGE_SIZE)
    .clamp(1, MAX_PAGE_SIZE);

  let query = RecordQuery {
    kind,
    range_start: params.start.map(start_of_day),
    range_end: params.end.map(end_of_day),
    page: params.page,
    page_size,
  };

  let page = state
    .store
    .fetch_page(&query)
    .await
    .map_err(ApiError::store)?;

  Ok(Json(RecordListing {
    records:   page.records.into_iter().map(MaskedRecord::from).collect(),
    page:      page.page,
    page_size: page.page_size,
    total:     page.total,
  }))
}
