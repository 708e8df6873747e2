//! Handlers for `/reports` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/reports/:kind` | `?granularity&start&end` required; pages through the store |
//! | `POST` | `/reports` | Body: [`InlineReportBody`]; aggregates the submitted records only |
//!
//! Both return a [`ReportDocument`]. The configuration is validated before
//! any record is fetched.

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::NaiveDate;
use serde::Deserialize;
use seta_core::{
  aggregate,
  config::{Granularity, ReportConfig},
  record::RecordKind,
  report::ReportDocument,
  source::{RecordSource, collect_records},
};

use crate::{
  ApiState,
  error::ApiError,
  extract::{JsonBody, QueryParams},
  records::{IncomingRecord, normalize_all},
};

/// Build a validated config from loosely-typed request fields.
///
/// A missing granularity is an error; there is no default bucket width.
fn report_config(
  granularity: Option<&str>,
  start: NaiveDate,
  end: NaiveDate,
) -> Result<ReportConfig, ApiError> {
  let granularity = granularity.ok_or_else(|| {
    ApiError::BadRequest("granularity is required".to_owned())
  })?;
  Ok(ReportConfig::for_dates(Granularity::parse(granularity)?, start, end)?)
}

// ─── Generate from store ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ReportParams {
  pub granularity: Option<String>,
  pub start:       NaiveDate,
  pub end:         NaiveDate,
}

/// `GET /reports/:kind?granularity=<daily|weekly|monthly>&start=YYYY-MM-DD&end=YYYY-MM-DD`
pub async fn generate<S>(
  State(state): State<ApiState<S>>,
  Path(kind): Path<String>,
  QueryParams(params): QueryParams<ReportParams>,
) -> Result<Json<ReportDocument>, ApiError>
where
  S: RecordSource,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let kind = RecordKind::parse(&kind)?;
  let config =
    report_config(params.granularity.as_deref(), params.start, params.end)?;

  let collected =
    collect_records(state.store.as_ref(), kind, &config, state.limits).await?;

  tracing::info!(
    %kind,
    granularity = %config.granularity,
    records = collected.records.len(),
    pages = collected.pages_fetched,
    truncated = collected.truncated,
    "generating report"
  );

  Ok(Json(ReportDocument {
    kind,
    config,
    truncated: collected.truncated,
    report: aggregate(&collected.records, &config),
  }))
}

// ─── Inline ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /reports`.
#[derive(Debug, Deserialize)]
pub struct InlineReportBody {
  pub kind:        String,
  pub granularity: Option<String>,
  pub start:       NaiveDate,
  pub end:         NaiveDate,
  #[serde(default)]
  pub records:     Vec<IncomingRecord>,
}

/// `POST /reports`: aggregate caller-supplied records without storing them.
pub async fn aggregate_inline<S>(
  State(_state): State<ApiState<S>>,
  JsonBody(body): JsonBody<InlineReportBody>,
) -> Result<Json<ReportDocument>, ApiError>
where
  S: RecordSource,
{
  let kind = RecordKind::parse(&body.kind)?;
  let config = report_config(body.granularity.as_deref(), body.start, body.end)?;
  let records = normalize_all(kind, body.records)?;

  Ok(Json(ReportDocument {
    kind,
    config,
    truncated: false,
    report: aggregate(&records, &config),
  }))
}
