//! Error types for `seta-core`.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::record::{Outcome, RecordKind};

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown granularity: {0:?} (expected daily, weekly or monthly)")]
  InvalidGranularity(String),

  #[error("unknown record kind: {0:?}")]
  InvalidRecordKind(String),

  #[error("report range start {start} is after range end {end}")]
  InvalidRange {
    start: NaiveDateTime,
    end:   NaiveDateTime,
  },

  #[error("unknown outcome: {0:?}")]
  UnknownOutcome(String),

  #[error("outcome {outcome} does not belong to {kind} records")]
  OutcomeKindMismatch { outcome: Outcome, kind: RecordKind },

  #[error("page size and page limit must both be at least 1")]
  InvalidLimits,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
