//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Event timestamps are stored in a fixed-width format so that lexical order
//! in SQL matches chronological order. UUIDs are stored as hyphenated
//! lowercase strings.

use chrono::{DateTime, NaiveDateTime, Utc};
use seta_core::record::{Outcome, Record, RecordKind, StoredRecord};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Timestamps ───────────────────────────────────────────────────────────────

/// Always nine fractional digits, so stored values keep full precision and
/// range bounds compare the same way in SQL as in memory.
const OCCURRED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.9f";

pub fn encode_occurred_at(ts: NaiveDateTime) -> String {
  ts.format(OCCURRED_AT_FORMAT).to_string()
}

pub fn decode_occurred_at(s: &str) -> Result<NaiveDateTime> {
  NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn encode_kind(k: RecordKind) -> &'static str { k.into() }

pub fn decode_kind(s: &str) -> Result<RecordKind> {
  s.parse().map_err(|_| Error::UnknownValue {
    column: "kind",
    value:  s.to_owned(),
  })
}

pub fn encode_outcome(o: Outcome) -> &'static str { o.into() }

pub fn decode_outcome(s: &str) -> Result<Outcome> {
  Outcome::parse(s).map_err(|_| Error::UnknownValue {
    column: "outcome",
    value:  s.to_owned(),
  })
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `records` row.
pub struct RawRecord {
  pub record_id:   String,
  pub kind:        String,
  pub subject_id:  String,
  pub occurred_at: Option<String>,
  pub outcome:     String,
  pub recorded_at: String,
}

impl RawRecord {
  pub const COLUMNS: &'static str =
    "record_id, kind, subject_id, occurred_at, outcome, recorded_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      record_id:   row.get(0)?,
      kind:        row.get(1)?,
      subject_id:  row.get(2)?,
      occurred_at: row.get(3)?,
      outcome:     row.get(4)?,
      recorded_at: row.get(5)?,
    })
  }

  pub fn into_stored(self) -> Result<StoredRecord> {
    let timestamp = self
      .occurred_at
      .as_deref()
      .map(decode_occurred_at)
      .transpose()?;

    Ok(StoredRecord {
      record_id:   decode_uuid(&self.record_id)?,
      kind:        decode_kind(&self.kind)?,
      recorded_at: decode_dt(&self.recorded_at)?,
      record:      Record {
        subject_id: self.subject_id,
        timestamp,
        outcome: decode_outcome(&self.outcome)?,
      },
    })
  }
}
