//! Record types: the verification and enrollment events reports are built
//! from.
//!
//! Source systems report outcomes as loose strings ("GREEN", "Yellow",
//! "withdrawn", ...). They are normalised into the closed [`Outcome`] enum on
//! ingestion, so the aggregator never compares raw strings.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Kind ────────────────────────────────────────────────────────────────────

/// Which report family a record belongs to.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RecordKind {
  /// An identity verification check (traffic-light outcome).
  Verification,
  /// A learnership enrollment (registration status).
  Enrollment,
}

impl RecordKind {
  pub fn parse(raw: &str) -> Result<Self> {
    raw
      .trim()
      .parse()
      .map_err(|_| Error::InvalidRecordKind(raw.to_owned()))
  }

  /// The outcomes a record of this kind may carry, in display order.
  pub fn outcomes(self) -> &'static [Outcome] {
    match self {
      Self::Verification => &[Outcome::Green, Outcome::Amber, Outcome::Red],
      Self::Enrollment => {
        &[Outcome::Active, Outcome::Completed, Outcome::Withdrawn]
      }
    }
  }
}

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// The categorical status of a record.
///
/// Parsing is case-insensitive and treats `"YELLOW"` as a synonym for
/// [`Outcome::Amber`].
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
#[serde(try_from = "String", into = "&'static str")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Outcome {
  // ── Verification ──────────────────────────────────────────────────────
  Green,
  #[strum(to_string = "amber", serialize = "yellow")]
  Amber,
  Red,

  // ── Enrollment ────────────────────────────────────────────────────────
  Active,
  Completed,
  Withdrawn,
}

impl Outcome {
  pub fn kind(self) -> RecordKind {
    match self {
      Self::Green | Self::Amber | Self::Red => RecordKind::Verification,
      Self::Active | Self::Completed | Self::Withdrawn => RecordKind::Enrollment,
    }
  }

  /// Normalise a raw source string into an outcome.
  pub fn parse(raw: &str) -> Result<Self> {
    raw
      .trim()
      .parse()
      .map_err(|_| Error::UnknownOutcome(raw.to_owned()))
  }
}

impl TryFrom<String> for Outcome {
  type Error = Error;

  fn try_from(raw: String) -> Result<Self> { Self::parse(&raw) }
}

// ─── Timestamps ──────────────────────────────────────────────────────────────

const DATE_TIME_FORMATS: &[&str] = &[
  "%Y-%m-%dT%H:%M:%S%.f",
  "%Y-%m-%d %H:%M:%S%.f",
  "%Y-%m-%dT%H:%M",
  "%Y-%m-%d %H:%M",
];

/// Parse a source timestamp leniently.
///
/// Offsets in RFC 3339 input are discarded: the wall-clock time as written is
/// what gets bucketed. A bare date is taken as midnight. Anything else yields
/// `None`.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
  let raw = raw.trim();
  if raw.is_empty() {
    return None;
  }

  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt.naive_local());
  }

  for format in DATE_TIME_FORMATS {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
      return Some(dt);
    }
  }

  NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Serde adapter for optional source timestamps: missing, `null`,
/// non-string or unparseable values all deserialise to `None`.
pub fn deserialize_lenient_timestamp<'de, D>(
  deserializer: D,
) -> std::result::Result<Option<NaiveDateTime>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<serde_json::Value>::deserialize(deserializer)?;
  Ok(match value {
    Some(serde_json::Value::String(s)) => parse_timestamp(&s),
    _ => None,
  })
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// One verification or enrollment event, as consumed by the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
  /// The person the event concerns, usually a national ID number.
  pub subject_id: String,
  /// When the event happened. `None` when the source had no usable date.
  #[serde(default, deserialize_with = "deserialize_lenient_timestamp")]
  pub timestamp:  Option<NaiveDateTime>,
  pub outcome:    Outcome,
}

impl Record {
  pub fn new(
    subject_id: impl Into<String>,
    timestamp: Option<NaiveDateTime>,
    outcome: Outcome,
  ) -> Self {
    Self {
      subject_id: subject_id.into(),
      timestamp,
      outcome,
    }
  }

  /// Ensure this record's outcome is one `kind` records may carry.
  pub fn check_kind(&self, kind: RecordKind) -> Result<()> {
    if self.outcome.kind() == kind {
      Ok(())
    } else {
      Err(Error::OutcomeKindMismatch {
        outcome: self.outcome,
        kind,
      })
    }
  }
}

/// A record as held by a [`RecordSource`](crate::source::RecordSource).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
  pub record_id:   Uuid,
  pub kind:        RecordKind,
  /// Server-assigned ingestion time; unrelated to the event timestamp.
  pub recorded_at: DateTime<Utc>,
  #[serde(flatten)]
  pub record:      Record,
}
