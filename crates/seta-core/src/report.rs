//! The report aggregator: turns a flat list of records into per-period rows
//! and a grand-total row.
//!
//! Rows are keyed on their period start date at grouping time, so ordering
//! never depends on re-parsing a formatted label.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator as _;

use crate::{
  config::ReportConfig,
  record::{Outcome, Record, RecordKind},
};

/// Label of the grand-total row.
pub const SUMMARY_LABEL: &str = "Total";

// ─── Output types ────────────────────────────────────────────────────────────

/// One counter per [`Outcome`]. Every counted record lands in exactly one.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub struct OutcomeCounts {
  pub green:     u64,
  /// Amber and yellow source outcomes both count here.
  pub amber:     u64,
  pub red:       u64,
  pub active:    u64,
  pub completed: u64,
  pub withdrawn: u64,
}

impl OutcomeCounts {
  pub fn get(&self, outcome: Outcome) -> u64 {
    match outcome {
      Outcome::Green => self.green,
      Outcome::Amber => self.amber,
      Outcome::Red => self.red,
      Outcome::Active => self.active,
      Outcome::Completed => self.completed,
      Outcome::Withdrawn => self.withdrawn,
    }
  }

  fn slot(&mut self, outcome: Outcome) -> &mut u64 {
    match outcome {
      Outcome::Green => &mut self.green,
      Outcome::Amber => &mut self.amber,
      Outcome::Red => &mut self.red,
      Outcome::Active => &mut self.active,
      Outcome::Completed => &mut self.completed,
      Outcome::Withdrawn => &mut self.withdrawn,
    }
  }

  pub fn increment(&mut self, outcome: Outcome) { *self.slot(outcome) += 1; }

  /// Sum over every category.
  pub fn sum(&self) -> u64 { Outcome::iter().map(|o| self.get(o)).sum() }
}

/// A per-period row, or the summary row when `period_start` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
  pub period_label:    String,
  /// First day of the period; absent on the summary row.
  pub period_start:    Option<NaiveDate>,
  pub total:           u64,
  pub counts:          OutcomeCounts,
  /// Distinct `subject_id`s among this row's records.
  pub unique_subjects: u64,
}

impl ReportRow {
  pub fn is_summary(&self) -> bool { self.period_start.is_none() }
}

/// The aggregator's output: ascending period rows plus the grand total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
  pub rows:    Vec<ReportRow>,
  pub summary: ReportRow,
}

/// A report as served to presentation clients, with the inputs that shaped
/// it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDocument {
  pub kind:      RecordKind,
  pub config:    ReportConfig,
  /// The record source hit its page limit; counts cover a prefix only.
  #[serde(default)]
  pub truncated: bool,
  #[serde(flatten)]
  pub report:    Report,
}

// ─── Aggregation ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct Tally<'a> {
  total:    u64,
  counts:   OutcomeCounts,
  subjects: HashSet<&'a str>,
}

impl<'a> Tally<'a> {
  fn add(&mut self, record: &'a Record) {
    self.total += 1;
    self.counts.increment(record.outcome);
    self.subjects.insert(record.subject_id.as_str());
  }

  fn into_row(self, period_label: String, period_start: Option<NaiveDate>) -> ReportRow {
    ReportRow {
      period_label,
      period_start,
      total: self.total,
      counts: self.counts,
      unique_subjects: self.subjects.len() as u64,
    }
  }
}

/// Bucket `records` into report periods.
///
/// Records without a timestamp, or outside the inclusive configured range,
/// are skipped. The summary's `unique_subjects` counts each subject once
/// across the whole range, so it can be lower than the sum over rows.
///
/// Never fails: no surviving records gives no rows and an all-zero summary.
pub fn aggregate(records: &[Record], config: &ReportConfig) -> Report {
  let mut buckets: BTreeMap<NaiveDate, Tally<'_>> = BTreeMap::new();
  let mut summary = Tally::default();
  let mut skipped = 0usize;

  for record in records {
    let Some(timestamp) = record.timestamp.filter(|ts| config.contains(*ts))
    else {
      skipped += 1;
      continue;
    };

    let start = config.granularity.bucket_start(timestamp.date());
    buckets.entry(start).or_default().add(record);
    summary.add(record);
  }

  let rows: Vec<ReportRow> = buckets
    .into_iter()
    .map(|(start, tally)| {
      tally.into_row(config.granularity.label(start), Some(start))
    })
    .collect();

  tracing::debug!(
    granularity = %config.granularity,
    input = records.len(),
    skipped,
    rows = rows.len(),
    "aggregated report"
  );

  Report {
    rows,
    summary: summary.into_row(SUMMARY_LABEL.to_owned(), None),
  }
}
