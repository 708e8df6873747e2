//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{NaiveDate, NaiveDateTime};
use seta_core::{
  aggregate,
  config::{Granularity, ReportConfig},
  record::{Outcome, Record, RecordKind},
  source::{CollectLimits, RecordQuery, RecordSource, collect_records},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn at(y: i32, m: u32, d: u32, h: u32) -> Option<NaiveDateTime> {
  NaiveDate::from_ymd_opt(y, m, d)
    .unwrap()
    .and_hms_opt(h, 0, 0)
}

fn query(kind: RecordKind, page: usize, page_size: usize) -> RecordQuery {
  RecordQuery {
    kind,
    range_start: None,
    range_end: None,
    page,
    page_size,
  }
}

fn january() -> ReportConfig {
  ReportConfig::for_dates(
    Granularity::Weekly,
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
    NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
  )
  .unwrap()
}

// ─── Inserts ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_fetch_round_trip() {
  let s = store().await;
  let input = vec![
    Record::new("8001015009087", at(2025, 1, 6, 9), Outcome::Green),
    Record::new("X", at(2025, 1, 7, 9), Outcome::Amber),
  ];

  let stored = s
    .insert_records(RecordKind::Verification, input.clone())
    .await
    .unwrap();
  assert_eq!(stored.len(), 2);
  assert!(stored.iter().all(|r| r.kind == RecordKind::Verification));

  let page = s
    .fetch_page(&query(RecordKind::Verification, 0, 10))
    .await
    .unwrap();
  assert_eq!(page.total, 2);
  let got: Vec<Record> = page.records.into_iter().map(|r| r.record).collect();
  assert_eq!(got, input);
}

#[tokio::test]
async fn insert_rejects_outcome_of_other_kind() {
  let s = store().await;
  let err = s
    .insert_records(
      RecordKind::Verification,
      vec![
        Record::new("A", at(2025, 1, 6, 9), Outcome::Green),
        Record::new("B", at(2025, 1, 6, 9), Outcome::Withdrawn),
      ],
    )
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(seta_core::Error::OutcomeKindMismatch { .. })
  ));

  // Nothing from the rejected batch was written.
  let page = s
    .fetch_page(&query(RecordKind::Verification, 0, 10))
    .await
    .unwrap();
  assert_eq!(page.total, 0);
}

#[tokio::test]
async fn kinds_are_kept_apart() {
  let s = store().await;
  s.insert_records(
    RecordKind::Verification,
    vec![Record::new("A", at(2025, 1, 6, 9), Outcome::Red)],
  )
  .await
  .unwrap();
  s.insert_records(
    RecordKind::Enrollment,
    vec![
      Record::new("A", at(2025, 1, 6, 9), Outcome::Active),
      Record::new("B", at(2025, 1, 8, 9), Outcome::Completed),
    ],
  )
  .await
  .unwrap();

  let enrollments = s
    .fetch_page(&query(RecordKind::Enrollment, 0, 10))
    .await
    .unwrap();
  assert_eq!(enrollments.total, 2);
  assert!(
    enrollments
      .records
      .iter()
      .all(|r| r.kind == RecordKind::Enrollment)
  );
}

// ─── Paging and ranges ───────────────────────────────────────────────────────

#[tokio::test]
async fn pages_are_ordered_by_timestamp() {
  let s = store().await;
  let input: Vec<Record> = [20, 3, 11, 7, 15]
    .into_iter()
    .map(|d| Record::new(format!("S{d}"), at(2025, 1, d, 12), Outcome::Green))
    .collect();
  s.insert_records(RecordKind::Verification, input).await.unwrap();

  let first = s
    .fetch_page(&query(RecordKind::Verification, 0, 2))
    .await
    .unwrap();
  let second = s
    .fetch_page(&query(RecordKind::Verification, 1, 2))
    .await
    .unwrap();
  let third = s
    .fetch_page(&query(RecordKind::Verification, 2, 2))
    .await
    .unwrap();

  let ids: Vec<String> = [first, second, third]
    .into_iter()
    .flat_map(|p| p.records)
    .map(|r| r.record.subject_id)
    .collect();
  assert_eq!(ids, ["S3", "S7", "S11", "S15", "S20"]);
}

#[tokio::test]
async fn page_past_addressable_rows_is_empty() {
  let s = store().await;
  let input: Vec<Record> = (1..=5)
    .map(|d| Record::new(format!("S{d}"), at(2025, 1, d, 12), Outcome::Green))
    .collect();
  s.insert_records(RecordKind::Verification, input).await.unwrap();

  for (page, page_size) in [(usize::MAX, 2), (usize::MAX / 2, 4), (3, usize::MAX)] {
    let result = s
      .fetch_page(&query(RecordKind::Verification, page, page_size))
      .await
      .unwrap();
    assert!(result.records.is_empty(), "page {page} of size {page_size}");
    assert_eq!(result.page, page);
    assert_eq!(result.total, 5);
  }

  // A huge page size on the first page still returns everything.
  let all = s
    .fetch_page(&query(RecordKind::Verification, 0, usize::MAX))
    .await
    .unwrap();
  assert_eq!(all.records.len(), 5);
}

#[tokio::test]
async fn undated_records_only_in_unranged_queries() {
  let s = store().await;
  s.insert_records(
    RecordKind::Verification,
    vec![
      Record::new("dated", at(2025, 1, 6, 9), Outcome::Green),
      Record::new("undated", None, Outcome::Green),
    ],
  )
  .await
  .unwrap();

  let all = s
    .fetch_page(&query(RecordKind::Verification, 0, 10))
    .await
    .unwrap();
  assert_eq!(all.total, 2);
  // Undated rows sort last.
  assert_eq!(all.records[1].record.subject_id, "undated");
  assert_eq!(all.records[1].record.timestamp, None);

  let cfg = january();
  let ranged = s
    .fetch_page(&RecordQuery {
      range_start: Some(cfg.range_start),
      range_end: Some(cfg.range_end),
      ..query(RecordKind::Verification, 0, 10)
    })
    .await
    .unwrap();
  assert_eq!(ranged.total, 1);
  assert_eq!(ranged.records[0].record.subject_id, "dated");
}

#[tokio::test]
async fn range_end_includes_last_millisecond() {
  let s = store().await;
  let cfg = january();
  s.insert_records(
    RecordKind::Verification,
    vec![
      Record::new("last", Some(cfg.range_end), Outcome::Green),
      Record::new("after", at(2025, 2, 1, 0), Outcome::Green),
      Record::new("before", at(2024, 12, 31, 23), Outcome::Green),
    ],
  )
  .await
  .unwrap();

  let page = s
    .fetch_page(&RecordQuery {
      range_start: Some(cfg.range_start),
      range_end: Some(cfg.range_end),
      ..query(RecordKind::Verification, 0, 10)
    })
    .await
    .unwrap();
  assert_eq!(page.total, 1);
  assert_eq!(page.records[0].record.subject_id, "last");
}

#[tokio::test]
async fn range_end_excludes_sub_millisecond_overrun() {
  let s = store().await;
  let cfg = january();
  let overrun = NaiveDate::from_ymd_opt(2025, 1, 31)
    .unwrap()
    .and_hms_nano_opt(23, 59, 59, 999_500_000);
  let records = vec![
    Record::new("last", Some(cfg.range_end), Outcome::Green),
    Record::new("overrun", overrun, Outcome::Red),
  ];
  let inline = aggregate(&records, &cfg);
  s.insert_records(RecordKind::Verification, records).await.unwrap();

  let collected = collect_records(
    &s,
    RecordKind::Verification,
    &cfg,
    CollectLimits::default(),
  )
  .await
  .unwrap();
  assert_eq!(collected.records.len(), 1);
  assert_eq!(collected.records[0].subject_id, "last");

  let stored = aggregate(&collected.records, &cfg);
  assert_eq!(stored, inline);
  assert_eq!(stored.summary.total, 1);
}

// ─── Collection + aggregation ────────────────────────────────────────────────

#[tokio::test]
async fn collect_then_aggregate() {
  let s = store().await;
  let mut input = Vec::new();
  for day in 1..=31 {
    input.push(Record::new(
      format!("S{}", day % 5),
      at(2025, 1, day, 10),
      if day % 3 == 0 { Outcome::Amber } else { Outcome::Green },
    ));
  }
  input.push(Record::new("late", at(2025, 2, 2, 10), Outcome::Red));
  s.insert_records(RecordKind::Verification, input).await.unwrap();

  let cfg = january();
  let collected = collect_records(
    &s,
    RecordKind::Verification,
    &cfg,
    CollectLimits {
      page_size: 8,
      max_pages: 10,
    },
  )
  .await
  .unwrap();
  assert!(!collected.truncated);
  assert_eq!(collected.records.len(), 31);
  assert_eq!(collected.pages_fetched, 4);

  let report = aggregate(&collected.records, &cfg);
  assert_eq!(report.summary.total, 31);
  assert_eq!(report.summary.counts.amber, 10);
  assert_eq!(report.summary.counts.red, 0);
  assert_eq!(report.summary.unique_subjects, 5);
  assert_eq!(report.rows[0].period_label, "Week of 29 Dec 2024");
  assert_eq!(report.rows.last().unwrap().period_label, "Week of 26 Jan 2025");
}

#[tokio::test]
async fn collect_truncates_at_page_cap() {
  let s = store().await;
  let input: Vec<Record> = (1..=20)
    .map(|d| Record::new("S", at(2025, 1, d, 10), Outcome::Green))
    .collect();
  s.insert_records(RecordKind::Verification, input).await.unwrap();

  let collected = collect_records(
    &s,
    RecordKind::Verification,
    &january(),
    CollectLimits {
      page_size: 5,
      max_pages: 2,
    },
  )
  .await
  .unwrap();
  assert!(collected.truncated);
  assert_eq!(collected.records.len(), 10);
}
