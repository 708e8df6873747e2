//! The `RecordSource` trait and bounded, paginated record collection.
//!
//! A record source is whatever fetches raw verification/enrollment records
//! (e.g. `seta-store-sqlite`). Large ranges come back in pages; callers use
//! [`collect_records`] to assemble a report's input without issuing an
//! unbounded number of requests.

use std::future::Future;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{
  Error,
  config::ReportConfig,
  record::{Record, RecordKind, StoredRecord},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`RecordSource::fetch_page`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
  pub kind:        RecordKind,
  /// Inclusive lower bound on the event timestamp.
  pub range_start: Option<NaiveDateTime>,
  /// Inclusive upper bound on the event timestamp.
  pub range_end:   Option<NaiveDateTime>,
  /// Zero-based page index.
  pub page:        usize,
  pub page_size:   usize,
}

impl RecordQuery {
  /// Whether the query restricts timestamps at all. Undated records are only
  /// returned by unrestricted queries.
  pub fn is_ranged(&self) -> bool {
    self.range_start.is_some() || self.range_end.is_some()
  }
}

/// One page of records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPage {
  pub records:   Vec<StoredRecord>,
  pub page:      usize,
  pub page_size: usize,
  /// Number of records matching the query across all pages.
  pub total:     u64,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a backend that stores and pages through records.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RecordSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist already-normalised records of one kind.
  fn insert_records(
    &self,
    kind: RecordKind,
    records: Vec<Record>,
  ) -> impl Future<Output = Result<Vec<StoredRecord>, Self::Error>> + Send + '_;

  /// Fetch one page of records, ordered by timestamp.
  fn fetch_page<'a>(
    &'a self,
    query: &'a RecordQuery,
  ) -> impl Future<Output = Result<RecordPage, Self::Error>> + Send + 'a;
}

// ─── Collection ──────────────────────────────────────────────────────────────

/// How far [`collect_records`] may page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectLimits {
  pub page_size: usize,
  pub max_pages: usize,
}

impl Default for CollectLimits {
  fn default() -> Self {
    Self {
      page_size: 500,
      max_pages: 20,
    }
  }
}

/// The assembled input for one report.
#[derive(Debug, Clone)]
pub struct Collected {
  pub records:       Vec<Record>,
  pub pages_fetched: usize,
  /// `true` when `max_pages` was hit before the source ran dry.
  pub truncated:     bool,
}

/// Failure while collecting: either bad limits or a source error.
#[derive(Debug, thiserror::Error)]
pub enum CollectError<E: std::error::Error + 'static> {
  #[error(transparent)]
  Core(#[from] Error),

  #[error("record source error: {0}")]
  Source(#[source] E),
}

/// Page through `source` for every `kind` record inside `config`'s range.
///
/// Stops on the first short page or after `limits.max_pages` pages, whichever
/// comes first.
pub async fn collect_records<S>(
  source: &S,
  kind: RecordKind,
  config: &ReportConfig,
  limits: CollectLimits,
) -> Result<Collected, CollectError<S::Error>>
where
  S: RecordSource,
{
  if limits.page_size == 0 || limits.max_pages == 0 {
    return Err(Error::InvalidLimits.into());
  }

  let mut records = Vec::new();
  let mut pages_fetched = 0;

  while pages_fetched < limits.max_pages {
    let query = RecordQuery {
      kind,
      range_start: Some(config.range_start),
      range_end: Some(config.range_end),
      page: pages_fetched,
      page_size: limits.page_size,
    };
    let page = source
      .fetch_page(&query)
      .await
      .map_err(CollectError::Source)?;
    pages_fetched += 1;

    let count = page.records.len();
    records.extend(page.records.into_iter().map(|s| s.record));

    if count < limits.page_size || records.len() as u64 >= page.total {
      return Ok(Collected {
        records,
        pages_fetched,
        truncated: false,
      });
    }
  }

  tracing::warn!(
    %kind,
    pages = pages_fetched,
    collected = records.len(),
    "page limit reached; report input is truncated"
  );

  Ok(Collected {
    records,
    pages_fetched,
    truncated: true,
  })
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use chrono::{DateTime, NaiveDate, Utc};
  use uuid::Uuid;

  use super::*;
  use crate::{config::Granularity, record::Outcome};

  /// In-memory source that records every query it serves.
  struct VecSource {
    records: Vec<StoredRecord>,
    queries: Mutex<Vec<RecordQuery>>,
  }

  impl VecSource {
    fn with_len(n: usize) -> Self {
      let base = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
      let records = (0..n)
        .map(|i| StoredRecord {
          record_id:   Uuid::new_v4(),
          kind:        RecordKind::Verification,
          recorded_at: DateTime::<Utc>::UNIX_EPOCH,
          record:      Record::new(
            format!("S{i}"),
            base.and_hms_opt(0, 0, 0),
            Outcome::Green,
          ),
        })
        .collect();
      Self {
        records,
        queries: Mutex::new(Vec::new()),
      }
    }
  }

  impl RecordSource for VecSource {
    type Error = std::io::Error;

    async fn insert_records(
      &self,
      _kind: RecordKind,
      _records: Vec<Record>,
    ) -> Result<Vec<StoredRecord>, Self::Error> {
      Err(std::io::Error::other("read-only"))
    }

    async fn fetch_page(
      &self,
      query: &RecordQuery,
    ) -> Result<RecordPage, Self::Error> {
      self.queries.lock().unwrap().push(query.clone());
      let records = self
        .records
        .iter()
        .skip(query.page * query.page_size)
        .take(query.page_size)
        .cloned()
        .collect();
      Ok(RecordPage {
        records,
        page: query.page,
        page_size: query.page_size,
        total: self.records.len() as u64,
      })
    }
  }

  fn config() -> ReportConfig {
    let d = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    ReportConfig::for_dates(Granularity::Daily, d, d).unwrap()
  }

  #[tokio::test]
  async fn collects_all_pages() {
    let source = VecSource::with_len(25);
    let limits = CollectLimits {
      page_size: 10,
      max_pages: 5,
    };
    let got = collect_records(&source, RecordKind::Verification, &config(), limits)
      .await
      .unwrap();
    assert_eq!(got.records.len(), 25);
    assert_eq!(got.pages_fetched, 3);
    assert!(!got.truncated);

    let queries = source.queries.lock().unwrap();
    let pages: Vec<_> = queries.iter().map(|q| q.page).collect();
    assert_eq!(pages, [0, 1, 2]);
    assert!(queries.iter().all(|q| q.is_ranged()));
  }

  #[tokio::test]
  async fn exact_multiple_stops_on_total() {
    let source = VecSource::with_len(20);
    let limits = CollectLimits {
      page_size: 10,
      max_pages: 5,
    };
    let got = collect_records(&source, RecordKind::Verification, &config(), limits)
      .await
      .unwrap();
    assert_eq!(got.records.len(), 20);
    assert_eq!(got.pages_fetched, 2);
    assert!(!got.truncated);
  }

  #[tokio::test]
  async fn page_cap_truncates() {
    let source = VecSource::with_len(100);
    let limits = CollectLimits {
      page_size: 10,
      max_pages: 3,
    };
    let got = collect_records(&source, RecordKind::Verification, &config(), limits)
      .await
      .unwrap();
    assert_eq!(got.records.len(), 30);
    assert_eq!(got.pages_fetched, 3);
    assert!(got.truncated);
  }

  #[tokio::test]
  async fn zero_limits_are_rejected() {
    let source = VecSource::with_len(1);
    let limits = CollectLimits {
      page_size: 0,
      max_pages: 3,
    };
    let err = collect_records(&source, RecordKind::Verification, &config(), limits)
      .await
      .unwrap_err();
    assert!(matches!(err, CollectError::Core(Error::InvalidLimits)));
    assert!(source.queries.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn empty_source_is_one_page() {
    let source = VecSource::with_len(0);
    let got = collect_records(
      &source,
      RecordKind::Verification,
      &config(),
      CollectLimits::default(),
    )
    .await
    .unwrap();
    assert!(got.records.is_empty());
    assert_eq!(got.pages_fetched, 1);
    assert!(!got.truncated);
  }
}
