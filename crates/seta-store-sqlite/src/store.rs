//! [`SqliteStore`], the SQLite implementation of [`RecordSource`].

use std::path::Path;

use chrono::Utc;
use uuid::Uuid;

use seta_core::{
  record::{Record, RecordKind, StoredRecord},
  source::{RecordPage, RecordQuery, RecordSource},
};

use crate::{
  encode::{RawRecord, encode_dt, encode_kind, encode_occurred_at, encode_outcome, encode_uuid},
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A record store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── RecordSource impl ───────────────────────────────────────────────────────

impl RecordSource for SqliteStore {
  type Error = Error;

  async fn insert_records(
    &self,
    kind: RecordKind,
    records: Vec<Record>,
  ) -> Result<Vec<StoredRecord>> {
    for record in &records {
      record.check_kind(kind)?;
    }

    let recorded_at = Utc::now();
    let stored: Vec<StoredRecord> = records
      .into_iter()
      .map(|record| StoredRecord {
        record_id: Uuid::new_v4(),
        kind,
        recorded_at,
        record,
      })
      .collect();

    let rows: Vec<(String, String, Option<String>, &'static str)> = stored
      .iter()
      .map(|s| {
        (
          encode_uuid(s.record_id),
          s.record.subject_id.clone(),
          s.record.timestamp.map(encode_occurred_at),
          encode_outcome(s.record.outcome),
        )
      })
      .collect();
    let kind_str = encode_kind(kind);
    let at_str   = encode_dt(recorded_at);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO records (
               record_id, kind, subject_id, occurred_at, outcome, recorded_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          )?;
          for (id, subject, occurred_at, outcome) in &rows {
            stmt.execute(rusqlite::params![
              id,
              kind_str,
              subject,
              occurred_at,
              outcome,
              at_str,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    tracing::info!(%kind, count = stored.len(), "inserted records");
    Ok(stored)
  }

  async fn fetch_page(&self, query: &RecordQuery) -> Result<RecordPage> {
    let kind_str  = encode_kind(query.kind);
    let ranged    = query.is_ranged();
    let start_str = query.range_start.map(encode_occurred_at);
    let end_str   = query.range_end.map(encode_occurred_at);
    let limit     = i64::try_from(query.page_size).unwrap_or(i64::MAX);
    // `None` when the page starts beyond any row SQLite can address.
    let offset    = query
      .page
      .checked_mul(query.page_size)
      .and_then(|o| i64::try_from(o).ok());

    let (raws, total): (Vec<RawRecord>, i64) = self
      .conn
      .call(move |conn| {
        // Undated rows never satisfy a comparison, so any bound excludes them.
        let mut conds = vec!["kind = ?1"];
        if ranged {
          conds.push("occurred_at >= COALESCE(?2, '')");
          conds.push("occurred_at <= COALESCE(?3, '9999')");
        } else {
          // Keeps ?2/?3 bound so both branches share one parameter list.
          conds.push("(?2 IS NULL AND ?3 IS NULL)");
        }
        let where_clause = conds.join(" AND ");

        let total: i64 = conn.query_row(
          &format!("SELECT COUNT(*) FROM records WHERE {where_clause}"),
          rusqlite::params![kind_str, start_str, end_str],
          |row| row.get(0),
        )?;

        let Some(offset) = offset else {
          return Ok((Vec::new(), total));
        };

        let sql = format!(
          "SELECT {cols}
           FROM records
           WHERE {where_clause}
           ORDER BY occurred_at IS NULL, occurred_at, record_id
           LIMIT ?4 OFFSET ?5",
          cols = RawRecord::COLUMNS,
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![kind_str, start_str, end_str, limit, offset],
            RawRecord::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((rows, total))
      })
      .await?;

    let records = raws
      .into_iter()
      .map(RawRecord::into_stored)
      .collect::<Result<Vec<_>>>()?;

    Ok(RecordPage {
      records,
      page: query.page,
      page_size: query.page_size,
      total: total.max(0) as u64,
    })
  }
}
