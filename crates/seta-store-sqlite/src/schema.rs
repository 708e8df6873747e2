//! SQL schema for the SETA SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Records are append-only; reports never modify them.
CREATE TABLE IF NOT EXISTS records (
    record_id    TEXT PRIMARY KEY,
    kind         TEXT NOT NULL,   -- 'verification' | 'enrollment'
    subject_id   TEXT NOT NULL,
    occurred_at  TEXT,            -- %Y-%m-%dT%H:%M:%S%.9f wall clock, or NULL
    outcome      TEXT NOT NULL,   -- normalised Outcome, e.g. 'amber'
    recorded_at  TEXT NOT NULL,   -- RFC 3339 UTC; server-assigned
    CHECK (kind IN ('verification', 'enrollment'))
);

CREATE INDEX IF NOT EXISTS records_kind_time_idx ON records(kind, occurred_at);
CREATE INDEX IF NOT EXISTS records_subject_idx   ON records(subject_id);

PRAGMA user_version = 1;
";
