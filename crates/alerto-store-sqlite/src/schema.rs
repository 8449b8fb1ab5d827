//! SQL schema for the alerto SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS alerts (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    name      TEXT    NOT NULL,
    timestamp INTEGER NOT NULL,   -- milliseconds since the Unix epoch
    lat       REAL    NOT NULL,
    lon       REAL    NOT NULL,
    contact   TEXT    NOT NULL,
    status    TEXT    NOT NULL DEFAULT 'Active'   -- 'Active' | 'Resolved'
);

CREATE INDEX IF NOT EXISTS alerts_timestamp_idx ON alerts(timestamp);
CREATE INDEX IF NOT EXISTS alerts_status_idx    ON alerts(status);

PRAGMA user_version = 1;
";
