//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! Timestamps are stored as integer milliseconds since the epoch, matching
//! the wire format, so the stored value is exactly what the report carried.
//! Statuses are stored as their wire strings.

use alerto_core::{alert::Alert, report::AlertStatus};
use chrono::{DateTime, Utc};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_ts(dt: DateTime<Utc>) -> i64 { dt.timestamp_millis() }

pub fn decode_ts(ms: i64) -> Result<DateTime<Utc>> {
  DateTime::from_timestamp_millis(ms).ok_or(Error::TimestampOutOfRange(ms))
}

// ─── AlertStatus ─────────────────────────────────────────────────────────────

pub fn encode_status(status: AlertStatus) -> &'static str {
  match status {
    AlertStatus::Active => "Active",
    AlertStatus::Resolved => "Resolved",
  }
}

pub fn decode_status(s: &str) -> Result<AlertStatus> {
  match s {
    "Active" => Ok(AlertStatus::Active),
    "Resolved" => Ok(AlertStatus::Resolved),
    other => Err(Error::StatusDecode(other.to_owned())),
  }
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Raw values read directly from an `alerts` row.
pub struct RawAlert {
  pub id:        i64,
  pub name:      String,
  pub timestamp: i64,
  pub lat:       f64,
  pub lon:       f64,
  pub contact:   String,
  pub status:    String,
}

impl RawAlert {
  /// Mapper for `SELECT id, name, timestamp, lat, lon, contact, status`.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:        row.get(0)?,
      name:      row.get(1)?,
      timestamp: row.get(2)?,
      lat:       row.get(3)?,
      lon:       row.get(4)?,
      contact:   row.get(5)?,
      status:    row.get(6)?,
    })
  }

  pub fn into_alert(self) -> Result<Alert> {
    Ok(Alert {
      id:        self.id,
      name:      self.name,
      timestamp: decode_ts(self.timestamp)?,
      lat:       self.lat,
      lon:       self.lon,
      contact:   self.contact,
      status:    decode_status(&self.status)?,
    })
  }
}
