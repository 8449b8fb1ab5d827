//! Alert — a stored SOS report with a server-assigned id.
//!
//! The receiving side persists every accepted report as an alert. The id is
//! a SQLite rowid-style integer; `status` is the only mutable field and
//! changes exactly once, via the resolve operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{position::Position, report::AlertStatus};

/// Store-assigned alert identifier.
pub type AlertId = i64;

/// One stored alert: the six report fields plus the assigned id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
  pub id:        AlertId,
  pub name:      String,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub timestamp: DateTime<Utc>,
  pub lat:       f64,
  pub lon:       f64,
  pub contact:   String,
  pub status:    AlertStatus,
}

impl Alert {
  pub fn position(&self) -> Position {
    Position { lat: self.lat, lon: self.lon }
  }

  /// Map link for the alert's position, as shown by the dashboard.
  pub fn maps_url(&self) -> String { self.position().maps_url() }
}
