//! The SOS report — the wire payload of one dispatch.
//!
//! A report is constructed fresh for every trigger, is immutable once built,
//! and is discarded after the send attempt. On the wire it is a flat JSON
//! object with exactly six keys: `name`, `timestamp`, `lat`, `lon`,
//! `contact`, `status`. `timestamp` travels as integer milliseconds since
//! the epoch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::position::Position;

// ─── Status ──────────────────────────────────────────────────────────────────

/// Lifecycle status of an alert. Every report is sent `Active`; the server
/// side may later mark the stored alert `Resolved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertStatus {
  Active,
  Resolved,
}

impl AlertStatus {
  pub fn is_active(&self) -> bool { matches!(self, Self::Active) }
}

impl std::fmt::Display for AlertStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.pad(match self {
      Self::Active => "Active",
      Self::Resolved => "Resolved",
    })
  }
}

// ─── Report ──────────────────────────────────────────────────────────────────

/// One SOS event as it travels over the wire.
///
/// `deny_unknown_fields` makes the six-key shape a hard contract on ingest:
/// a payload with extra keys is rejected rather than silently accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SosReport {
  pub name:      String,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub timestamp: DateTime<Utc>,
  pub lat:       f64,
  pub lon:       f64,
  pub contact:   String,
  pub status:    AlertStatus,
}

impl SosReport {
  /// Build an `Active` report for `position`, stamped with `timestamp`.
  pub fn new(
    name: impl Into<String>,
    contact: impl Into<String>,
    position: Position,
    timestamp: DateTime<Utc>,
  ) -> Self {
    Self {
      name: name.into(),
      timestamp,
      lat: position.lat,
      lon: position.lon,
      contact: contact.into(),
      status: AlertStatus::Active,
    }
  }

  pub fn position(&self) -> Position {
    Position { lat: self.lat, lon: self.lon }
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn report() -> SosReport {
    SosReport::new(
      "SafeUser",
      "+919999999999",
      Position::new(12.9716, 77.5946).unwrap(),
      Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
    )
  }

  #[test]
  fn wire_form_has_exactly_six_keys() {
    let value = serde_json::to_value(report()).unwrap();
    let obj = value.as_object().unwrap();

    let mut keys: Vec<_> = obj.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
      keys,
      ["contact", "lat", "lon", "name", "status", "timestamp"]
    );
  }

  #[test]
  fn timestamp_travels_as_epoch_milliseconds() {
    let value = serde_json::to_value(report()).unwrap();
    assert_eq!(value["timestamp"], 1_700_000_000_000i64);
    assert_eq!(value["status"], "Active");
  }

  #[test]
  fn wire_roundtrip_preserves_coordinates() {
    let original = report();
    let json = serde_json::to_string(&original).unwrap();
    let back: SosReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back, original);
  }

  #[test]
  fn unknown_keys_are_rejected() {
    let json = r#"{
      "name": "SafeUser", "timestamp": 0, "lat": 1.0, "lon": 2.0,
      "contact": "+911234567890", "status": "Active", "notes": "extra"
    }"#;
    assert!(serde_json::from_str::<SosReport>(json).is_err());
  }

  #[test]
  fn missing_keys_are_rejected() {
    let json = r#"{"name": "SafeUser", "lat": 1.0, "lon": 2.0}"#;
    assert!(serde_json::from_str::<SosReport>(json).is_err());
  }
}
