//! The storage abstraction for received alerts.
//!
//! Backends implement [`AlertStore`]; the bundled implementation lives in
//! `alerto-store-sqlite`. The API layer is generic over this trait so
//! handler tests can run against an in-memory store.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  alert::{Alert, AlertId},
  report::{AlertStatus, SosReport},
};

// ─── Queries ─────────────────────────────────────────────────────────────────

/// Filter and pagination parameters for listing alerts.
///
/// All fields are optional; the default query returns every alert,
/// newest-first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertQuery {
  /// Restrict to alerts in this status.
  pub status:  Option<AlertStatus>,
  /// Restrict to alerts carrying this contact number.
  pub contact: Option<String>,
  /// Maximum number of rows to return.
  pub limit:   Option<u32>,
  /// Number of rows to skip before returning.
  pub offset:  Option<u32>,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// The alert storage backend.
///
/// Identifiers are assigned by the backend on insert and are stable for the
/// lifetime of the row. Listing order is newest-first by timestamp, falling
/// back to descending id for equal timestamps.
pub trait AlertStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a received report and return the stored row, id assigned.
  fn record_alert(
    &self,
    report: SosReport,
  ) -> impl Future<Output = Result<Alert, Self::Error>> + Send + '_;

  /// Fetch one alert by id, `None` if no such row exists.
  fn get_alert(
    &self,
    id: AlertId,
  ) -> impl Future<Output = Result<Option<Alert>, Self::Error>> + Send + '_;

  /// List alerts matching the query, newest-first.
  fn list_alerts(
    &self,
    query: AlertQuery,
  ) -> impl Future<Output = Result<Vec<Alert>, Self::Error>> + Send + '_;

  /// Mark an active alert resolved and return the updated row.
  ///
  /// Fails when the id is unknown or the alert is already resolved.
  fn resolve_alert(
    &self,
    id: AlertId,
  ) -> impl Future<Output = Result<Alert, Self::Error>> + Send + '_;

  /// Delete an alert in any status.
  ///
  /// Fails when the id is unknown.
  fn delete_alert(
    &self,
    id: AlertId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
