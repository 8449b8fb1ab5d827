//! Handler for the open SOS ingest endpoint.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/trigger-sos` | Body: the six-field report; returns 200 + [`IngestResponse`] |
//!
//! The dispatch client treats any status other than 200 as a failed send,
//! so a stored alert must answer 200, never 201.

use std::sync::Arc;

use alerto_core::{
  alert::AlertId, position::Position, report::SosReport, store::AlertStore,
};
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Acknowledgement body for a stored alert.
#[derive(Debug, Serialize, Deserialize)]
pub struct IngestResponse {
  pub success: bool,
  pub id:      AlertId,
}

/// `POST /trigger-sos` — store one incoming report as a new alert.
///
/// The report's `deny_unknown_fields` deserialisation already rejects
/// payloads that are not exactly the six-key wire object; this handler adds
/// the coordinate range check before storing.
pub async fn trigger_sos<S>(
  State(store): State<Arc<S>>,
  Json(report): Json<SosReport>,
) -> Result<Json<IngestResponse>, ApiError>
where
  S: AlertStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Position::new(report.lat, report.lon)
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let alert = store
    .record_alert(report)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(IngestResponse { success: true, id: alert.id }))
}
