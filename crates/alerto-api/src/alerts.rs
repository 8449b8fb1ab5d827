//! Handlers for `/alerts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/alerts` | Optional `status`, `contact`, `limit`, `offset`; newest-first |
//! | `GET`  | `/alerts/:id` | Single alert |
//! | `POST` | `/alerts/:id/resolve` | `Active → Resolved`, single-shot |
//! | `DELETE` | `/alerts/:id` | Removes the alert in any status |

use std::sync::Arc;

use alerto_core::{
  alert::{Alert, AlertId},
  report::AlertStatus,
  store::{AlertQuery, AlertStore},
};
use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};

use crate::error::ApiError;

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /alerts[?status=...][&contact=...][&limit=...][&offset=...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(query): Query<AlertQuery>,
) -> Result<Json<Vec<Alert>>, ApiError>
where
  S: AlertStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let alerts = store
    .list_alerts(query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(alerts))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /alerts/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<AlertId>,
) -> Result<Json<Alert>, ApiError>
where
  S: AlertStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let alert = store
    .get_alert(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("alert {id} not found")))?;
  Ok(Json(alert))
}

// ─── Resolve ─────────────────────────────────────────────────────────────────

/// `POST /alerts/:id/resolve` — returns the updated alert.
///
/// Resolving is single-shot: a second resolve of the same alert answers
/// 409 rather than succeeding idempotently, so an operator sees that
/// someone else already handled it.
pub async fn resolve_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<AlertId>,
) -> Result<Json<Alert>, ApiError>
where
  S: AlertStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let current = store
    .get_alert(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("alert {id} not found")))?;

  if current.status == AlertStatus::Resolved {
    return Err(ApiError::Conflict(format!("alert {id} is already resolved")));
  }

  let alert = store
    .resolve_alert(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(alert))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /alerts/:id` — returns 204 on success.
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<AlertId>,
) -> Result<StatusCode, ApiError>
where
  S: AlertStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  store
    .get_alert(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("alert {id} not found")))?;

  store
    .delete_alert(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(StatusCode::NO_CONTENT)
}
