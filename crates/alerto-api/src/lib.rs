//! JSON API for alerto.
//!
//! Exposes two axum [`Router`]s backed by any
//! [`alerto_core::store::AlertStore`]. Auth, TLS, and transport concerns are
//! the caller's responsibility; in particular the ingest router must stay
//! reachable without credentials, because the dispatch client sends no auth.
//!
//! # Mounting
//!
//! ```rust,ignore
//! Router::new()
//!   .nest("/api", alerto_api::ingest_router(store.clone()))
//!   .nest("/api", alerto_api::admin_router(store.clone()))
//! ```

pub mod alerts;
pub mod error;
pub mod ingest;

use std::sync::Arc;

use alerto_core::store::AlertStore;
use axum::{
  Router,
  routing::{get, post},
};

pub use error::ApiError;
pub use ingest::IngestResponse;

/// Build the open ingest router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn ingest_router<S>(store: Arc<S>) -> Router<()>
where
  S: AlertStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route("/trigger-sos", post(ingest::trigger_sos::<S>))
    .with_state(store)
}

/// Build the alert-management router for `store`.
///
/// Mount behind authentication; these routes list, resolve, and delete
/// stored alerts.
pub fn admin_router<S>(store: Arc<S>) -> Router<()>
where
  S: AlertStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route("/alerts", get(alerts::list::<S>))
    .route(
      "/alerts/{id}",
      get(alerts::get_one::<S>).delete(alerts::delete_one::<S>),
    )
    .route("/alerts/{id}/resolve", post(alerts::resolve_one::<S>))
    .with_state(store)
}
