//! HTTP shell for the alerto alert server.
//!
//! Mounts the `alerto-api` routers over a SQLite store: the SOS ingest
//! endpoint stays open (the dispatch client sends no credentials), while the
//! alert-management endpoints sit behind HTTP Basic auth verified against an
//! argon2 hash.

pub mod auth;
pub mod error;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use alerto_core::store::AlertStore;
use axum::{Router, middleware};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::AuthConfig;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub db_path:            PathBuf,
  pub auth_username:      String,
  pub auth_password_hash: String,
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through the routers.
#[derive(Clone)]
pub struct AppState<S: AlertStore> {
  pub store: Arc<S>,
  pub auth:  Arc<AuthConfig>,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the alert server.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: AlertStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let api = alerto_api::ingest_router(state.store.clone()).merge(
    alerto_api::admin_router(state.store.clone()).route_layer(
      middleware::from_fn_with_state(state.auth.clone(), auth::require_auth),
    ),
  );

  Router::new()
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use alerto_store_sqlite::SqliteStore;
  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use rand_core::OsRng;
  use tower::ServiceExt as _;

  async fn make_state(password: &str) -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();

    AppState {
      store: Arc::new(store),
      auth:  Arc::new(AuthConfig {
        username:      "admin".to_string(),
        password_hash: hash,
      }),
    }
  }

  fn auth_header(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  fn wire_report(name: &str, ts_ms: i64) -> String {
    serde_json::json!({
      "name":      name,
      "timestamp": ts_ms,
      "lat":       12.9716,
      "lon":       77.5946,
      "contact":   "+919876543210",
      "status":    "Active",
    })
    .to_string()
  }

  async fn oneshot_raw(
    state: AppState<SqliteStore>,
    method: &str,
    uri: &str,
    headers: Vec<(header::HeaderName, &str)>,
    body: &str,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    for (k, v) in headers {
      builder = builder.header(k, v);
    }
    let req = builder.body(Body::from(body.to_string())).unwrap();
    router(state).oneshot(req).await.unwrap()
  }

  async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  async fn ingest(state: AppState<SqliteStore>, body: &str) -> axum::response::Response {
    oneshot_raw(
      state,
      "POST",
      "/api/trigger-sos",
      vec![(header::CONTENT_TYPE, "application/json")],
      body,
    )
    .await
  }

  // ── Ingest ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn ingest_needs_no_auth_and_answers_200() {
    let state = make_state("secret").await;
    let resp = ingest(state, &wire_report("Asha", 1_700_000_000_000)).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["id"], 1);
  }

  #[tokio::test]
  async fn ingest_rejects_unknown_keys() {
    let state = make_state("secret").await;
    let body = serde_json::json!({
      "name":      "Asha",
      "timestamp": 1_700_000_000_000_i64,
      "lat":       12.9716,
      "lon":       77.5946,
      "contact":   "+919876543210",
      "status":    "Active",
      "note":      "extra",
    })
    .to_string();

    let resp = ingest(state, &body).await;
    assert!(resp.status().is_client_error(), "got {}", resp.status());
  }

  #[tokio::test]
  async fn ingest_rejects_missing_keys() {
    let state = make_state("secret").await;
    let body = serde_json::json!({
      "name": "Asha",
      "lat":  12.9716,
      "lon":  77.5946,
    })
    .to_string();

    let resp = ingest(state, &body).await;
    assert!(resp.status().is_client_error(), "got {}", resp.status());
  }

  #[tokio::test]
  async fn ingest_rejects_out_of_range_coordinates() {
    let state = make_state("secret").await;
    let body = serde_json::json!({
      "name":      "Asha",
      "timestamp": 1_700_000_000_000_i64,
      "lat":       123.0,
      "lon":       77.5946,
      "contact":   "+919876543210",
      "status":    "Active",
    })
    .to_string();

    let resp = ingest(state, &body).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn ingest_rejects_malformed_json() {
    let state = make_state("secret").await;
    let resp = ingest(state, "{not json").await;
    assert!(resp.status().is_client_error(), "got {}", resp.status());
  }

  // ── Auth gate ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn admin_routes_require_auth() {
    let state = make_state("secret").await;

    let resp = oneshot_raw(state, "GET", "/api/alerts", vec![], "").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
  }

  #[tokio::test]
  async fn wrong_password_is_rejected() {
    let state = make_state("secret").await;
    let auth = auth_header("admin", "wrong");

    let resp = oneshot_raw(
      state,
      "GET",
      "/api/alerts",
      vec![(header::AUTHORIZATION, auth.as_str())],
      "",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  // ── Alert management ────────────────────────────────────────────────────

  #[tokio::test]
  async fn stored_alerts_list_newest_first() {
    let state = make_state("secret").await;
    let auth = auth_header("admin", "secret");

    ingest(state.clone(), &wire_report("older", 1_000)).await;
    ingest(state.clone(), &wire_report("newer", 2_000)).await;

    let resp = oneshot_raw(
      state,
      "GET",
      "/api/alerts",
      vec![(header::AUTHORIZATION, auth.as_str())],
      "",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["name"], "newer");
    assert_eq!(list[1]["name"], "older");
    // Timestamps travel as integer milliseconds.
    assert_eq!(list[0]["timestamp"], 2_000);
  }

  #[tokio::test]
  async fn list_filters_by_status() {
    let state = make_state("secret").await;
    let auth = auth_header("admin", "secret");

    ingest(state.clone(), &wire_report("a", 1_000)).await;
    ingest(state.clone(), &wire_report("b", 2_000)).await;

    oneshot_raw(
      state.clone(),
      "POST",
      "/api/alerts/1/resolve",
      vec![(header::AUTHORIZATION, auth.as_str())],
      "",
    )
    .await;

    let resp = oneshot_raw(
      state,
      "GET",
      "/api/alerts?status=Active",
      vec![(header::AUTHORIZATION, auth.as_str())],
      "",
    )
    .await;
    let body = body_json(resp).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], 2);
  }

  #[tokio::test]
  async fn get_missing_alert_returns_404() {
    let state = make_state("secret").await;
    let auth = auth_header("admin", "secret");

    let resp = oneshot_raw(
      state,
      "GET",
      "/api/alerts/99",
      vec![(header::AUTHORIZATION, auth.as_str())],
      "",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn resolve_is_single_shot() {
    let state = make_state("secret").await;
    let auth = auth_header("admin", "secret");

    ingest(state.clone(), &wire_report("Asha", 1_000)).await;

    let first = oneshot_raw(
      state.clone(),
      "POST",
      "/api/alerts/1/resolve",
      vec![(header::AUTHORIZATION, auth.as_str())],
      "",
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);
    let body = body_json(first).await;
    assert_eq!(body["status"], "Resolved");

    let second = oneshot_raw(
      state,
      "POST",
      "/api/alerts/1/resolve",
      vec![(header::AUTHORIZATION, auth.as_str())],
      "",
    )
    .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
  }

  #[tokio::test]
  async fn delete_then_404() {
    let state = make_state("secret").await;
    let auth = auth_header("admin", "secret");

    ingest(state.clone(), &wire_report("Asha", 1_000)).await;

    let del = oneshot_raw(
      state.clone(),
      "DELETE",
      "/api/alerts/1",
      vec![(header::AUTHORIZATION, auth.as_str())],
      "",
    )
    .await;
    assert_eq!(del.status(), StatusCode::NO_CONTENT);

    let get = oneshot_raw(
      state.clone(),
      "GET",
      "/api/alerts/1",
      vec![(header::AUTHORIZATION, auth.as_str())],
      "",
    )
    .await;
    assert_eq!(get.status(), StatusCode::NOT_FOUND);

    let del_again = oneshot_raw(
      state,
      "DELETE",
      "/api/alerts/1",
      vec![(header::AUTHORIZATION, auth.as_str())],
      "",
    )
    .await;
    assert_eq!(del_again.status(), StatusCode::NOT_FOUND);
  }
}
