//! Async HTTP client wrapping the alerto alert-management API.

use alerto_core::alert::{Alert, AlertId};
use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use std::time::Duration;

/// Connection settings for the alerto API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

/// Async HTTP client for the alerto JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    if self.config.username.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.username, Some(&self.config.password))
    }
  }

  // ── Alerts ────────────────────────────────────────────────────────────────

  /// `GET /api/alerts[?status=..][&contact=..]`
  pub async fn list_alerts(
    &self,
    status: Option<&str>,
    contact: Option<&str>,
  ) -> Result<Vec<Alert>> {
    let mut query: Vec<(&str, String)> = Vec::new();
    if let Some(status) = status {
      query.push(("status", status.to_string()));
    }
    if let Some(contact) = contact {
      query.push(("contact", contact.to_string()));
    }

    let resp = self
      .auth(self.client.get(self.url("/alerts")))
      .query(&query)
      .send()
      .await
      .context("GET /alerts failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /alerts → {}", resp.status()));
    }
    resp.json().await.context("deserialising alerts")
  }

  /// `GET /api/alerts/{id}`
  pub async fn get_alert(&self, id: AlertId) -> Result<Alert> {
    let resp = self
      .auth(self.client.get(self.url(&format!("/alerts/{id}"))))
      .send()
      .await
      .context("GET /alerts/{id} failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /alerts/{id} → {}", resp.status()));
    }
    resp.json().await.context("deserialising alert")
  }

  /// `POST /api/alerts/{id}/resolve`
  pub async fn resolve_alert(&self, id: AlertId) -> Result<Alert> {
    let resp = self
      .auth(self.client.post(self.url(&format!("/alerts/{id}/resolve"))))
      .send()
      .await
      .context("POST /alerts/{id}/resolve failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("POST /alerts/{id}/resolve → {}", resp.status()));
    }
    resp.json().await.context("deserialising alert")
  }

  /// `DELETE /api/alerts/{id}`
  pub async fn delete_alert(&self, id: AlertId) -> Result<()> {
    let resp = self
      .auth(self.client.delete(self.url(&format!("/alerts/{id}"))))
      .send()
      .await
      .context("DELETE /alerts/{id} failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("DELETE /alerts/{id} → {}", resp.status()));
    }
    Ok(())
  }
}
