//! HTTP delivery of serialized reports.

use std::time::Duration;

use alerto_core::{dispatch::ReportTransport, report::SosReport};

use crate::error::{Error, Result};

/// Delivers reports as a JSON `POST` to one configured endpoint.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based and shared
/// across concurrent dispatches.
#[derive(Clone)]
pub struct HttpTransport {
  client:   reqwest::Client,
  endpoint: String,
}

impl HttpTransport {
  /// Build a transport with a fresh client and a 30 second overall timeout.
  pub fn new(endpoint: impl Into<String>) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self::with_client(client, endpoint))
  }

  /// Build a transport over an existing client.
  pub fn with_client(
    client: reqwest::Client,
    endpoint: impl Into<String>,
  ) -> Self {
    Self { client, endpoint: endpoint.into() }
  }

  pub fn endpoint(&self) -> &str {
    &self.endpoint
  }
}

impl ReportTransport for HttpTransport {
  type Error = Error;

  async fn deliver(&self, report: &SosReport) -> Result<u16> {
    let response = self
      .client
      .post(&self.endpoint)
      .json(report)
      .send()
      .await?;
    Ok(response.status().as_u16())
  }
}
