//! The dispatcher: one linear locate → build → send → report pipeline.

use alerto_core::{
  contact::EmergencyContact,
  dispatch::{
    DispatchOutcome, LocationProvider, NotificationSink, ReportTransport,
  },
  report::SosReport,
};
use chrono::Utc;

use crate::trigger::Trigger;

/// The configured identity stamped into every outgoing report.
#[derive(Debug, Clone)]
pub struct ReporterIdentity {
  pub name:    String,
  pub contact: EmergencyContact,
}

/// Runs one dispatch per trigger over injected collaborators.
///
/// The dispatcher holds no mutable state; concurrent dispatches share it
/// through an [`Arc`](std::sync::Arc) without locking.
pub struct Dispatcher<L, T, N> {
  identity:  ReporterIdentity,
  location:  L,
  transport: T,
  sink:      N,
}

impl<L, T, N> Dispatcher<L, T, N>
where
  L: LocationProvider,
  T: ReportTransport,
  N: NotificationSink,
{
  pub fn new(
    identity: ReporterIdentity,
    location: L,
    transport: T,
    sink: N,
  ) -> Self {
    Self { identity, location, transport, sink }
  }

  /// Run one dispatch to completion.
  ///
  /// Never returns an error: every failure mode collapses into a
  /// [`DispatchOutcome`], and exactly one sink message is shown per call.
  pub async fn dispatch(&self, trigger: Trigger) -> DispatchOutcome {
    let outcome = self.attempt(trigger).await;
    self.sink.show(outcome.message());
    outcome
  }

  async fn attempt(&self, trigger: Trigger) -> DispatchOutcome {
    tracing::info!(source = %trigger.source, "dispatching SOS");

    let position = match self.location.last_known().await {
      Ok(Some(position)) => position,
      Ok(None) => {
        // No cached fix. The alert is dropped without a transport call.
        tracing::warn!("no last known position, SOS not sent");
        return DispatchOutcome::LocationUnavailable;
      }
      Err(error) => {
        tracing::error!(%error, "position lookup failed");
        return DispatchOutcome::Failed;
      }
    };

    let report = SosReport::new(
      self.identity.name.clone(),
      self.identity.contact.as_str(),
      position,
      Utc::now(),
    );

    match self.transport.deliver(&report).await {
      Ok(200) => {
        tracing::info!(lat = report.lat, lon = report.lon, "SOS delivered");
        DispatchOutcome::Sent
      }
      Ok(status) => {
        tracing::error!(status, "endpoint refused SOS");
        DispatchOutcome::Failed
      }
      Err(error) => {
        tracing::error!(%error, "SOS transmission failed");
        DispatchOutcome::Failed
      }
    }
  }
}
