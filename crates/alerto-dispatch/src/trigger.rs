//! Trigger values and the listener loop that turns them into dispatches.

use std::sync::Arc;

use alerto_core::dispatch::{
  LocationProvider, NotificationSink, ReportTransport,
};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::dispatcher::Dispatcher;

// ─── Trigger ─────────────────────────────────────────────────────────────────

/// Where a trigger came from. Carried for logging only; the dispatch path
/// treats all triggers identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
  /// Explicit user action.
  Manual,
  /// Fired by the trip monitor after a stall countdown ran out.
  Stall,
}

impl std::fmt::Display for TriggerSource {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Manual => f.write_str("manual"),
      Self::Stall => f.write_str("stall"),
    }
  }
}

/// One activation event. Stateless; triggers are never deduplicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
  pub source: TriggerSource,
}

impl Trigger {
  pub fn manual() -> Self {
    Self { source: TriggerSource::Manual }
  }

  pub fn stall() -> Self {
    Self { source: TriggerSource::Stall }
  }
}

// ─── Listener loop ───────────────────────────────────────────────────────────

/// Spawn the listener that drains `triggers` and starts one independent
/// dispatch task per received trigger.
///
/// The listener never waits on a dispatch in flight, so a slow send cannot
/// delay later triggers. It exits when every sender has been dropped.
pub fn spawn_trigger_loop<L, T, N>(
  dispatcher: Arc<Dispatcher<L, T, N>>,
  mut triggers: mpsc::UnboundedReceiver<Trigger>,
) -> JoinHandle<()>
where
  L: LocationProvider + 'static,
  T: ReportTransport + 'static,
  N: NotificationSink + 'static,
{
  tokio::spawn(async move {
    while let Some(trigger) = triggers.recv().await {
      let dispatcher = Arc::clone(&dispatcher);
      tokio::spawn(async move {
        dispatcher.dispatch(trigger).await;
      });
    }
    tracing::debug!("trigger channel closed, listener exiting");
  })
}
