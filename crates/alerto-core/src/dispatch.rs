//! Collaborator traits and the outcome model of one dispatch.
//!
//! The dispatcher (in `alerto-dispatch`) is generic over these three traits.
//! Implementations live in higher crates; tests substitute scripted mocks.
//!
//! All async methods return `Send` futures so implementations can be driven
//! from spawned tokio tasks.

use std::future::Future;

use crate::{position::Position, report::SosReport};

// ─── Collaborators ───────────────────────────────────────────────────────────

/// The platform location collaborator.
///
/// `last_known` resolves to `Ok(None)` when no position is cached — that is
/// an expected state, not an error. `Err` is reserved for lookup failures
/// (unreadable cache, backend fault).
pub trait LocationProvider: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn last_known(
    &self,
  ) -> impl Future<Output = Result<Option<Position>, Self::Error>> + Send + '_;
}

/// The HTTP delivery collaborator.
///
/// `deliver` posts one serialized report and resolves to the response status
/// code; transport-level faults (connect, I/O) surface as `Err`. Interpreting
/// the status code is the dispatcher's job, not the transport's.
pub trait ReportTransport: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn deliver<'a>(
    &'a self,
    report: &'a SosReport,
  ) -> impl Future<Output = Result<u16, Self::Error>> + Send + 'a;
}

/// The user-visible notification channel (the toast of the original).
///
/// Fire-and-forget: `show` must not block and has no failure surface. The
/// implementation is responsible for marshaling the message to whichever
/// task owns the user interface.
pub trait NotificationSink: Send + Sync {
  fn show(&self, message: &str);
}

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// The closed set of ways a dispatch can end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
  /// The endpoint answered 200.
  Sent,
  /// The provider had no cached position; nothing was transmitted.
  LocationUnavailable,
  /// Non-200 status, transport fault, or provider fault.
  Failed,
}

impl DispatchOutcome {
  /// The user-facing message for this outcome.
  pub fn message(&self) -> &'static str {
    match self {
      Self::Sent => "SOS sent!",
      Self::LocationUnavailable => "Location not found",
      Self::Failed => "SOS failed",
    }
  }
}
