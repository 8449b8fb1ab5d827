//! Notification sinks: how outcome messages reach the user.

use alerto_core::dispatch::NotificationSink;
use tokio::sync::mpsc;

/// Marshals messages to the task that fronts the user.
///
/// Dispatch tasks run anywhere on the runtime; the task that owns the
/// receiver (the CLI main loop) prints messages in arrival order. This is
/// the only synchronization point between a dispatch and the rest of the
/// process.
#[derive(Clone)]
pub struct ChannelSink {
  tx: mpsc::UnboundedSender<String>,
}

impl ChannelSink {
  /// Create a sink and the receiver its messages arrive on.
  pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Self { tx }, rx)
  }
}

impl NotificationSink for ChannelSink {
  fn show(&self, message: &str) {
    // A closed receiver means the user-facing side is gone; the message has
    // nowhere useful to go.
    if self.tx.send(message.to_owned()).is_err() {
      tracing::debug!(message, "notification dropped, receiver closed");
    }
  }
}
