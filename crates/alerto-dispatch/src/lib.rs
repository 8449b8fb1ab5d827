//! The SOS dispatch pipeline: trigger listener, dispatcher, HTTP transport,
//! location providers, notification sinks, and the trip monitor.
//!
//! One trigger causes one background dispatch: read the last known position,
//! build a report, POST it, and push the outcome message to the notification
//! sink. Failures never escape the pipeline; they become sink messages.

pub mod dispatcher;
pub mod error;
pub mod location;
pub mod notify;
pub mod transport;
pub mod trigger;
pub mod watch;

pub use dispatcher::{Dispatcher, ReporterIdentity};
pub use error::{Error, Result};
pub use location::{FixFileProvider, PositionFix, StaticProvider, write_fix};
pub use notify::ChannelSink;
pub use transport::HttpTransport;
pub use trigger::{Trigger, TriggerSource, spawn_trigger_loop};
pub use watch::{StallTracker, TripWatch, WatchConfig, WatchEvent};

#[cfg(test)]
mod tests;
