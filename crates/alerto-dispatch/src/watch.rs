//! Trip monitoring: poll the position and fire an automatic SOS when the
//! wearer stops moving.
//!
//! Detection lives in [`StallTracker`], a pure state machine fed explicit
//! instants so it can be tested without a clock. [`TripWatch`] is the async
//! loop around it: poll, feed, announce, and push a stall trigger into the
//! same channel the manual path uses.

use std::{
  path::PathBuf,
  time::{Duration, Instant},
};

use alerto_core::{
  dispatch::{LocationProvider, NotificationSink},
  position::Position,
};
use tokio::sync::mpsc;

use crate::{location::write_fix, trigger::Trigger};

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct WatchConfig {
  /// How often the provider is polled while tracking.
  pub poll_interval:        Duration,
  /// How long the position may stay inside the movement threshold before a
  /// stall is declared.
  pub stall_after:          Duration,
  /// Grace period between stall detection and the automatic SOS.
  pub countdown:            Duration,
  /// Displacement below this many meters does not count as movement.
  pub movement_threshold_m: f64,
}

impl Default for WatchConfig {
  fn default() -> Self {
    Self {
      poll_interval:        Duration::from_secs(10),
      stall_after:          Duration::from_secs(60),
      countdown:            Duration::from_secs(5),
      movement_threshold_m: 10.0,
    }
  }
}

// ─── Stall tracker ───────────────────────────────────────────────────────────

/// What one observation made the tracker do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEvent {
  /// The stall window elapsed without movement; the countdown has started.
  StallDetected,
  /// Movement resumed during the countdown; the pending SOS is cancelled.
  CountdownAborted,
  /// The countdown ran out; an SOS is due now.
  SosDue,
}

#[derive(Debug, Clone, Copy)]
struct Anchor {
  position: Position,
  /// When the wearer was last seen moving (or first seen at all).
  since:    Instant,
}

/// Pure stall-detection state machine.
///
/// Movement is measured against an anchor that only advances when the
/// displacement from it crosses the threshold, so slow drift accumulates
/// instead of being swallowed sample by sample.
#[derive(Debug)]
pub struct StallTracker {
  stall_after: Duration,
  countdown:   Duration,
  threshold_m: f64,
  anchor:      Option<Anchor>,
  fire_at:     Option<Instant>,
}

impl StallTracker {
  pub fn new(config: &WatchConfig) -> Self {
    Self {
      stall_after: config.stall_after,
      countdown:   config.countdown,
      threshold_m: config.movement_threshold_m,
      anchor:      None,
      fire_at:     None,
    }
  }

  /// Feed one sample. `position` is `None` when the poll produced no fix.
  pub fn observe(
    &mut self,
    now: Instant,
    position: Option<Position>,
  ) -> Option<WatchEvent> {
    if let Some(fire_at) = self.fire_at {
      // A moving fix cancels the pending SOS; otherwise the countdown runs
      // on time alone, so a lost fix cannot pause it.
      if let Some(position) = position
        && self.beyond_threshold(position)
      {
        self.fire_at = None;
        self.anchor = Some(Anchor { position, since: now });
        return Some(WatchEvent::CountdownAborted);
      }
      if now >= fire_at {
        self.fire_at = None;
        if let Some(anchor) = &mut self.anchor {
          anchor.since = now;
        }
        return Some(WatchEvent::SosDue);
      }
      return None;
    }

    let position = position?;
    match self.anchor {
      None => {
        self.anchor = Some(Anchor { position, since: now });
        None
      }
      Some(anchor) if anchor.position.distance_meters(position) >= self.threshold_m => {
        self.anchor = Some(Anchor { position, since: now });
        None
      }
      Some(anchor) => {
        if now.duration_since(anchor.since) >= self.stall_after {
          self.fire_at = Some(now + self.countdown);
          Some(WatchEvent::StallDetected)
        } else {
          None
        }
      }
    }
  }

  pub fn is_counting_down(&self) -> bool {
    self.fire_at.is_some()
  }

  /// Time left before the automatic SOS, when a countdown is running.
  pub fn countdown_remaining(&self, now: Instant) -> Option<Duration> {
    self.fire_at.map(|at| at.saturating_duration_since(now))
  }

  fn beyond_threshold(&self, position: Position) -> bool {
    match self.anchor {
      Some(anchor) => {
        anchor.position.distance_meters(position) >= self.threshold_m
      }
      None => false,
    }
  }
}

// ─── Trip watch loop ─────────────────────────────────────────────────────────

/// The polling loop around a [`StallTracker`].
///
/// Polls every `poll_interval` while tracking and every second during a
/// countdown, announcing the countdown through the sink. When the countdown
/// runs out it sends [`Trigger::stall`] into the trigger channel and keeps
/// watching. The loop ends when the trigger channel closes.
pub struct TripWatch<L, N> {
  provider: L,
  sink:     N,
  triggers: mpsc::UnboundedSender<Trigger>,
  config:   WatchConfig,
  fix_path: Option<PathBuf>,
}

impl<L, N> TripWatch<L, N>
where
  L: LocationProvider,
  N: NotificationSink,
{
  pub fn new(
    provider: L,
    sink: N,
    triggers: mpsc::UnboundedSender<Trigger>,
    config: WatchConfig,
  ) -> Self {
    Self { provider, sink, triggers, config, fix_path: None }
  }

  /// Re-stamp every observed position into the fix cache at `path`, so a
  /// later manual dispatch has a last known position to use.
  ///
  /// Leave unset when the provider already reads that same cache; writing
  /// it back would only refresh the timestamp of a possibly stale fix.
  pub fn with_fix_cache(mut self, path: impl Into<PathBuf>) -> Self {
    self.fix_path = Some(path.into());
    self
  }

  pub async fn run(self) {
    let mut tracker = StallTracker::new(&self.config);

    loop {
      let period = if tracker.is_counting_down() {
        Duration::from_secs(1)
      } else {
        self.config.poll_interval
      };
      tokio::time::sleep(period).await;

      let position = match self.provider.last_known().await {
        Ok(position) => position,
        Err(error) => {
          tracing::warn!(%error, "position poll failed");
          None
        }
      };

      if let (Some(position), Some(path)) = (position, &self.fix_path)
        && let Err(error) = write_fix(path, position).await
      {
        tracing::warn!(%error, "failed to update fix cache");
      }

      match tracker.observe(Instant::now(), position) {
        Some(WatchEvent::StallDetected) => {
          tracing::warn!("no movement inside stall window");
          self.sink.show("No movement detected");
        }
        Some(WatchEvent::CountdownAborted) => {
          tracing::info!("movement resumed during countdown");
          self.sink.show("Movement resumed, SOS cancelled");
        }
        Some(WatchEvent::SosDue) => {
          if self.triggers.send(Trigger::stall()).is_err() {
            tracing::debug!("trigger channel closed, watch exiting");
            return;
          }
        }
        None => {}
      }

      if let Some(remaining) = tracker.countdown_remaining(Instant::now()) {
        let seconds = remaining.as_secs_f64().ceil() as u64;
        self.sink.show(&format!("Sending SOS in {seconds}s"));
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn config() -> WatchConfig {
    WatchConfig {
      poll_interval:        Duration::from_secs(10),
      stall_after:          Duration::from_secs(60),
      countdown:            Duration::from_secs(5),
      movement_threshold_m: 10.0,
    }
  }

  fn pos(lat: f64) -> Position {
    Position::new(lat, 77.5946).unwrap()
  }

  // 0.0002 degrees of latitude is roughly 22 m, 0.00005 roughly 5.5 m.
  const BIG_STEP: f64 = 0.0002;
  const SMALL_STEP: f64 = 0.00005;

  #[test]
  fn first_fix_only_anchors() {
    let mut tracker = StallTracker::new(&config());
    let t0 = Instant::now();
    assert_eq!(tracker.observe(t0, Some(pos(12.9716))), None);
    assert!(!tracker.is_counting_down());
  }

  #[test]
  fn stall_detected_after_window_without_movement() {
    let mut tracker = StallTracker::new(&config());
    let t0 = Instant::now();

    assert_eq!(tracker.observe(t0, Some(pos(12.9716))), None);
    assert_eq!(
      tracker.observe(t0 + Duration::from_secs(30), Some(pos(12.9716 + SMALL_STEP))),
      None
    );
    assert_eq!(
      tracker.observe(t0 + Duration::from_secs(61), Some(pos(12.9716))),
      Some(WatchEvent::StallDetected)
    );
    assert!(tracker.is_counting_down());
  }

  #[test]
  fn movement_resets_the_stall_window() {
    let mut tracker = StallTracker::new(&config());
    let t0 = Instant::now();

    assert_eq!(tracker.observe(t0, Some(pos(12.9716))), None);
    // Real movement at t+50 restarts the window.
    assert_eq!(
      tracker.observe(t0 + Duration::from_secs(50), Some(pos(12.9716 + BIG_STEP))),
      None
    );
    // t+70 is only 20 s after the movement, so no stall yet.
    assert_eq!(
      tracker.observe(t0 + Duration::from_secs(70), Some(pos(12.9716 + BIG_STEP))),
      None
    );
    assert!(!tracker.is_counting_down());
    // t+111 is 61 s after the movement.
    assert_eq!(
      tracker.observe(t0 + Duration::from_secs(111), Some(pos(12.9716 + BIG_STEP))),
      Some(WatchEvent::StallDetected)
    );
  }

  #[test]
  fn slow_drift_accumulates_against_the_anchor() {
    let mut tracker = StallTracker::new(&config());
    let t0 = Instant::now();

    assert_eq!(tracker.observe(t0, Some(pos(12.9716))), None);
    // Two sub-threshold steps add up to ~11 m from the anchor.
    assert_eq!(
      tracker.observe(t0 + Duration::from_secs(20), Some(pos(12.9716 + SMALL_STEP))),
      None
    );
    assert_eq!(
      tracker.observe(t0 + Duration::from_secs(40), Some(pos(12.9716 + 2.0 * SMALL_STEP))),
      None
    );
    // The anchor advanced at t+40, so t+61 is not a stall.
    assert_eq!(
      tracker.observe(t0 + Duration::from_secs(61), Some(pos(12.9716 + 2.0 * SMALL_STEP))),
      None
    );
    assert!(!tracker.is_counting_down());
  }

  #[test]
  fn countdown_aborts_on_movement() {
    let mut tracker = StallTracker::new(&config());
    let t0 = Instant::now();

    tracker.observe(t0, Some(pos(12.9716)));
    assert_eq!(
      tracker.observe(t0 + Duration::from_secs(61), Some(pos(12.9716))),
      Some(WatchEvent::StallDetected)
    );
    assert_eq!(
      tracker.observe(t0 + Duration::from_secs(63), Some(pos(12.9716 + BIG_STEP))),
      Some(WatchEvent::CountdownAborted)
    );
    assert!(!tracker.is_counting_down());
  }

  #[test]
  fn countdown_expiry_fires_and_rearms() {
    let mut tracker = StallTracker::new(&config());
    let t0 = Instant::now();

    tracker.observe(t0, Some(pos(12.9716)));
    assert_eq!(
      tracker.observe(t0 + Duration::from_secs(61), Some(pos(12.9716))),
      Some(WatchEvent::StallDetected)
    );
    assert_eq!(
      tracker.observe(t0 + Duration::from_secs(67), Some(pos(12.9716))),
      Some(WatchEvent::SosDue)
    );
    assert!(!tracker.is_counting_down());

    // Still no movement: a second stall is declared a full window later.
    assert_eq!(
      tracker.observe(t0 + Duration::from_secs(100), Some(pos(12.9716))),
      None
    );
    assert_eq!(
      tracker.observe(t0 + Duration::from_secs(128), Some(pos(12.9716))),
      Some(WatchEvent::StallDetected)
    );
  }

  #[test]
  fn lost_fix_does_not_pause_the_countdown() {
    let mut tracker = StallTracker::new(&config());
    let t0 = Instant::now();

    tracker.observe(t0, Some(pos(12.9716)));
    assert_eq!(
      tracker.observe(t0 + Duration::from_secs(61), Some(pos(12.9716))),
      Some(WatchEvent::StallDetected)
    );
    assert_eq!(tracker.observe(t0 + Duration::from_secs(63), None), None);
    assert_eq!(
      tracker.observe(t0 + Duration::from_secs(67), None),
      Some(WatchEvent::SosDue)
    );
  }

  #[test]
  fn missing_fixes_while_tracking_are_ignored() {
    let mut tracker = StallTracker::new(&config());
    let t0 = Instant::now();

    assert_eq!(tracker.observe(t0, None), None);
    assert_eq!(tracker.observe(t0 + Duration::from_secs(61), None), None);
    assert!(!tracker.is_counting_down());
  }

  #[test]
  fn countdown_remaining_reports_time_left() {
    let mut tracker = StallTracker::new(&config());
    let t0 = Instant::now();

    tracker.observe(t0, Some(pos(12.9716)));
    tracker.observe(t0 + Duration::from_secs(61), Some(pos(12.9716)));

    let remaining = tracker
      .countdown_remaining(t0 + Duration::from_secs(62))
      .unwrap();
    assert_eq!(remaining, Duration::from_secs(4));
  }
}
