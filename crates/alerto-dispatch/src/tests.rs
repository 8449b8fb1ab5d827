//! Dispatch pipeline tests against scripted collaborators.

use std::sync::{Arc, Mutex};

use alerto_core::{
  contact::EmergencyContact,
  dispatch::{
    DispatchOutcome, LocationProvider, NotificationSink, ReportTransport,
  },
  position::Position,
  report::SosReport,
};
use chrono::Utc;
use tokio::sync::mpsc;

use crate::{
  dispatcher::{Dispatcher, ReporterIdentity},
  notify::ChannelSink,
  trigger::{Trigger, spawn_trigger_loop},
};

// ─── Scripted collaborators ──────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("scripted failure")]
struct ScriptedError;

#[derive(Clone, Copy)]
enum ProviderScript {
  Fix(f64, f64),
  NoFix,
  Fail,
}

struct ScriptedProvider(ProviderScript);

impl LocationProvider for ScriptedProvider {
  type Error = ScriptedError;

  async fn last_known(&self) -> Result<Option<Position>, ScriptedError> {
    match self.0 {
      ProviderScript::Fix(lat, lon) => {
        Ok(Some(Position::new(lat, lon).unwrap()))
      }
      ProviderScript::NoFix => Ok(None),
      ProviderScript::Fail => Err(ScriptedError),
    }
  }
}

/// Records every delivered body and answers with a fixed result.
#[derive(Clone)]
struct RecordingTransport {
  response: Result<u16, ()>,
  bodies:   Arc<Mutex<Vec<serde_json::Value>>>,
}

impl RecordingTransport {
  fn status(status: u16) -> Self {
    Self { response: Ok(status), bodies: Arc::default() }
  }

  fn failing() -> Self {
    Self { response: Err(()), bodies: Arc::default() }
  }

  fn bodies(&self) -> Vec<serde_json::Value> {
    self.bodies.lock().unwrap().clone()
  }
}

impl ReportTransport for RecordingTransport {
  type Error = ScriptedError;

  async fn deliver(&self, report: &SosReport) -> Result<u16, ScriptedError> {
    let body = serde_json::to_value(report).unwrap();
    self.bodies.lock().unwrap().push(body);
    self.response.map_err(|()| ScriptedError)
  }
}

#[derive(Clone, Default)]
struct CollectingSink(Arc<Mutex<Vec<String>>>);

impl CollectingSink {
  fn messages(&self) -> Vec<String> {
    self.0.lock().unwrap().clone()
  }
}

impl NotificationSink for CollectingSink {
  fn show(&self, message: &str) {
    self.0.lock().unwrap().push(message.to_owned());
  }
}

fn identity() -> ReporterIdentity {
  ReporterIdentity {
    name:    "Asha".into(),
    contact: EmergencyContact::parse("+919876543210").unwrap(),
  }
}

fn dispatcher(
  script: ProviderScript,
  transport: RecordingTransport,
  sink: CollectingSink,
) -> Dispatcher<ScriptedProvider, RecordingTransport, CollectingSink> {
  Dispatcher::new(identity(), ScriptedProvider(script), transport, sink)
}

// ─── Pipeline outcomes ───────────────────────────────────────────────────────

#[tokio::test]
async fn absent_position_sends_nothing() {
  let transport = RecordingTransport::status(200);
  let sink = CollectingSink::default();
  let d = dispatcher(ProviderScript::NoFix, transport.clone(), sink.clone());

  let outcome = d.dispatch(Trigger::manual()).await;

  assert_eq!(outcome, DispatchOutcome::LocationUnavailable);
  assert!(transport.bodies().is_empty());
  assert_eq!(sink.messages(), vec!["Location not found"]);
}

#[tokio::test]
async fn present_position_sends_exactly_six_fields() {
  let transport = RecordingTransport::status(200);
  let sink = CollectingSink::default();
  let d = dispatcher(
    ProviderScript::Fix(12.9716, 77.5946),
    transport.clone(),
    sink.clone(),
  );

  let before = Utc::now().timestamp_millis();
  let outcome = d.dispatch(Trigger::manual()).await;
  let after = Utc::now().timestamp_millis();

  assert_eq!(outcome, DispatchOutcome::Sent);
  assert_eq!(sink.messages(), vec!["SOS sent!"]);

  let bodies = transport.bodies();
  assert_eq!(bodies.len(), 1);
  let body = bodies[0].as_object().unwrap();

  let mut keys: Vec<_> = body.keys().map(String::as_str).collect();
  keys.sort_unstable();
  assert_eq!(
    keys,
    vec!["contact", "lat", "lon", "name", "status", "timestamp"]
  );

  assert_eq!(body["name"], "Asha");
  assert_eq!(body["contact"], "+919876543210");
  assert_eq!(body["status"], "Active");
  assert!((body["lat"].as_f64().unwrap() - 12.9716).abs() < 1e-9);
  assert!((body["lon"].as_f64().unwrap() - 77.5946).abs() < 1e-9);

  let ts = body["timestamp"].as_i64().unwrap();
  assert!(ts >= before && ts <= after);
}

#[tokio::test]
async fn non_200_status_reports_failure() {
  let transport = RecordingTransport::status(500);
  let sink = CollectingSink::default();
  let d = dispatcher(
    ProviderScript::Fix(12.9716, 77.5946),
    transport.clone(),
    sink.clone(),
  );

  let outcome = d.dispatch(Trigger::manual()).await;

  assert_eq!(outcome, DispatchOutcome::Failed);
  assert_eq!(transport.bodies().len(), 1);
  assert_eq!(sink.messages(), vec!["SOS failed"]);
}

#[tokio::test]
async fn created_status_is_not_success() {
  let transport = RecordingTransport::status(201);
  let sink = CollectingSink::default();
  let d = dispatcher(
    ProviderScript::Fix(12.9716, 77.5946),
    transport,
    sink.clone(),
  );

  assert_eq!(d.dispatch(Trigger::manual()).await, DispatchOutcome::Failed);
  assert_eq!(sink.messages(), vec!["SOS failed"]);
}

#[tokio::test]
async fn transport_error_reports_failure() {
  let transport = RecordingTransport::failing();
  let sink = CollectingSink::default();
  let d = dispatcher(
    ProviderScript::Fix(12.9716, 77.5946),
    transport.clone(),
    sink.clone(),
  );

  let outcome = d.dispatch(Trigger::stall()).await;

  assert_eq!(outcome, DispatchOutcome::Failed);
  assert_eq!(transport.bodies().len(), 1);
  assert_eq!(sink.messages(), vec!["SOS failed"]);
}

#[tokio::test]
async fn provider_error_reports_failure_without_sending() {
  let transport = RecordingTransport::status(200);
  let sink = CollectingSink::default();
  let d = dispatcher(ProviderScript::Fail, transport.clone(), sink.clone());

  let outcome = d.dispatch(Trigger::manual()).await;

  assert_eq!(outcome, DispatchOutcome::Failed);
  assert!(transport.bodies().is_empty());
  assert_eq!(sink.messages(), vec!["SOS failed"]);
}

#[tokio::test]
async fn one_message_per_dispatch() {
  let transport = RecordingTransport::status(200);
  let sink = CollectingSink::default();
  let d = dispatcher(
    ProviderScript::Fix(12.9716, 77.5946),
    transport,
    sink.clone(),
  );

  d.dispatch(Trigger::manual()).await;
  d.dispatch(Trigger::manual()).await;

  assert_eq!(sink.messages().len(), 2);
}

// ─── Trigger listener ────────────────────────────────────────────────────────

#[tokio::test]
async fn trigger_loop_dispatches_each_trigger() {
  let (sink, mut messages) = ChannelSink::new();
  let d = Arc::new(Dispatcher::new(
    identity(),
    ScriptedProvider(ProviderScript::Fix(12.9716, 77.5946)),
    RecordingTransport::status(200),
    sink,
  ));

  let (tx, rx) = mpsc::unbounded_channel();
  let handle = spawn_trigger_loop(d, rx);

  tx.send(Trigger::manual()).unwrap();
  tx.send(Trigger::stall()).unwrap();

  assert_eq!(messages.recv().await.unwrap(), "SOS sent!");
  assert_eq!(messages.recv().await.unwrap(), "SOS sent!");

  drop(tx);
  handle.await.unwrap();
}

#[tokio::test]
async fn trigger_loop_exits_when_senders_drop() {
  let (sink, _messages) = ChannelSink::new();
  let d = Arc::new(Dispatcher::new(
    identity(),
    ScriptedProvider(ProviderScript::NoFix),
    RecordingTransport::status(200),
    sink,
  ));

  let (tx, rx) = mpsc::unbounded_channel::<Trigger>();
  let handle = spawn_trigger_loop(d, rx);
  drop(tx);

  handle.await.unwrap();
}

// ─── Fix cache ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn fix_file_roundtrip() {
  let dir = std::env::temp_dir().join(format!(
    "alerto-fix-{}",
    std::process::id()
  ));
  let path = dir.join("fix.json");

  let position = Position::new(12.9716, 77.5946).unwrap();
  crate::location::write_fix(&path, position).await.unwrap();

  let provider = crate::location::FixFileProvider::new(&path);
  let read = provider.last_known().await.unwrap();
  assert_eq!(read, Some(position));

  tokio::fs::remove_dir_all(&dir).await.unwrap();
}

#[tokio::test]
async fn missing_fix_file_is_no_fix() {
  let provider = crate::location::FixFileProvider::new(
    "/nonexistent/alerto-test/fix.json",
  );
  assert_eq!(provider.last_known().await.unwrap(), None);
}

#[tokio::test]
async fn stale_fix_is_no_fix() {
  let dir = std::env::temp_dir().join(format!(
    "alerto-stale-{}",
    std::process::id()
  ));
  tokio::fs::create_dir_all(&dir).await.unwrap();
  let path = dir.join("fix.json");

  let position = Position::new(12.9716, 77.5946).unwrap();
  let two_hours_old = crate::location::PositionFix {
    position,
    recorded_at: Utc::now() - chrono::Duration::hours(2),
  };
  tokio::fs::write(&path, serde_json::to_string(&two_hours_old).unwrap())
    .await
    .unwrap();

  let strict = crate::location::FixFileProvider::new(&path)
    .with_max_age(std::time::Duration::from_secs(3600));
  assert_eq!(strict.last_known().await.unwrap(), None);

  let lenient = crate::location::FixFileProvider::new(&path)
    .with_max_age(std::time::Duration::from_secs(3 * 3600));
  assert_eq!(lenient.last_known().await.unwrap(), Some(position));

  tokio::fs::remove_dir_all(&dir).await.unwrap();
}
