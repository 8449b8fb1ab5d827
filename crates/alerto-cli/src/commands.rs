//! Line-oriented commands: `send`, `watch`, `contacts`, `alerts`.

use std::{path::Path, sync::Arc};

use alerto_core::{
  alert::Alert,
  contact::{ContactBook, EmergencyContact},
};
use alerto_dispatch::{
  ChannelSink, Dispatcher, HttpTransport, ReporterIdentity, Trigger, TripWatch,
  spawn_trigger_loop,
};
use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Local, Utc};
use tokio::sync::mpsc;

use crate::{
  AlertsAction, ContactsAction,
  client::ApiClient,
  config::{LocationChoice, Settings},
};

// ─── send ─────────────────────────────────────────────────────────────────────

/// Send one SOS and print the outcome message.
pub async fn send(settings: &Settings) -> Result<()> {
  let identity = ReporterIdentity {
    name:    settings.require_name()?,
    contact: resolve_contact(settings)?,
  };

  let (sink, mut messages) = ChannelSink::new();
  let dispatcher = Arc::new(Dispatcher::new(
    identity,
    settings.location.provider(),
    HttpTransport::new(&settings.endpoint)?,
    sink,
  ));

  let (tx, rx) = mpsc::unbounded_channel();
  let listener = spawn_trigger_loop(dispatcher, rx);
  tx.send(Trigger::manual())?;
  drop(tx);

  // The channel closes once the dispatch task has finished and dropped the
  // sink, so this drains exactly the messages of the one dispatch.
  while let Some(message) = messages.recv().await {
    println!("{message}");
  }
  listener.await?;
  Ok(())
}

// ─── watch ────────────────────────────────────────────────────────────────────

/// Run the trip monitor until Ctrl-C, printing every notification.
pub async fn watch(settings: &Settings) -> Result<()> {
  let identity = ReporterIdentity {
    name:    settings.require_name()?,
    contact: resolve_contact(settings)?,
  };

  let provider = settings.location.provider();
  let (sink, mut messages) = ChannelSink::new();
  let dispatcher = Arc::new(Dispatcher::new(
    identity,
    provider.clone(),
    HttpTransport::new(&settings.endpoint)?,
    sink.clone(),
  ));

  let (tx, rx) = mpsc::unbounded_channel();
  let listener = spawn_trigger_loop(dispatcher, rx);

  let mut trip = TripWatch::new(provider, sink, tx, settings.watch);
  if let LocationChoice::Static(_) = settings.location {
    // A static source never reads the cache, so re-stamping it is safe and
    // gives later fix-file dispatches a position to use.
    trip = trip.with_fix_cache(&settings.fix_cache);
  }
  let watcher = tokio::spawn(trip.run());

  println!("Watching for stalls. Ctrl-C to stop.");
  loop {
    tokio::select! {
      maybe = messages.recv() => match maybe {
        Some(message) => println!("{message}"),
        None => break,
      },
      _ = tokio::signal::ctrl_c() => break,
    }
  }

  watcher.abort();
  listener.abort();
  Ok(())
}

// ─── contacts ─────────────────────────────────────────────────────────────────

/// Manage the roster file.
pub fn contacts(settings: &Settings, action: &ContactsAction) -> Result<()> {
  let path = &settings.contacts_path;
  match action {
    ContactsAction::Add { number } => {
      let mut book = load_book(path)?;
      book.add(number)?;
      save_book(path, &book)?;
      println!("Added {number}");
    }
    ContactsAction::Remove { number } => {
      let mut book = load_book(path)?;
      book.remove(number)?;
      save_book(path, &book)?;
      println!("Removed {number}");
    }
    ContactsAction::List => {
      let book = load_book(path)?;
      if book.is_empty() {
        println!("No contacts. Add one with `alerto contacts add +<number>`.");
      }
      for (i, contact) in book.contacts.iter().enumerate() {
        if i == 0 {
          println!("{contact} (preferred)");
        } else {
          println!("{contact}");
        }
      }
    }
  }
  Ok(())
}

/// The contact a dispatch should carry: the explicit override, or the
/// roster's preferred entry.
pub fn resolve_contact(settings: &Settings) -> Result<EmergencyContact> {
  if let Some(number) = &settings.contact {
    return Ok(EmergencyContact::parse(number)?);
  }
  let book = load_book(&settings.contacts_path)?;
  book.preferred().cloned().ok_or_else(|| {
    anyhow!("no emergency contact configured; add one with `alerto contacts add`")
  })
}

fn load_book(path: &Path) -> Result<ContactBook> {
  if !path.exists() {
    return Ok(ContactBook::default());
  }
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("reading roster {}", path.display()))?;
  toml::from_str(&raw).context("parsing roster")
}

fn save_book(path: &Path, book: &ContactBook) -> Result<()> {
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("creating {}", parent.display()))?;
  }
  let raw = toml::to_string_pretty(book).context("serialising roster")?;
  std::fs::write(path, raw)
    .with_context(|| format!("writing roster {}", path.display()))
}

// ─── alerts ───────────────────────────────────────────────────────────────────

/// Query and manage stored alerts through the admin API.
pub async fn alerts(client: &ApiClient, action: &AlertsAction) -> Result<()> {
  match action {
    AlertsAction::List { status, contact } => {
      let alerts = client
        .list_alerts(status.as_deref(), contact.as_deref())
        .await?;
      if alerts.is_empty() {
        println!("No alerts.");
        return Ok(());
      }
      println!(
        "{:>5}  {:<8}  {:<20}  {:<19}  CONTACT",
        "ID", "STATUS", "NAME", "WHEN"
      );
      for alert in &alerts {
        println!(
          "{:>5}  {:<8}  {:<20}  {:<19}  {}",
          alert.id,
          alert.status,
          alert.name,
          local_time(alert.timestamp),
          alert.contact,
        );
      }
    }
    AlertsAction::Show { id } => print_alert(&client.get_alert(*id).await?),
    AlertsAction::Resolve { id } => {
      let alert = client.resolve_alert(*id).await?;
      println!("Alert {} resolved.", alert.id);
    }
    AlertsAction::Delete { id } => {
      client.delete_alert(*id).await?;
      println!("Alert {id} deleted.");
    }
  }
  Ok(())
}

fn print_alert(alert: &Alert) {
  println!("id:       {}", alert.id);
  println!("name:     {}", alert.name);
  println!("status:   {}", alert.status);
  println!("time:     {}", local_time(alert.timestamp));
  println!("position: {:.4}, {:.4}", alert.lat, alert.lon);
  println!("contact:  {}", alert.contact);
  println!("map:      {}", alert.maps_url());
}

fn local_time(ts: DateTime<Utc>) -> String {
  ts.with_timezone(&Local)
    .format("%Y-%m-%d %H:%M:%S")
    .to_string()
}
