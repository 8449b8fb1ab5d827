//! `alerto` — SOS dispatch client and alert dashboard.
//!
//! # Usage
//!
//! ```
//! alerto send
//! alerto watch
//! alerto contacts add +919876543210
//! alerto alerts list --status Active
//! alerto --config ~/.config/alerto/config.toml dash
//! ```

mod app;
mod client;
mod commands;
mod config;
mod ui;

use std::{io, time::Duration};

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, Subcommand};
use client::ApiClient;
use config::Settings;
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "alerto", about = "SOS dispatch client and alert dashboard")]
pub struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE", global = true)]
  pub config: Option<std::path::PathBuf>,

  /// Base URL of the alerto server (default: http://localhost:5000).
  #[arg(long, env = "ALERTO_URL", global = true)]
  pub url: Option<String>,

  /// Admin API username.
  #[arg(long, env = "ALERTO_USER", global = true)]
  pub user: Option<String>,

  /// Admin API password (plaintext).
  #[arg(long, env = "ALERTO_PASSWORD", global = true)]
  pub password: Option<String>,

  /// SOS ingest endpoint (default: `<url>/api/trigger-sos`).
  #[arg(long, env = "ALERTO_ENDPOINT", global = true)]
  pub endpoint: Option<String>,

  /// Name carried in outgoing SOS reports.
  #[arg(long, global = true)]
  pub name: Option<String>,

  /// Emergency contact number for outgoing reports (overrides the roster).
  #[arg(long, global = true)]
  pub contact: Option<String>,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Send one SOS right now.
  Send,

  /// Watch for stalls and send an automatic SOS when movement stops.
  Watch,

  /// Manage the local emergency-contact roster.
  Contacts {
    #[command(subcommand)]
    action: ContactsAction,
  },

  /// Query and manage stored alerts on the server.
  Alerts {
    #[command(subcommand)]
    action: AlertsAction,
  },

  /// Live dashboard over the stored alerts.
  Dash,
}

#[derive(Subcommand, Debug)]
pub enum ContactsAction {
  /// Add a number in `+<10-15 digits>` form.
  Add { number: String },
  /// Remove a number from the roster.
  Remove { number: String },
  /// List the roster; the first entry is the preferred contact.
  List,
}

#[derive(Subcommand, Debug)]
pub enum AlertsAction {
  /// List alerts, newest first.
  List {
    /// Filter by status (`Active` or `Resolved`).
    #[arg(long)]
    status:  Option<String>,
    /// Filter by contact number.
    #[arg(long)]
    contact: Option<String>,
  },
  /// Show one alert in full.
  Show { id: i64 },
  /// Mark an alert resolved.
  Resolve { id: i64 },
  /// Delete an alert.
  Delete { id: i64 },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  // The dashboard owns the terminal; log only for line-oriented commands.
  if !matches!(args.command, Command::Dash) {
    tracing_subscriber::fmt()
      .with_env_filter(
        EnvFilter::builder()
          .with_default_directive(LevelFilter::WARN.into())
          .from_env_lossy(),
      )
      .with_writer(io::stderr)
      .init();
  }

  let settings = Settings::resolve(&args)?;

  match &args.command {
    Command::Send => commands::send(&settings).await,
    Command::Watch => commands::watch(&settings).await,
    Command::Contacts { action } => commands::contacts(&settings, action),
    Command::Alerts { action } => {
      let client = ApiClient::new(settings.api.clone())?;
      commands::alerts(&client, action).await
    }
    Command::Dash => run_dash(&settings).await,
  }
}

// ─── Dashboard ────────────────────────────────────────────────────────────────

async fn run_dash(settings: &Settings) -> Result<()> {
  let client = ApiClient::new(settings.api.clone())?;
  let mut app = App::new(client);

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Load initial data.
  let load_result = app.reload().await;

  // Run the event loop; restore terminal even on error.
  let run_result = if load_result.is_ok() {
    run_event_loop(&mut terminal, &mut app).await
  } else {
    load_result
  };

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    app.maybe_refresh().await;

    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(evt) = maybe_event {
      match evt {
        Event::Key(key) => {
          let cont = app.handle_key(key).await?;
          if !cont {
            break;
          }
        }
        Event::Resize(_, _) => {
          // Terminal will redraw on next iteration.
        }
        _ => {}
      }
    }
  }

  Ok(())
}
