//! Settings resolution: CLI flags over the config file over defaults.
//!
//! The config file is read only when `--config` is given. The contact roster
//! lives next to the config file when one is given, otherwise under
//! `~/.config/alerto/`.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use alerto_core::{dispatch::LocationProvider, position::Position};
use alerto_dispatch::{FixFileProvider, StaticProvider, WatchConfig};
use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::{Args, client::ApiConfig};

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  name:     String,
  #[serde(default)]
  contact:  String,
  #[serde(default)]
  endpoint: String,
  #[serde(default)]
  url:      String,
  #[serde(default)]
  username: String,
  #[serde(default)]
  password: String,
  #[serde(default)]
  location: LocationSection,
  #[serde(default)]
  watch:    WatchSection,
}

#[derive(Deserialize, Default)]
struct LocationSection {
  /// `fix-file` (the default) or `static`.
  #[serde(default)]
  source:       String,
  lat:          Option<f64>,
  lon:          Option<f64>,
  fix_path:     Option<PathBuf>,
  max_age_secs: Option<u64>,
}

#[derive(Deserialize, Default)]
struct WatchSection {
  poll_interval_secs:   Option<u64>,
  stall_after_secs:     Option<u64>,
  countdown_secs:       Option<u64>,
  movement_threshold_m: Option<f64>,
}

// ─── Settings ─────────────────────────────────────────────────────────────────

/// Fully resolved runtime settings.
pub struct Settings {
  /// Where SOS reports are POSTed.
  pub endpoint:      String,
  /// Subject name for outgoing reports; may be empty until `require_name`.
  pub name:          String,
  /// Explicit contact override; the roster's preferred entry otherwise.
  pub contact:       Option<String>,
  /// Admin API connection settings.
  pub api:           ApiConfig,
  /// Where dispatches read the last known position from.
  pub location:      LocationChoice,
  /// Trip monitor tuning.
  pub watch:         WatchConfig,
  /// Path of the contact roster TOML.
  pub contacts_path: PathBuf,
  /// Path of the cached-fix file `alerto watch` writes in static mode.
  pub fix_cache:     PathBuf,
}

impl Settings {
  /// Merge CLI flags over the config file over defaults.
  pub fn resolve(args: &Args) -> Result<Self> {
    let file: ConfigFile = if let Some(path) = &args.config {
      let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
      tracing::debug!(path = %path.display(), "loaded config file");
      toml::from_str(&raw).context("parsing config file")?
    } else {
      ConfigFile::default()
    };

    let url = args
      .url
      .clone()
      .or_else(|| (!file.url.is_empty()).then(|| file.url.clone()))
      .unwrap_or_else(|| "http://localhost:5000".to_string());

    let endpoint = args
      .endpoint
      .clone()
      .or_else(|| (!file.endpoint.is_empty()).then(|| file.endpoint.clone()))
      .unwrap_or_else(|| format!("{}/api/trigger-sos", url.trim_end_matches('/')));

    let name = args
      .name
      .clone()
      .or_else(|| (!file.name.is_empty()).then(|| file.name.clone()))
      .unwrap_or_default();

    let contact = args
      .contact
      .clone()
      .or_else(|| (!file.contact.is_empty()).then(|| file.contact.clone()));

    let api = ApiConfig {
      base_url: url,
      username: args
        .user
        .clone()
        .or_else(|| (!file.username.is_empty()).then(|| file.username.clone()))
        .unwrap_or_default(),
      password: args
        .password
        .clone()
        .or_else(|| (!file.password.is_empty()).then(|| file.password.clone()))
        .unwrap_or_default(),
    };

    let fix_cache = file
      .location
      .fix_path
      .as_deref()
      .map(expand_tilde)
      .unwrap_or_else(default_fix_path);

    let location = match file.location.source.as_str() {
      "static" => {
        let (Some(lat), Some(lon)) = (file.location.lat, file.location.lon) else {
          bail!("location source \"static\" needs both `lat` and `lon`");
        };
        LocationChoice::Static(Position::new(lat, lon)?)
      }
      "" | "fix-file" => LocationChoice::FixFile {
        path:    fix_cache.clone(),
        max_age: file.location.max_age_secs.map(Duration::from_secs),
      },
      other => {
        bail!("unknown location source {other:?} (expected \"static\" or \"fix-file\")")
      }
    };

    let mut watch = WatchConfig::default();
    if let Some(secs) = file.watch.poll_interval_secs {
      watch.poll_interval = Duration::from_secs(secs);
    }
    if let Some(secs) = file.watch.stall_after_secs {
      watch.stall_after = Duration::from_secs(secs);
    }
    if let Some(secs) = file.watch.countdown_secs {
      watch.countdown = Duration::from_secs(secs);
    }
    if let Some(m) = file.watch.movement_threshold_m {
      watch.movement_threshold_m = m;
    }

    let contacts_path = match &args.config {
      Some(path) => path
        .parent()
        .unwrap_or(Path::new("."))
        .join("contacts.toml"),
      None => expand_tilde(Path::new("~/.config/alerto/contacts.toml")),
    };

    Ok(Self {
      endpoint,
      name,
      contact,
      api,
      location,
      watch,
      contacts_path,
      fix_cache,
    })
  }

  /// The subject name for outgoing reports. Refuses to send anonymously.
  pub fn require_name(&self) -> Result<String> {
    if self.name.is_empty() {
      bail!("no name configured; set `name` in the config file or pass --name");
    }
    Ok(self.name.clone())
  }
}

// ─── Location choice ──────────────────────────────────────────────────────────

/// Where the last known position comes from.
#[derive(Debug, Clone)]
pub enum LocationChoice {
  /// A fixed position from the config file.
  Static(Position),
  /// The cached fix file written by `alerto watch` or an external feeder.
  FixFile {
    path:    PathBuf,
    max_age: Option<Duration>,
  },
}

impl LocationChoice {
  pub fn provider(&self) -> CliProvider {
    match self {
      Self::Static(position) => {
        CliProvider::Static(StaticProvider::new(Some(*position)))
      }
      Self::FixFile { path, max_age } => {
        let mut provider = FixFileProvider::new(path);
        if let Some(age) = max_age {
          provider = provider.with_max_age(*age);
        }
        CliProvider::FixFile(provider)
      }
    }
  }
}

/// The runtime-selected provider behind the dispatch traits.
#[derive(Clone)]
pub enum CliProvider {
  Static(StaticProvider),
  FixFile(FixFileProvider),
}

impl LocationProvider for CliProvider {
  type Error = alerto_dispatch::Error;

  async fn last_known(&self) -> Result<Option<Position>, Self::Error> {
    match self {
      Self::Static(provider) => match provider.last_known().await {
        Ok(position) => Ok(position),
        Err(e) => match e {},
      },
      Self::FixFile(provider) => provider.last_known().await,
    }
  }
}

// ─── Path helpers ─────────────────────────────────────────────────────────────

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

fn default_fix_path() -> PathBuf {
  expand_tilde(Path::new("~/.local/share/alerto/fix.json"))
}
