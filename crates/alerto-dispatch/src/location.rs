//! Location providers: where the dispatcher gets its last known position.
//!
//! The platform fix source is external to this system. On a workstation the
//! practical sources are a fixed configured position ([`StaticProvider`]) or
//! a small JSON cache file that some companion process keeps fresh
//! ([`FixFileProvider`]).

use std::{
  convert::Infallible,
  io,
  path::{Path, PathBuf},
  time::Duration,
};

use alerto_core::{dispatch::LocationProvider, position::Position};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

// ─── Fix cache format ────────────────────────────────────────────────────────

/// One cached position sample with its capture time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PositionFix {
  #[serde(flatten)]
  pub position:    Position,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub recorded_at: DateTime<Utc>,
}

/// Write `position` to the fix cache at `path`, stamped with the current
/// time. Parent directories are created as needed.
pub async fn write_fix(path: impl AsRef<Path>, position: Position) -> Result<()> {
  let fix = PositionFix { position, recorded_at: Utc::now() };
  let json = serde_json::to_string_pretty(&fix)?;

  if let Some(parent) = path.as_ref().parent()
    && !parent.as_os_str().is_empty()
  {
    tokio::fs::create_dir_all(parent).await?;
  }
  tokio::fs::write(path.as_ref(), json).await?;
  Ok(())
}

// ─── Providers ───────────────────────────────────────────────────────────────

/// Always reports the same position, or none. Configuration-driven.
#[derive(Debug, Clone, Copy)]
pub struct StaticProvider {
  position: Option<Position>,
}

impl StaticProvider {
  pub fn new(position: Option<Position>) -> Self {
    Self { position }
  }
}

impl LocationProvider for StaticProvider {
  type Error = Infallible;

  async fn last_known(&self) -> Result<Option<Position>, Infallible> {
    Ok(self.position)
  }
}

/// Reads the last known position from a JSON fix cache on disk.
///
/// A missing file means no fix has ever been recorded and yields `None`, as
/// does a fix older than `max_age` when one is set. A file that exists but
/// cannot be read or parsed is an error.
#[derive(Debug, Clone)]
pub struct FixFileProvider {
  path:    PathBuf,
  max_age: Option<Duration>,
}

impl FixFileProvider {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into(), max_age: None }
  }

  /// Treat fixes older than `max_age` as absent.
  pub fn with_max_age(mut self, max_age: Duration) -> Self {
    self.max_age = Some(max_age);
    self
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl LocationProvider for FixFileProvider {
  type Error = crate::error::Error;

  async fn last_known(&self) -> Result<Option<Position>> {
    let contents = match tokio::fs::read_to_string(&self.path).await {
      Ok(contents) => contents,
      Err(error) if error.kind() == io::ErrorKind::NotFound => {
        return Ok(None);
      }
      Err(error) => return Err(error.into()),
    };

    let fix: PositionFix = serde_json::from_str(&contents)?;

    if let Some(max_age) = self.max_age {
      // A future-dated fix (clock skew) counts as age zero.
      let age = Utc::now()
        .signed_duration_since(fix.recorded_at)
        .to_std()
        .unwrap_or_default();
      if age > max_age {
        tracing::debug!(path = %self.path.display(), "cached fix is stale");
        return Ok(None);
      }
    }

    Ok(Some(fix.position))
  }
}
