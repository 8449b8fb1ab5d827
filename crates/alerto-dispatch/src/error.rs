//! Error type for `alerto-dispatch`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("fix cache i/o error: {0}")]
  Io(#[from] std::io::Error),

  #[error("fix cache decode error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
