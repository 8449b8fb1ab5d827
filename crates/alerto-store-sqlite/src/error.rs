//! Error type for `alerto-store-sqlite`.

use alerto_core::alert::AlertId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("stored timestamp out of range: {0}")]
  TimestampOutOfRange(i64),

  #[error("unknown alert status: {0:?}")]
  StatusDecode(String),

  #[error("alert not found: {0}")]
  AlertNotFound(AlertId),

  #[error("alert {0} is already resolved")]
  AlreadyResolved(AlertId),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
