//! Error types for `alerto-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("latitude {0} out of range [-90, 90]")]
  LatitudeOutOfRange(f64),

  #[error("longitude {0} out of range [-180, 180]")]
  LongitudeOutOfRange(f64),

  #[error("invalid contact number {0:?}: expected '+' followed by 10-15 digits")]
  InvalidContact(String),

  #[error("contact {0} is already in the roster")]
  DuplicateContact(String),

  #[error("contact {0} is not in the roster")]
  UnknownContact(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
