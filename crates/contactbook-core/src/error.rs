//! Error types for `contactbook-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown gender: {0:?}")]
  UnknownGender(String),

  #[error("age threshold of {0} years is out of range")]
  ThresholdOutOfRange(u32),

  #[error("failed to generate token key: {0}")]
  TokenGeneration(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
