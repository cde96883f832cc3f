//! Users and the opaque tokens that authenticate them.

use chrono::{DateTime, Utc};
use rand_core::{OsRng, RngCore as _};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Identifier of a [`User`], assigned by the store.
pub type UserId = i64;

/// Number of random bytes behind a token key; hex-encoded to 40 characters.
pub const TOKEN_BYTES: usize = 20;

/// An account that owns contacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:         UserId,
  pub username:   String,
  pub email:      Option<String>,
  pub created_at: DateTime<Utc>,
}

/// The single opaque credential issued to a user.
///
/// Presented by clients as `Authorization: Token <key>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
  pub key:        String,
  pub user:       UserId,
  pub created_at: DateTime<Utc>,
}

/// Generate a fresh token key from OS randomness.
pub fn generate_token_key() -> Result<String> {
  let mut bytes = [0u8; TOKEN_BYTES];
  OsRng
    .try_fill_bytes(&mut bytes)
    .map_err(|e| Error::TokenGeneration(e.to_string()))?;
  Ok(hex::encode(bytes))
}
