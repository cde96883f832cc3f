//! Handler for `GET /addresses`.
//!
//! `?is_older_than=<years>` selects the caller's contacts and persons born
//! more than `years × 365` days ago. Without the parameter the endpoint
//! answers with a short HTML hint instead of an error.

use axum::{
  Json,
  extract::{Query, State},
  response::{Html, IntoResponse, Response},
};
use chrono::Utc;
use contactbook_core::{age::birthday_cutoff, store::ContactBookStore};
use serde::Deserialize;

use crate::{AppState, auth::AuthUser, error::ApiError};

pub const MISSING_PARAM_BODY: &str =
  "<p>Please put the query parameter is_older_than into the url.</p>";

#[derive(Debug, Deserialize, Default)]
pub struct AddressParams {
  /// Kept as text so a bad value surfaces as our own 400, not a query
  /// rejection.
  pub is_older_than: Option<String>,
}

/// `GET /addresses[?is_older_than=<years>]`
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  Query(params): Query<AddressParams>,
) -> Result<Response, ApiError>
where
  S: ContactBookStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Some(raw) = params.is_older_than.filter(|s| !s.is_empty()) else {
    return Ok(Html(MISSING_PARAM_BODY).into_response());
  };

  let years: u32 = raw.trim().parse().map_err(|_| {
    ApiError::BadRequest(format!(
      "is_older_than must be a non-negative integer, got {raw:?}"
    ))
  })?;
  let cutoff = birthday_cutoff(Utc::now().date_naive(), years)
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let addresses = state
    .store
    .born_before(user.id, cutoff)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(addresses).into_response())
}
