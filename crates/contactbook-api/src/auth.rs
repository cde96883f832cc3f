//! Token-auth extractor.
//!
//! Clients send `Authorization: Token <key>`. The scheme is matched
//! case-insensitively; anything else is rejected with 401 before the handler
//! body runs.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use contactbook_core::{store::ContactBookStore, user::User};

use crate::{AppState, error::ApiError};

/// The authenticated caller. Taking this as a handler argument is what gates
/// the route.
pub struct AuthUser(pub User);

/// Pull the token key out of the `Authorization` header, if well-formed.
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
  let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
  let mut parts = value.split_whitespace();
  let scheme = parts.next()?;
  let key = parts.next()?;
  if !scheme.eq_ignore_ascii_case("token") || parts.next().is_some() {
    return None;
  }
  Some(key)
}

impl<S> FromRequestParts<AppState<S>> for AuthUser
where
  S: ContactBookStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let Some(key) = token_from_headers(&parts.headers) else {
      tracing::debug!("missing or malformed authorization header");
      return Err(ApiError::Unauthorized);
    };

    let user = state
      .store
      .user_for_token(key.to_owned())
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?
      .ok_or_else(|| {
        tracing::debug!("unknown token");
        ApiError::Unauthorized
      })?;

    Ok(AuthUser(user))
  }
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  fn headers(value: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    h
  }

  #[test]
  fn token_scheme_accepted() {
    assert_eq!(token_from_headers(&headers("Token abc123")), Some("abc123"));
    assert_eq!(token_from_headers(&headers("token abc123")), Some("abc123"));
  }

  #[test]
  fn other_shapes_rejected() {
    assert_eq!(token_from_headers(&HeaderMap::new()), None);
    assert_eq!(token_from_headers(&headers("Token")), None);
    assert_eq!(token_from_headers(&headers("Bearer abc123")), None);
    assert_eq!(token_from_headers(&headers("Token abc 123")), None);
  }
}
