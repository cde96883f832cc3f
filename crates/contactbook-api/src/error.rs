//! API error type and [`axum::response::IntoResponse`] implementation.

use std::collections::BTreeMap;

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use contactbook_core::validation::field_messages;
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Missing, malformed or unknown token. Carries nothing about the
  /// requested resource.
  #[error("unauthorized")]
  Unauthorized,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("validation failed: {0}")]
  Validation(#[from] ValidationErrors),

  /// The body was not JSON, or did not fit the expected shape.
  #[error("invalid body: {0}")]
  Body(#[from] JsonRejection),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::Unauthorized => {
        let mut res = (
          StatusCode::UNAUTHORIZED,
          Json(json!({ "error": "authentication credentials were not provided or are invalid" })),
        )
          .into_response();
        res
          .headers_mut()
          .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Token"));
        res
      }
      ApiError::NotFound(m) => {
        (StatusCode::NOT_FOUND, Json(json!({ "error": m }))).into_response()
      }
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": m }))).into_response()
      }
      ApiError::Validation(errors) => (
        StatusCode::BAD_REQUEST,
        Json(json!({
          "error":  "validation failed",
          "fields": field_messages(&errors),
        })),
      )
        .into_response(),
      ApiError::Body(rejection) => {
        let status = match rejection {
          JsonRejection::JsonDataError(_) => StatusCode::BAD_REQUEST,
          ref other => other.status(),
        };
        (
          status,
          Json(json!({
            "error":  "invalid request body",
            "fields": body_field_errors(&rejection.body_text()),
          })),
        )
          .into_response()
      }
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() })))
          .into_response()
      }
    }
  }
}

const DATA_ERROR_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

/// Map a JSON rejection message onto the field it names, in the same
/// `{field: [messages]}` shape validation errors use.
fn body_field_errors(text: &str) -> BTreeMap<String, Vec<String>> {
  let detail = text.strip_prefix(DATA_ERROR_PREFIX).unwrap_or(text);
  let detail = detail.rsplit_once(" at line ").map_or(detail, |(head, _)| head);

  let (field, message) = if let Some(rest) = detail.strip_prefix("missing field `")
    && let Some((name, _)) = rest.split_once('`')
  {
    (name, "This field is required.")
  } else if let Some((path, message)) = detail.split_once(": ")
    && !path.contains(' ')
  {
    (path, message)
  } else {
    ("non_field_errors", detail)
  };

  BTreeMap::from([(field.to_owned(), vec![message.to_owned()])])
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_field_is_attributed() {
    let text = format!("{DATA_ERROR_PREFIX}missing field `name` at line 1 column 42");
    assert_eq!(body_field_errors(&text)["name"], ["This field is required."]);
  }

  #[test]
  fn bad_value_is_attributed_to_its_path() {
    let text = format!(
      "{DATA_ERROR_PREFIX}gender: unknown variant `Robot`, expected one of `Male`, `Female`, \
       `Other` at line 1 column 17"
    );
    let fields = body_field_errors(&text);
    assert!(fields["gender"][0].starts_with("unknown variant `Robot`"));
  }

  #[test]
  fn syntax_errors_are_not_field_errors() {
    let fields = body_field_errors("Failed to parse the request body as JSON: EOF while parsing");
    assert!(fields.contains_key("non_field_errors"));
  }
}
