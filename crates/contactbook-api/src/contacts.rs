//! Handlers for `/contacts` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/contacts` | Optional `?active=true\|false` |
//! | `POST`   | `/contacts` | Body: [`ContactFields`]; returns 201 + stored contact |
//! | `GET`    | `/contacts/:id` | 404 if not found |
//! | `PUT`    | `/contacts/:id` | Full replace; body: [`ContactFields`] |
//! | `DELETE` | `/contacts/:id` | Soft delete; returns 204 |

use axum::{
  Json,
  extract::{Path, Query, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use contactbook_core::{
  contact::{Contact, ContactFields, ContactId},
  store::{ContactBookStore, ContactFilter},
  user::User,
};
use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{AppState, auth::AuthUser, error::ApiError};

/// Run field validation and check that the body does not name another owner.
fn validated(fields: ContactFields, caller: &User) -> Result<ContactFields, ApiError> {
  let fields = fields.normalized();
  let mut errors = fields.validate().err().unwrap_or_else(ValidationErrors::new);

  if fields.user.is_some_and(|u| u != caller.id) {
    errors.add(
      "user",
      ValidationError::new("not_owner")
        .with_message("Contacts can only belong to the authenticated user.".into()),
    );
  }

  if errors.is_empty() { Ok(fields) } else { Err(errors.into()) }
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub active: Option<bool>,
}

/// `GET /contacts[?active=<bool>]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Contact>>, ApiError>
where
  S: ContactBookStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let contacts = state
    .store
    .list_contacts(user.id, ContactFilter { active: params.active })
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(contacts))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /contacts`: stores the contact and its derived person, returns 201
/// with the contact.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  body: Result<Json<ContactFields>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ContactBookStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Json(body) = body?;
  let fields = validated(body, &user)?;
  let (contact, _person) = state
    .store
    .create_contact(user.id, fields)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(contact)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /contacts/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  Path(id): Path<ContactId>,
) -> Result<Json<Contact>, ApiError>
where
  S: ContactBookStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let contact = state
    .store
    .get_contact(user.id, id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("contact {id} not found")))?;
  Ok(Json(contact))
}

// ─── Replace ──────────────────────────────────────────────────────────────────

/// `PUT /contacts/:id`: overwrites every field except `active`, which keeps
/// its stored value when the body leaves it out.
pub async fn replace<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  Path(id): Path<ContactId>,
  body: Result<Json<ContactFields>, JsonRejection>,
) -> Result<Json<Contact>, ApiError>
where
  S: ContactBookStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Json(body) = body?;
  let fields = validated(body, &user)?;
  let contact = state
    .store
    .replace_contact(user.id, id, fields)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("contact {id} not found")))?;
  Ok(Json(contact))
}

// ─── Soft delete ──────────────────────────────────────────────────────────────

/// `DELETE /contacts/:id`: flips `active` to false; the row and its person
/// stay.
pub async fn deactivate<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  Path(id): Path<ContactId>,
) -> Result<StatusCode, ApiError>
where
  S: ContactBookStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  state
    .store
    .deactivate_contact(user.id, id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("contact {id} not found")))?;
  Ok(StatusCode::NO_CONTENT)
}
