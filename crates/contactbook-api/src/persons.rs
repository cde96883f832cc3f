//! Handlers for `/persons` endpoints.
//!
//! Persons are created with their contact, so there is no `POST` or
//! `DELETE` here.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/personss` | Also served at `/persons` |
//! | `GET`  | `/persons/:id` | 404 if not found |
//! | `PUT`  | `/persons/:id` | Full replace; body: [`PersonFields`] |

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
};
use contactbook_core::{
  person::{Person, PersonFields, PersonId},
  store::ContactBookStore,
};
use validator::Validate;

use crate::{AppState, auth::AuthUser, error::ApiError};

/// `GET /personss`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: ContactBookStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let persons = state
    .store
    .list_persons(user.id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(persons))
}

/// `GET /persons/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  Path(id): Path<PersonId>,
) -> Result<Json<Person>, ApiError>
where
  S: ContactBookStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let person = state
    .store
    .get_person(user.id, id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;
  Ok(Json(person))
}

/// `PUT /persons/:id`
pub async fn replace<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  Path(id): Path<PersonId>,
  body: Result<Json<PersonFields>, JsonRejection>,
) -> Result<Json<Person>, ApiError>
where
  S: ContactBookStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Json(body) = body?;
  let fields = body.normalized();
  fields.validate()?;
  let person = state
    .store
    .replace_person(user.id, id, fields)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;
  Ok(Json(person))
}
