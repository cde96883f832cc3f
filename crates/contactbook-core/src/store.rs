//! The `ContactBookStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `contactbook-store-sqlite`). Higher layers (`contactbook-api`,
//! `contactbook-server`) depend on this abstraction, not on any concrete
//! backend.
//!
//! Every read and write is scoped by the owning [`UserId`]: a record that
//! belongs to another user is reported exactly like a missing one.

use std::future::Future;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  contact::{Contact, ContactFields, ContactId},
  person::{Person, PersonFields, PersonId},
  user::{AuthToken, User, UserId},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`ContactBookStore::list_contacts`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ContactFilter {
  /// Restrict to active (`Some(true)`) or soft-deleted (`Some(false)`)
  /// contacts. `None` returns both.
  pub active: Option<bool>,
}

/// Result of [`ContactBookStore::born_before`], serialised with the
/// capitalised keys clients expect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Addresses {
  #[serde(rename = "Contacts")]
  pub contacts: Vec<Contact>,
  #[serde(rename = "Persons")]
  pub persons:  Vec<Person>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a contact-book backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ContactBookStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create a user together with its token, atomically.
  fn create_user(
    &self,
    username: String,
    email: Option<String>,
  ) -> impl Future<Output = Result<(User, AuthToken), Self::Error>> + Send + '_;

  /// Resolve a token key to its user. Returns `None` for unknown keys.
  fn user_for_token(
    &self,
    key: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  // ── Contacts ──────────────────────────────────────────────────────────

  /// Persist a contact and the person derived from it via
  /// [`crate::person::derive_person`]. Both rows are written in one
  /// transaction; neither exists if either insert fails.
  fn create_contact(
    &self,
    owner: UserId,
    fields: ContactFields,
  ) -> impl Future<Output = Result<(Contact, Person), Self::Error>> + Send + '_;

  /// List the owner's contacts in id order.
  fn list_contacts(
    &self,
    owner: UserId,
    filter: ContactFilter,
  ) -> impl Future<Output = Result<Vec<Contact>, Self::Error>> + Send + '_;

  fn get_contact(
    &self,
    owner: UserId,
    id: ContactId,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + '_;

  /// Overwrite every editable field; `active: None` keeps the stored flag.
  /// The person is left untouched.
  fn replace_contact(
    &self,
    owner: UserId,
    id: ContactId,
    fields: ContactFields,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + '_;

  /// Soft delete: set `active = false` and keep the row. The person is left
  /// untouched.
  fn deactivate_contact(
    &self,
    owner: UserId,
    id: ContactId,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + '_;

  // ── Persons ───────────────────────────────────────────────────────────

  /// List persons whose contact belongs to `owner`, in id order.
  fn list_persons(
    &self,
    owner: UserId,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  fn get_person(
    &self,
    owner: UserId,
    id: PersonId,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Overwrite every editable person field. The contact is left untouched.
  fn replace_person(
    &self,
    owner: UserId,
    id: PersonId,
    fields: PersonFields,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  // ── Reads across both tables ──────────────────────────────────────────

  /// The owner's contacts and persons whose birthday is strictly before
  /// `cutoff`. Records without a birthday never match.
  fn born_before(
    &self,
    owner: UserId,
    cutoff: NaiveDate,
  ) -> impl Future<Output = Result<Addresses, Self::Error>> + Send + '_;
}
