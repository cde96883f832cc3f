//! Contact records: the primary, user-owned entries of the contact book.

use std::{fmt, str::FromStr, sync::LazyLock};

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{Error, user::UserId};

/// Identifier of a [`Contact`], assigned by the store.
pub type ContactId = i64;

/// Accepted phone numbers: optional `+`, optional leading `1`, then 9 to 15
/// digits.
pub static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^\+?1?\d{9,15}$").expect("valid phone regex")
});

// ─── Gender ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
  Male,
  Female,
  Other,
}

impl Gender {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Male => "Male",
      Self::Female => "Female",
      Self::Other => "Other",
    }
  }
}

impl fmt::Display for Gender {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Gender {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Male" => Ok(Self::Male),
      "Female" => Ok(Self::Female),
      "Other" => Ok(Self::Other),
      other => Err(Error::UnknownGender(other.to_owned())),
    }
  }
}

// ─── Contact ─────────────────────────────────────────────────────────────────

/// A stored contact. `active == false` marks a soft-deleted record; the row
/// is never removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
  pub id:        ContactId,
  pub gender:    Gender,
  pub name:      String,
  pub firstname: String,
  pub birthday:  Option<NaiveDate>,
  pub phone:     Option<String>,
  pub email:     Option<String>,
  pub user:      UserId,
  pub active:    bool,
}

// ─── ContactFields ───────────────────────────────────────────────────────────

/// The client-editable field set, used for both create and full replace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ContactFields {
  pub gender:    Gender,
  #[validate(length(min = 1, message = "This field may not be blank."))]
  pub name:      String,
  #[validate(length(min = 1, message = "This field may not be blank."))]
  pub firstname: String,
  pub birthday:  Option<NaiveDate>,
  #[validate(
    length(
      max = 17,
      message = "Ensure this field has no more than 17 characters."
    ),
    regex(
      path = *PHONE_RE,
      message = "Phone number must be entered in the format: '+999999999'. Up to 15 digits allowed."
    )
  )]
  pub phone:     Option<String>,
  #[validate(
    length(
      max = 100,
      message = "Ensure this field has no more than 100 characters."
    ),
    email(message = "Enter a valid email address.")
  )]
  pub email:     Option<String>,
  /// Owning user as sent by the client. The API checks it against the
  /// authenticated caller.
  pub user:      Option<UserId>,
  /// Absent means "keep what is there": true on create, the stored value on
  /// replace.
  pub active:    Option<bool>,
}

impl ContactFields {
  /// Trim names and collapse empty optional strings to `None`, as a blank
  /// form field means "not provided".
  pub fn normalized(mut self) -> Self {
    self.name = self.name.trim().to_owned();
    self.firstname = self.firstname.trim().to_owned();
    self.phone = self.phone.filter(|p| !p.is_empty());
    self.email = self.email.filter(|e| !e.is_empty());
    self
  }
}
