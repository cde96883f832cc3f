//! Person profiles derived from contacts.
//!
//! Every contact gets exactly one person, created in the same unit of work as
//! the contact itself. After that the two records are edited independently
//! and may drift apart.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::contact::{Contact, ContactId, Gender};

/// Identifier of a [`Person`], assigned by the store.
pub type PersonId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  pub id:        PersonId,
  /// The contact this person was derived from. Exclusive: no two persons
  /// share a contact.
  pub contact:   ContactId,
  pub gender:    Gender,
  pub name:      String,
  pub firstname: String,
  pub birthday:  Option<NaiveDate>,
  pub nickname:  Option<String>,
}

/// Editable person fields; a `PUT` overwrites all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PersonFields {
  pub gender:    Gender,
  #[validate(length(min = 1, message = "This field may not be blank."))]
  pub name:      String,
  #[validate(length(min = 1, message = "This field may not be blank."))]
  pub firstname: String,
  pub birthday:  Option<NaiveDate>,
  pub nickname:  Option<String>,
}

impl PersonFields {
  /// Trim names so whitespace-only values count as blank.
  pub fn normalized(mut self) -> Self {
    self.name = self.name.trim().to_owned();
    self.firstname = self.firstname.trim().to_owned();
    self
  }
}

/// The fields a freshly created contact hands down to its person.
///
/// Stores call this inside the contact-create transaction.
pub fn derive_person(contact: &Contact) -> PersonFields {
  PersonFields {
    gender:    contact.gender,
    name:      contact.name.clone(),
    firstname: contact.firstname.clone(),
    birthday:  contact.birthday,
    nickname:  None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn derive_copies_shared_fields() {
    let contact = Contact {
      id:        7,
      gender:    Gender::Male,
      name:      "Doe".into(),
      firstname: "John".into(),
      birthday:  NaiveDate::from_ymd_opt(2000, 10, 2),
      phone:     Some("555333444".into()),
      email:     Some("doe@gmail.com".into()),
      user:      1,
      active:    true,
    };

    let fields = derive_person(&contact);
    assert_eq!(fields.gender, Gender::Male);
    assert_eq!(fields.name, "Doe");
    assert_eq!(fields.firstname, "John");
    assert_eq!(fields.birthday, contact.birthday);
    assert_eq!(fields.nickname, None);
  }

  #[test]
  fn nickname_is_optional() {
    let f: PersonFields = serde_json::from_str(
      r#"{"gender":"Female","birthday":"2000-02-03","firstname":"Georgina","name":"Heys"}"#,
    )
    .unwrap();
    assert_eq!(f.nickname, None);
    assert!(f.validate().is_ok());
  }

  #[test]
  fn whitespace_firstname_is_blank() {
    let f = PersonFields {
      gender:    Gender::Other,
      name:      "Heys".into(),
      firstname: "  ".into(),
      birthday:  None,
      nickname:  None,
    }
    .normalized();
    let errors = f.validate().unwrap_err();
    assert!(errors.field_errors().contains_key("firstname"));
  }
}
