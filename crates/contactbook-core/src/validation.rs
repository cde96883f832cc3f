//! Flattening of [`validator`] errors into per-field message lists.

use std::collections::BTreeMap;

use validator::ValidationErrors;

/// Map each invalid field to its messages, falling back to the error code
/// when a rule carries no message.
pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
  errors
    .field_errors()
    .into_iter()
    .map(|(field, errs)| {
      let messages = errs
        .iter()
        .map(|e| {
          e.message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| e.code.to_string())
        })
        .collect();
      (field.to_string(), messages)
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use validator::{Validate, ValidationError};

  use super::*;
  use crate::contact::{ContactFields, Gender};

  #[test]
  fn messages_grouped_by_field() {
    let fields = ContactFields {
      gender:    Gender::Other,
      name:      String::new(),
      firstname: "Pera".into(),
      birthday:  None,
      phone:     Some("555333".into()),
      email:     None,
      user:      None,
      active:    Some(true),
    };
    let errors = fields.validate().unwrap_err();
    let messages = field_messages(&errors);

    assert_eq!(messages.keys().collect::<Vec<_>>(), ["name", "phone"]);
    assert_eq!(
      messages["phone"],
      ["Phone number must be entered in the format: '+999999999'. Up to 15 digits allowed."]
    );
  }

  #[test]
  fn code_used_without_message() {
    let mut errors = ValidationErrors::new();
    errors.add("user", ValidationError::new("not_owner"));
    assert_eq!(field_messages(&errors)["user"], ["not_owner"]);
  }
}
