//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, dates as day numbers counted
//! from 0001-01-01 (so SQL comparisons order them for any year chrono
//! accepts), genders by their display name.

use chrono::{DateTime, Datelike as _, NaiveDate, Utc};
use contactbook_core::{
  contact::{Contact, Gender},
  person::Person,
  user::{AuthToken, User},
};

use crate::{Error, Result};

/// Column list for `contacts`, in the order [`RawContact::from_row`] reads.
pub const CONTACT_COLUMNS: &str =
  "c.id, c.user_id, c.gender, c.name, c.firstname, c.birthday, c.phone, c.email, c.active";

/// Column list for `persons`, in the order [`RawPerson::from_row`] reads.
pub const PERSON_COLUMNS: &str =
  "p.id, p.contact_id, p.gender, p.name, p.firstname, p.birthday, p.nickname";

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> i32 { d.num_days_from_ce() }

pub fn decode_date(days: i32) -> Result<NaiveDate> {
  NaiveDate::from_num_days_from_ce_opt(days)
    .ok_or_else(|| Error::DateParse(format!("day number {days} out of range")))
}

// ─── Gender ──────────────────────────────────────────────────────────────────

pub fn encode_gender(g: Gender) -> &'static str { g.as_str() }

pub fn decode_gender(s: &str) -> Result<Gender> { Ok(s.parse()?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub id:         i64,
  pub username:   String,
  pub email:      Option<String>,
  pub created_at: String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      username:   row.get(1)?,
      email:      row.get(2)?,
      created_at: row.get(3)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:         self.id,
      username:   self.username,
      email:      self.email,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values for a freshly inserted user and its token.
pub struct RawUserWithToken {
  pub user:             RawUser,
  pub key:              String,
  pub token_created_at: String,
}

impl RawUserWithToken {
  pub fn into_pair(self) -> Result<(User, AuthToken)> {
    let user = self.user.into_user()?;
    let token = AuthToken {
      key:        self.key,
      user:       user.id,
      created_at: decode_dt(&self.token_created_at)?,
    };
    Ok((user, token))
  }
}

/// Raw values read directly from a `contacts` row.
pub struct RawContact {
  pub id:        i64,
  pub user_id:   i64,
  pub gender:    String,
  pub name:      String,
  pub firstname: String,
  pub birthday:  Option<i32>,
  pub phone:     Option<String>,
  pub email:     Option<String>,
  pub active:    bool,
}

impl RawContact {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:        row.get(0)?,
      user_id:   row.get(1)?,
      gender:    row.get(2)?,
      name:      row.get(3)?,
      firstname: row.get(4)?,
      birthday:  row.get(5)?,
      phone:     row.get(6)?,
      email:     row.get(7)?,
      active:    row.get(8)?,
    })
  }

  pub fn into_contact(self) -> Result<Contact> {
    Ok(Contact {
      id:        self.id,
      gender:    decode_gender(&self.gender)?,
      name:      self.name,
      firstname: self.firstname,
      birthday:  self.birthday.map(decode_date).transpose()?,
      phone:     self.phone,
      email:     self.email,
      user:      self.user_id,
      active:    self.active,
    })
  }
}

/// Raw values read directly from a `persons` row.
pub struct RawPerson {
  pub id:         i64,
  pub contact_id: i64,
  pub gender:     String,
  pub name:       String,
  pub firstname:  String,
  pub birthday:   Option<i32>,
  pub nickname:   Option<String>,
}

impl RawPerson {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      contact_id: row.get(1)?,
      gender:     row.get(2)?,
      name:       row.get(3)?,
      firstname:  row.get(4)?,
      birthday:   row.get(5)?,
      nickname:   row.get(6)?,
    })
  }

  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      id:        self.id,
      contact:   self.contact_id,
      gender:    decode_gender(&self.gender)?,
      name:      self.name,
      firstname: self.firstname,
      birthday:  self.birthday.map(decode_date).transpose()?,
      nickname:  self.nickname,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

  #[test]
  fn day_numbers_sort_like_the_date() {
    let ordered = [date(-5, 1, 1), date(999, 12, 31), date(2000, 1, 1), date(12345, 1, 1)];
    for pair in ordered.windows(2) {
      assert!(encode_date(pair[0]) < encode_date(pair[1]), "{} < {}", pair[0], pair[1]);
    }
    assert_eq!(encode_date(date(1, 1, 1)), 1);
    for d in ordered {
      assert_eq!(decode_date(encode_date(d)).unwrap(), d);
    }
  }

  #[test]
  fn out_of_range_day_number_is_an_error() {
    assert!(matches!(decode_date(i32::MAX), Err(Error::DateParse(_))));
  }

  #[test]
  fn unknown_gender_is_an_error() {
    assert!(matches!(
      decode_gender("Robot"),
      Err(Error::Core(contactbook_core::Error::UnknownGender(_)))
    ));
  }
}
