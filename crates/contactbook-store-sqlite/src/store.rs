//! [`SqliteStore`]: the SQLite implementation of [`ContactBookStore`].

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::OptionalExtension as _;

use contactbook_core::{
  contact::{Contact, ContactFields, ContactId},
  person::{Person, PersonFields, PersonId, derive_person},
  store::{Addresses, ContactBookStore, ContactFilter},
  user::{AuthToken, User, UserId, generate_token_key},
};

use crate::{
  Error, Result,
  encode::{
    CONTACT_COLUMNS, PERSON_COLUMNS, RawContact, RawPerson, RawUser,
    RawUserWithToken, encode_date, encode_dt, encode_gender,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A contact book backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch one contact by id within an owner's scope.
  async fn fetch_contact(&self, owner: UserId, id: ContactId) -> Result<Option<Contact>> {
    let raw: Option<RawContact> = self
      .conn
      .call(move |conn| {
        Ok(select_contact(conn, owner, id)?)
      })
      .await?;

    raw.map(RawContact::into_contact).transpose()
  }

  /// Fetch one person by id within an owner's scope.
  async fn fetch_person(&self, owner: UserId, id: PersonId) -> Result<Option<Person>> {
    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(select_person(conn, owner, id)?)
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }
}

// ─── Statement helpers ───────────────────────────────────────────────────────

fn select_contact(
  conn:  &rusqlite::Connection,
  owner: UserId,
  id:    ContactId,
) -> rusqlite::Result<Option<RawContact>> {
  conn
    .query_row(
      &format!("SELECT {CONTACT_COLUMNS} FROM contacts c WHERE c.id = ?1 AND c.user_id = ?2"),
      rusqlite::params![id, owner],
      RawContact::from_row,
    )
    .optional()
}

fn select_person(
  conn:  &rusqlite::Connection,
  owner: UserId,
  id:    PersonId,
) -> rusqlite::Result<Option<RawPerson>> {
  conn
    .query_row(
      &format!(
        "SELECT {PERSON_COLUMNS}
         FROM persons p
         JOIN contacts c ON c.id = p.contact_id
         WHERE p.id = ?1 AND c.user_id = ?2"
      ),
      rusqlite::params![id, owner],
      RawPerson::from_row,
    )
    .optional()
}

fn insert_person(
  conn:       &rusqlite::Connection,
  contact_id: ContactId,
  fields:     &PersonFields,
) -> rusqlite::Result<PersonId> {
  conn.execute(
    "INSERT INTO persons (contact_id, gender, name, firstname, birthday, nickname)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    rusqlite::params![
      contact_id,
      encode_gender(fields.gender),
      fields.name,
      fields.firstname,
      fields.birthday.map(encode_date),
      fields.nickname,
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

// ─── ContactBookStore impl ───────────────────────────────────────────────────

impl ContactBookStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(
    &self,
    username: String,
    email:    Option<String>,
  ) -> Result<(User, AuthToken)> {
    let key    = generate_token_key()?;
    let at_str = encode_dt(Utc::now());
    let name   = username.clone();

    let raw: Option<RawUserWithToken> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let taken = tx
          .query_row(
            "SELECT 1 FROM users WHERE username = ?1",
            rusqlite::params![name],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if taken {
          return Ok(None);
        }

        tx.execute(
          "INSERT INTO users (username, email, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![name, email, at_str],
        )?;
        let user_id = tx.last_insert_rowid();

        tx.execute(
          "INSERT INTO auth_tokens (key, user_id, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![key, user_id, at_str],
        )?;
        tx.commit()?;

        Ok(Some(RawUserWithToken {
          user: RawUser {
            id:         user_id,
            username:   name,
            email,
            created_at: at_str.clone(),
          },
          key,
          token_created_at: at_str,
        }))
      })
      .await?;

    let (user, token) = raw.ok_or(Error::UsernameTaken(username))?.into_pair()?;
    tracing::info!(user = user.id, username = %user.username, "created user");
    Ok((user, token))
  }

  async fn user_for_token(&self, key: String) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT u.id, u.username, u.email, u.created_at
             FROM auth_tokens t
             JOIN users u ON u.id = t.user_id
             WHERE t.key = ?1",
            rusqlite::params![key],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  // ── Contacts ──────────────────────────────────────────────────────────────

  async fn create_contact(
    &self,
    owner:  UserId,
    fields: ContactFields,
  ) -> Result<(Contact, Person)> {
    let (contact, person) = self
      .conn
      .call(move |conn| {
        let active = fields.active.unwrap_or(true);
        let tx = conn.transaction()?;

        tx.execute(
          "INSERT INTO contacts
             (user_id, gender, name, firstname, birthday, phone, email, active)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            owner,
            encode_gender(fields.gender),
            fields.name,
            fields.firstname,
            fields.birthday.map(encode_date),
            fields.phone,
            fields.email,
            active,
          ],
        )?;

        let contact = Contact {
          id:        tx.last_insert_rowid(),
          gender:    fields.gender,
          name:      fields.name,
          firstname: fields.firstname,
          birthday:  fields.birthday,
          phone:     fields.phone,
          email:     fields.email,
          user:      owner,
          active,
        };

        let derived   = derive_person(&contact);
        let person_id = insert_person(&tx, contact.id, &derived)?;
        tx.commit()?;

        let person = Person {
          id:        person_id,
          contact:   contact.id,
          gender:    derived.gender,
          name:      derived.name,
          firstname: derived.firstname,
          birthday:  derived.birthday,
          nickname:  derived.nickname,
        };
        Ok((contact, person))
      })
      .await?;

    tracing::info!(user = owner, contact = contact.id, person = person.id, "created contact");
    Ok((contact, person))
  }

  async fn list_contacts(
    &self,
    owner:  UserId,
    filter: ContactFilter,
  ) -> Result<Vec<Contact>> {
    let raws: Vec<RawContact> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CONTACT_COLUMNS}
           FROM contacts c
           WHERE c.user_id = ?1
             AND (?2 IS NULL OR c.active = ?2)
           ORDER BY c.id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![owner, filter.active], RawContact::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawContact::into_contact).collect()
  }

  async fn get_contact(&self, owner: UserId, id: ContactId) -> Result<Option<Contact>> {
    self.fetch_contact(owner, id).await
  }

  async fn replace_contact(
    &self,
    owner:  UserId,
    id:     ContactId,
    fields: ContactFields,
  ) -> Result<Option<Contact>> {
    let raw: Option<RawContact> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE contacts
           SET gender = ?3, name = ?4, firstname = ?5, birthday = ?6,
               phone = ?7, email = ?8, active = COALESCE(?9, active)
           WHERE id = ?1 AND user_id = ?2",
          rusqlite::params![
            id,
            owner,
            encode_gender(fields.gender),
            fields.name,
            fields.firstname,
            fields.birthday.map(encode_date),
            fields.phone,
            fields.email,
            fields.active,
          ],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(select_contact(conn, owner, id)?)
      })
      .await?;

    let contact = raw.map(RawContact::into_contact).transpose()?;
    if contact.is_some() {
      tracing::info!(user = owner, contact = id, "replaced contact");
    }
    Ok(contact)
  }

  async fn deactivate_contact(
    &self,
    owner: UserId,
    id:    ContactId,
  ) -> Result<Option<Contact>> {
    let raw: Option<RawContact> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE contacts SET active = 0 WHERE id = ?1 AND user_id = ?2",
          rusqlite::params![id, owner],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(select_contact(conn, owner, id)?)
      })
      .await?;

    let contact = raw.map(RawContact::into_contact).transpose()?;
    if contact.is_some() {
      tracing::info!(user = owner, contact = id, "deactivated contact");
    }
    Ok(contact)
  }

  // ── Persons ───────────────────────────────────────────────────────────────

  async fn list_persons(&self, owner: UserId) -> Result<Vec<Person>> {
    let raws: Vec<RawPerson> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PERSON_COLUMNS}
           FROM persons p
           JOIN contacts c ON c.id = p.contact_id
           WHERE c.user_id = ?1
           ORDER BY p.id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![owner], RawPerson::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  async fn get_person(&self, owner: UserId, id: PersonId) -> Result<Option<Person>> {
    self.fetch_person(owner, id).await
  }

  async fn replace_person(
    &self,
    owner:  UserId,
    id:     PersonId,
    fields: PersonFields,
  ) -> Result<Option<Person>> {
    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE persons
           SET gender = ?3, name = ?4, firstname = ?5, birthday = ?6, nickname = ?7
           WHERE id = ?1
             AND contact_id IN (SELECT id FROM contacts WHERE user_id = ?2)",
          rusqlite::params![
            id,
            owner,
            encode_gender(fields.gender),
            fields.name,
            fields.firstname,
            fields.birthday.map(encode_date),
            fields.nickname,
          ],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(select_person(conn, owner, id)?)
      })
      .await?;

    let person = raw.map(RawPerson::into_person).transpose()?;
    if person.is_some() {
      tracing::info!(user = owner, person = id, "replaced person");
    }
    Ok(person)
  }

  // ── Reads across both tables ──────────────────────────────────────────────

  async fn born_before(&self, owner: UserId, cutoff: NaiveDate) -> Result<Addresses> {
    let cutoff_day = encode_date(cutoff);

    let (raw_contacts, raw_persons): (Vec<RawContact>, Vec<RawPerson>) = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CONTACT_COLUMNS}
           FROM contacts c
           WHERE c.user_id = ?1
             AND c.birthday IS NOT NULL
             AND c.birthday < ?2
           ORDER BY c.id"
        ))?;
        let contacts = stmt
          .query_map(rusqlite::params![owner, cutoff_day], RawContact::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(&format!(
          "SELECT {PERSON_COLUMNS}
           FROM persons p
           JOIN contacts c ON c.id = p.contact_id
           WHERE c.user_id = ?1
             AND p.birthday IS NOT NULL
             AND p.birthday < ?2
           ORDER BY p.id"
        ))?;
        let persons = stmt
          .query_map(rusqlite::params![owner, cutoff_day], RawPerson::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((contacts, persons))
      })
      .await?;

    Ok(Addresses {
      contacts: raw_contacts
        .into_iter()
        .map(RawContact::into_contact)
        .collect::<Result<_>>()?,
      persons:  raw_persons
        .into_iter()
        .map(RawPerson::into_person)
        .collect::<Result<_>>()?,
    })
  }
}
