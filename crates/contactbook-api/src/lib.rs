//! JSON REST API for the contact book.
//!
//! Exposes an axum [`Router`] backed by any
//! [`contactbook_core::store::ContactBookStore`]. Every route requires token
//! authentication; TLS and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", contactbook_api::api_router(store.clone()))
//! ```

pub mod addresses;
pub mod auth;
pub mod contacts;
pub mod error;
pub mod persons;

use std::sync::Arc;

use axum::{Router, routing::get};
use contactbook_core::store::ContactBookStore;

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: ContactBookStore> {
  pub store: Arc<S>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ContactBookStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Contacts
    .route("/contacts", get(contacts::list::<S>).post(contacts::create::<S>))
    .route(
      "/contacts/{id}",
      get(contacts::get_one::<S>)
        .put(contacts::replace::<S>)
        .delete(contacts::deactivate::<S>),
    )
    // Persons
    .route("/personss", get(persons::list::<S>))
    .route("/persons", get(persons::list::<S>))
    .route(
      "/persons/{id}",
      get(persons::get_one::<S>).put(persons::replace::<S>),
    )
    // Addresses
    .route("/addresses", get(addresses::handler::<S>))
    .with_state(AppState { store })
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use chrono::{NaiveDate, Utc};
  use contactbook_core::{
    contact::{ContactFields, Gender},
    store::ContactFilter,
    user::User,
  };
  use contactbook_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  struct Fixture {
    store: Arc<SqliteStore>,
    mike:  User,
    token: String,
  }

  impl Fixture {
    fn app(&self) -> Router { Router::new().nest("/api", api_router(self.store.clone())) }
  }

  async fn fixture() -> Fixture {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let (mike, token) = store
      .create_user("Mike".into(), Some("mike@gmail.com".into()))
      .await
      .unwrap();
    store
      .create_contact(
        mike.id,
        ContactFields {
          gender:    Gender::Male,
          name:      "Doe".into(),
          firstname: "John".into(),
          birthday:  NaiveDate::from_ymd_opt(2000, 10, 2),
          phone:     Some("555333444".into()),
          email:     Some("doe@gmail.com".into()),
          user:      Some(mike.id),
          active:    Some(true),
        },
      )
      .await
      .unwrap();

    Fixture { store: Arc::new(store), mike, token: token.key }
  }

  async fn send(
    app:   Router,
    method: &str,
    uri:   &str,
    token: Option<&str>,
    body:  Option<Value>,
  ) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
      builder = builder.header(header::AUTHORIZATION, format!("Token {t}"));
    }
    let req = match body {
      Some(v) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(v.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
  }

  fn json_of(bytes: &[u8]) -> Value { serde_json::from_slice(bytes).unwrap() }

  fn jane(user: i64) -> Value {
    json!({
      "gender": "Female", "birthday": "2020-02-03", "firstname": "Jane",
      "name": "Doe", "phone": "067666777", "email": "janedoe@gmail.com",
      "user": user, "active": true
    })
  }

  // ── Auth ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn unauthenticated_requests_return_401_without_data() {
    let f = fixture().await;
    for uri in ["/api/contacts", "/api/personss", "/api/contacts/1", "/api/addresses?is_older_than=1"] {
      let (status, body) = send(f.app(), "GET", uri, None, None).await;
      assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
      let text = String::from_utf8(body).unwrap();
      assert!(!text.contains("Doe"), "{uri} leaked data: {text}");
    }
  }

  #[tokio::test]
  async fn unknown_token_returns_401() {
    let f = fixture().await;
    let bogus = "f".repeat(40);
    let (status, _) = send(f.app(), "GET", "/api/contacts", Some(&bogus), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn unauthenticated_create_stores_nothing() {
    let f = fixture().await;
    let (status, _) = send(f.app(), "POST", "/api/contacts", None, Some(jane(f.mike.id))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let all = f.store.list_contacts(f.mike.id, ContactFilter::default()).await.unwrap();
    assert_eq!(all.len(), 1);
  }

  // ── Lists ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn list_contacts_returns_owned_records() {
    let f = fixture().await;
    let (other, _) = f.store.create_user("Ana".into(), None).await.unwrap();
    f.store
      .create_contact(other.id, serde_json::from_value(jane(other.id)).unwrap())
      .await
      .unwrap();

    let expected = f.store.list_contacts(f.mike.id, ContactFilter::default()).await.unwrap();
    let (status, body) = send(f.app(), "GET", "/api/contacts", Some(&f.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_of(&body), serde_json::to_value(&expected).unwrap());
    assert_eq!(expected.len(), 1);
  }

  #[tokio::test]
  async fn list_persons_returns_owned_records() {
    let f = fixture().await;
    let expected = f.store.list_persons(f.mike.id).await.unwrap();

    for uri in ["/api/personss", "/api/persons"] {
      let (status, body) = send(f.app(), "GET", uri, Some(&f.token), None).await;
      assert_eq!(status, StatusCode::OK);
      assert_eq!(json_of(&body), serde_json::to_value(&expected).unwrap());
    }
  }

  // ── Create ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_contact_returns_201_and_derives_person() {
    let f = fixture().await;
    let (status, body) =
      send(f.app(), "POST", "/api/contacts", Some(&f.token), Some(jane(f.mike.id))).await;
    assert_eq!(status, StatusCode::CREATED);

    let created = json_of(&body);
    assert_eq!(created["firstname"], "Jane");
    assert_eq!(created["user"], f.mike.id);
    assert_eq!(created["active"], true);

    let id = created["id"].as_i64().unwrap();
    let persons = f.store.list_persons(f.mike.id).await.unwrap();
    assert_eq!(persons.iter().filter(|p| p.contact == id).count(), 1);
    assert_eq!(persons.len(), 2);
  }

  #[tokio::test]
  async fn create_without_user_field_uses_caller() {
    let f = fixture().await;
    let mut body = jane(f.mike.id);
    body.as_object_mut().unwrap().remove("user");
    let (status, resp) = send(f.app(), "POST", "/api/contacts", Some(&f.token), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json_of(&resp)["user"], f.mike.id);
  }

  #[tokio::test]
  async fn create_with_bad_phone_is_rejected() {
    let f = fixture().await;
    let mut body = jane(f.mike.id);
    body["phone"] = json!("555333");
    let (status, resp) = send(f.app(), "POST", "/api/contacts", Some(&f.token), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json_of(&resp)["fields"]["phone"].is_array());

    let persons = f.store.list_persons(f.mike.id).await.unwrap();
    assert_eq!(persons.len(), 1, "rejected create must not derive a person");
  }

  #[tokio::test]
  async fn create_with_bad_email_is_rejected() {
    let f = fixture().await;
    for email in [json!("janedoe-at-gmail"), json!(format!("{}@gmail.com", "j".repeat(95)))] {
      let mut body = jane(f.mike.id);
      body["email"] = email;
      let (status, resp) =
        send(f.app(), "POST", "/api/contacts", Some(&f.token), Some(body)).await;
      assert_eq!(status, StatusCode::BAD_REQUEST);
      assert!(json_of(&resp)["fields"]["email"].is_array());
    }
  }

  #[tokio::test]
  async fn create_for_another_user_is_rejected() {
    let f = fixture().await;
    let (other, _) = f.store.create_user("Ana".into(), None).await.unwrap();
    let (status, resp) =
      send(f.app(), "POST", "/api/contacts", Some(&f.token), Some(jane(other.id))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json_of(&resp)["fields"]["user"].is_array());
  }

  #[tokio::test]
  async fn create_missing_required_field_names_the_field() {
    let f = fixture().await;
    let mut body = jane(f.mike.id);
    body.as_object_mut().unwrap().remove("name");
    let (status, resp) = send(f.app(), "POST", "/api/contacts", Some(&f.token), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_of(&resp)["fields"]["name"], json!(["This field is required."]));
  }

  #[tokio::test]
  async fn create_with_unknown_gender_names_the_field() {
    let f = fixture().await;
    let mut body = jane(f.mike.id);
    body["gender"] = json!("Robot");
    let (status, resp) = send(f.app(), "POST", "/api/contacts", Some(&f.token), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json_of(&resp)["fields"]["gender"].is_array());
    let all = f.store.list_contacts(f.mike.id, ContactFilter::default()).await.unwrap();
    assert_eq!(all.len(), 1);
  }

  #[tokio::test]
  async fn create_with_whitespace_name_is_rejected() {
    let f = fixture().await;
    let mut body = jane(f.mike.id);
    body["name"] = json!("   ");
    let (status, resp) = send(f.app(), "POST", "/api/contacts", Some(&f.token), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json_of(&resp)["fields"]["name"].is_array());
  }

  // ── Detail ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn get_contact_and_person_detail() {
    let f = fixture().await;
    let (status, body) = send(f.app(), "GET", "/api/contacts/1", Some(&f.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_of(&body)["name"], "Doe");

    let (status, body) = send(f.app(), "GET", "/api/persons/1", Some(&f.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_of(&body)["contact"], 1);
  }

  #[tokio::test]
  async fn other_users_records_are_not_found() {
    let f = fixture().await;
    let (_, ana_token) = f.store.create_user("Ana".into(), None).await.unwrap();
    let ana = Some(ana_token.key.as_str());

    let (status, _) = send(f.app(), "GET", "/api/contacts/1", ana, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(f.app(), "GET", "/api/persons/1", ana, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(f.app(), "DELETE", "/api/contacts/1", ana, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = send(f.app(), "GET", "/api/contacts", ana, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_of(&body), json!([]));
  }

  // ── Update ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn update_contact_returns_200() {
    let f = fixture().await;
    let body = json!({
      "gender": "Male", "birthday": "2020-02-03", "firstname": "George",
      "name": "Heys", "phone": "067666777", "email": "janedoe@gmail.com",
      "user": f.mike.id, "active": true
    });
    let (status, resp) = send(f.app(), "PUT", "/api/contacts/1", Some(&f.token), Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    let updated = json_of(&resp);
    assert_eq!(updated["firstname"], "George");
    assert_eq!(updated["birthday"], "2020-02-03");

    // The person keeps the values it was created with.
    let person = f.store.get_person(f.mike.id, 1).await.unwrap().unwrap();
    assert_eq!(person.firstname, "John");
  }

  #[tokio::test]
  async fn update_unknown_contact_returns_404() {
    let f = fixture().await;
    let (status, _) =
      send(f.app(), "PUT", "/api/contacts/99", Some(&f.token), Some(jane(f.mike.id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn update_person_returns_200() {
    let f = fixture().await;
    let body = json!({
      "gender": "Female", "birthday": "2000-02-03", "nickname": "Neo",
      "firstname": "Georgina", "name": "Heys"
    });
    let (status, resp) = send(f.app(), "PUT", "/api/persons/1", Some(&f.token), Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    let updated = json_of(&resp);
    assert_eq!(updated["nickname"], "Neo");
    assert_eq!(updated["gender"], "Female");
    assert_eq!(updated["contact"], 1);

    let contact = f.store.get_contact(f.mike.id, 1).await.unwrap().unwrap();
    assert_eq!(contact.firstname, "John");
  }

  // ── Delete ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn delete_contact_only_deactivates() {
    let f = fixture().await;
    let (status, _) = send(f.app(), "DELETE", "/api/contacts/1", Some(&f.token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let contact = f.store.get_contact(f.mike.id, 1).await.unwrap().unwrap();
    assert!(!contact.active);
    assert!(f.store.get_person(f.mike.id, 1).await.unwrap().is_some());

    let (status, body) =
      send(f.app(), "GET", "/api/contacts?active=true", Some(&f.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_of(&body), json!([]));
  }

  #[tokio::test]
  async fn put_without_active_keeps_contact_deleted() {
    let f = fixture().await;
    send(f.app(), "DELETE", "/api/contacts/1", Some(&f.token), None).await;

    let mut body = jane(f.mike.id);
    body.as_object_mut().unwrap().remove("active");
    let (status, resp) =
      send(f.app(), "PUT", "/api/contacts/1", Some(&f.token), Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_of(&resp)["active"], json!(false));
    assert_eq!(json_of(&resp)["firstname"], json!("Jane"));
  }

  // ── Addresses ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn addresses_without_parameter_returns_hint() {
    let f = fixture().await;
    let (status, body) = send(f.app(), "GET", "/api/addresses", Some(&f.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
      String::from_utf8(body).unwrap(),
      "<p>Please put the query parameter is_older_than into the url.</p>"
    );
  }

  #[tokio::test]
  async fn addresses_with_parameter_lists_older_records() {
    let f = fixture().await;
    let mut recent = jane(f.mike.id);
    recent["birthday"] = json!(Utc::now().date_naive().to_string());
    send(f.app(), "POST", "/api/contacts", Some(&f.token), Some(recent)).await;

    let (status, body) =
      send(f.app(), "GET", "/api/addresses?is_older_than=1", Some(&f.token), None).await;
    assert_eq!(status, StatusCode::OK);
    let res = json_of(&body);
    let contacts = res["Contacts"].as_array().unwrap();
    let persons = res["Persons"].as_array().unwrap();

    let cutoff = contactbook_core::age::birthday_cutoff(Utc::now().date_naive(), 1).unwrap();
    let expected = f.store.born_before(f.mike.id, cutoff).await.unwrap();
    assert_eq!(contacts.len() + persons.len(), expected.contacts.len() + expected.persons.len());
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0]["firstname"], "John");
    assert_eq!(persons.len(), 1);
  }

  #[tokio::test]
  async fn addresses_with_bad_parameter_is_400() {
    let f = fixture().await;
    for q in ["abc", "-1", "1.5"] {
      let uri = format!("/api/addresses?is_older_than={q}");
      let (status, _) = send(f.app(), "GET", &uri, Some(&f.token), None).await;
      assert_eq!(status, StatusCode::BAD_REQUEST, "{q}");
    }
  }
}
