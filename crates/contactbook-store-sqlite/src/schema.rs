//! SQL schema for the contact-book SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    username    TEXT NOT NULL UNIQUE,
    email       TEXT,
    created_at  TEXT NOT NULL      -- RFC 3339 UTC
);

-- One token per user, issued together with the user row.
CREATE TABLE IF NOT EXISTS auth_tokens (
    key         TEXT PRIMARY KEY,  -- 40 lowercase hex chars
    user_id     INTEGER NOT NULL UNIQUE REFERENCES users(id),
    created_at  TEXT NOT NULL
);

-- Rows are never deleted; `active = 0` marks a soft delete.
CREATE TABLE IF NOT EXISTS contacts (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL REFERENCES users(id),
    gender      TEXT NOT NULL,     -- 'Male' | 'Female' | 'Other'
    name        TEXT NOT NULL,
    firstname   TEXT NOT NULL,
    birthday    INTEGER,           -- day number, 0001-01-01 = 1
    phone       TEXT,
    email       TEXT,
    active      INTEGER NOT NULL DEFAULT 1
);

-- Exactly one person per contact.
CREATE TABLE IF NOT EXISTS persons (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    contact_id  INTEGER NOT NULL UNIQUE REFERENCES contacts(id),
    gender      TEXT NOT NULL,
    name        TEXT NOT NULL,
    firstname   TEXT NOT NULL,
    birthday    INTEGER,
    nickname    TEXT
);

CREATE INDEX IF NOT EXISTS contacts_user_idx     ON contacts(user_id);
CREATE INDEX IF NOT EXISTS contacts_birthday_idx ON contacts(birthday);
CREATE INDEX IF NOT EXISTS persons_birthday_idx  ON persons(birthday);

PRAGMA user_version = 1;
";
