//! Core types and trait definitions for the contact book.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod age;
pub mod contact;
pub mod error;
pub mod person;
pub mod store;
pub mod user;
pub mod validation;

pub use error::{Error, Result};
