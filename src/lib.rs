//! Phone number validation and storage service.
//!
//! Raw numbers are canonicalized to E.164 via libphonenumber metadata and
//! persisted in a SQLite store with CRUD, substring search, pagination and
//! per-country statistics over a JSON HTTP API.

pub mod config;
pub mod country;
pub mod error;
pub mod handlers;
pub mod normalizer;
pub mod service;
pub mod store;
