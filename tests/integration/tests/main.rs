//! End-to-end integration tests.
//!
//! Remote logins run through the translator, the profile executor and the
//! reconciliation engine against the in-memory store.

mod lifecycle;
mod login;
