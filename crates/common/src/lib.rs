//! Token lifecycle and credential storage for the amoCRM client.
//!
//! # Safety and Quality
//!
//! Library code never panics on I/O or protocol errors; every failure is
//! surfaced as an [`amocrm_domain::AmoError`].
//!
//! # Modules
//! - `auth`: token records, grant parameters, credential stores and the
//!   token manager state machine
//! - `utils`: serde helpers shared by the wire types
//! - `testing` (feature `test-utils`): mock token endpoint and fixtures

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod auth;
pub mod utils;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", test))]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
pub use auth::{
    CredentialStore, FileCredentialStore, GrantParams, InMemoryCredentialStore, TokenEndpoint,
    TokenManager, TokenRecord, TokenResponse,
};
