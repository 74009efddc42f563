//! amoCRM API surface
//!
//! # Architecture
//!
//! - [`ApiClient`] builds requests and attaches the bearer token
//! - [`TokenExchange`] is the HTTP implementation of the token endpoint
//! - [`classify`] maps every response onto success or an `ApiError`
//! - Both clients share one failover-wrapped [`Transport`](crate::http::Transport)
//!
//! Tokens and client secrets never appear in log fields.

pub mod auth;
pub mod client;
pub mod errors;
pub mod response;

pub use auth::TokenExchange;
pub use client::{ApiClient, ApiClientBuilder, ClientTokenManager, SharedStore, SharedTransport};
pub use errors::{classify, classify_status};
pub use response::ApiResponse;
