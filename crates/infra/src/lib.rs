//! # amoCRM Infrastructure
//!
//! I/O-bound implementations behind the amoCRM client.
//!
//! This crate contains:
//! - Blocking HTTP transport (`reqwest`) with mirror-host failover
//! - The token exchange implementing `amocrm_common::auth::TokenEndpoint`
//! - The API client: request dispatch and response classification
//! - Configuration loading from the environment or files
//!
//! ## Architecture
//! - Implements traits defined in `amocrm-common`
//! - Depends on `amocrm-domain` and `amocrm-common`
//! - Contains all network and configuration I/O

pub mod api;
pub mod config;
pub mod http;

// Re-export commonly used items
pub use api::{classify, classify_status, ApiClient, ApiClientBuilder, ApiResponse, TokenExchange};
pub use http::{HostFailover, HttpClient, HttpRequest, HttpResponse, Transport};
