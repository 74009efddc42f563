//! HTTP transport layer
//!
//! - [`HttpClient`]: blocking `reqwest` client, one attempt per request
//! - [`HostFailover`]: retries connect/timeout failures once on a mirror
//! - [`Transport`]: the seam both implement, and the one tests fake

pub mod client;
pub mod failover;
pub mod transport;

pub use client::{HttpClient, HttpClientBuilder};
pub use failover::{rewrite_origin, same_origin, HostFailover};
pub use transport::{HttpRequest, HttpResponse, Transport};
