//! Testing utilities and helpers
//!
//! Available to unit tests and, with the `test-utils` feature, to other
//! crates' test suites:
//! - **[`mocks`]**: scripted [`TokenEndpoint`](crate::auth::TokenEndpoint)
//! - **[`fixtures`]**: token responses and records
//!
//! ## Usage
//!
//! ```rust
//! use amocrm_common::testing::{token_response, MockTokenEndpoint};
//!
//! let endpoint = MockTokenEndpoint::new();
//! endpoint.push_response(token_response("access", "refresh", 86_400));
//! assert_eq!(endpoint.call_count(), 0);
//! ```

pub mod fixtures;
pub mod mocks;

pub use fixtures::{expired_record, fresh_record, token_response};
pub use mocks::MockTokenEndpoint;
