//! OAuth2 token lifecycle for the amoCRM API
//!
//! This module owns everything between "a request needs a bearer token" and
//! "a token record is persisted": the record type, grant parameter
//! selection, the credential store abstraction and the token manager that
//! ties them together.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  TokenManager   │  read-check-authorize-write under one lock
//! └────────┬────────┘
//!          │
//!          ├──► TokenEndpoint     (HTTP token exchange, implemented in infra)
//!          │
//!          └──► CredentialStore   (client_secret -> TokenRecord)
//!                    ├── FileCredentialStore      (JSON document on disk)
//!                    └── InMemoryCredentialStore  (tests, ephemeral use)
//! ```
//!
//! # Usage Example
//!
//! ```no_run
//! use amocrm_common::auth::{FileCredentialStore, TokenManager};
//! # use amocrm_common::auth::{GrantParams, TokenEndpoint, TokenResponse};
//! # struct Endpoint;
//! # impl TokenEndpoint for Endpoint {
//! #     fn request_token(&self, _: &GrantParams) -> amocrm_domain::Result<TokenResponse> {
//! #         unimplemented!()
//! #     }
//! # }
//! use amocrm_domain::ClientConfig;
//!
//! let config = ClientConfig::new(
//!     "https://example.amocrm.ru",
//!     "client-id",
//!     "client-secret",
//!     "authorization-code",
//!     "https://example.com/callback",
//! );
//! let store = FileCredentialStore::new(&config.credentials_path);
//! let manager = TokenManager::new(Endpoint, store, config.identity(), config.grant_policy);
//!
//! let token = manager.ensure_valid_token()?;
//! println!("token valid for {:?} more seconds", token.seconds_until_expiry());
//! # Ok::<(), amocrm_domain::AmoError>(())
//! ```

pub mod store;
pub mod token_manager;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use store::{FileCredentialStore, InMemoryCredentialStore};
pub use token_manager::TokenManager;
pub use traits::{CredentialStore, TokenEndpoint};
pub use types::{GrantParams, TokenRecord, TokenResponse};
