//! Traits for token exchange and credential persistence
//!
//! These traits enable dependency injection and testing by abstracting
//! external dependencies (the OAuth2 token endpoint, durable storage).

use std::sync::Arc;

use amocrm_domain::Result;

use super::types::{GrantParams, TokenRecord, TokenResponse};

/// Trait for credential storage
///
/// Maps a client secret to at most one [`TokenRecord`]. Implementations are
/// read-then-write with last-writer-wins semantics; callers that need
/// read-check-write atomicity (the token manager) hold their own lock.
pub trait CredentialStore: Send + Sync {
    /// Retrieve the record stored under `key`
    ///
    /// # Returns
    /// `Ok(None)` when nothing is stored for the key
    ///
    /// # Errors
    /// Returns `AmoError::Store` if the backing storage cannot be read or
    /// parsed
    fn get(&self, key: &str) -> Result<Option<TokenRecord>>;

    /// Store `record` under `key`, replacing any previous record
    ///
    /// # Errors
    /// Returns `AmoError::Store` if the record cannot be persisted
    fn put(&self, key: &str, record: &TokenRecord) -> Result<()>;
}

/// Trait for the OAuth2 token endpoint
pub trait TokenEndpoint: Send + Sync {
    /// Exchange grant parameters for a token response
    ///
    /// Implementations return the parsed body as-is; completeness is checked
    /// by the token manager before anything is persisted.
    ///
    /// # Errors
    /// Returns transport, classified API or serialization errors
    fn request_token(&self, params: &GrantParams) -> Result<TokenResponse>;
}

impl<T: CredentialStore + ?Sized> CredentialStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<TokenRecord>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, record: &TokenRecord) -> Result<()> {
        (**self).put(key, record)
    }
}

impl<T: TokenEndpoint + ?Sized> TokenEndpoint for Arc<T> {
    fn request_token(&self, params: &GrantParams) -> Result<TokenResponse> {
        (**self).request_token(params)
    }
}
