//! Token manager with on-demand authorization
//!
//! Manages the OAuth token lifecycle for one client identity:
//! - Token retrieval from the credential store
//! - Freshness check against the expiry margin
//! - Grant selection (authorization code or refresh token)
//! - Validation and persistence of the endpoint response

use amocrm_domain::{ClientIdentity, GrantPolicy, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::traits::{CredentialStore, TokenEndpoint};
use super::types::{GrantParams, TokenRecord};

/// Token manager for a single client secret
///
/// Every read-check-authorize-write sequence runs under the manager's own
/// lock, so concurrent callers sharing one manager trigger a single token
/// round-trip.
pub struct TokenManager<E: TokenEndpoint, S: CredentialStore> {
    endpoint: E,
    store: S,
    identity: ClientIdentity,
    policy: GrantPolicy,
    lock: Mutex<()>,
}

impl<E: TokenEndpoint, S: CredentialStore> TokenManager<E, S> {
    /// Create a new token manager
    ///
    /// # Arguments
    /// * `endpoint` - Token endpoint used for authorization and refresh
    /// * `store` - Credential store; records are keyed by client secret
    /// * `identity` - Client identity supplying grant parameters
    /// * `policy` - Grant selection policy
    #[must_use]
    pub fn new(endpoint: E, store: S, identity: ClientIdentity, policy: GrantPolicy) -> Self {
        Self { endpoint, store, identity, policy, lock: Mutex::new(()) }
    }

    #[must_use]
    pub fn identity(&self) -> &ClientIdentity {
        &self.identity
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn policy(&self) -> GrantPolicy {
        self.policy
    }

    /// Stored record for this client, without authorizing.
    ///
    /// # Errors
    /// Returns `AmoError::Store` if the store cannot be read
    pub fn stored_record(&self) -> Result<Option<TokenRecord>> {
        self.store.get(&self.identity.client_secret)
    }

    /// Stored access token, if any, without authorizing.
    ///
    /// Empty tokens are reported as `None`.
    ///
    /// # Errors
    /// Returns `AmoError::Store` if the store cannot be read
    pub fn current_access_token(&self) -> Result<Option<String>> {
        Ok(self
            .stored_record()?
            .map(|record| record.access_token)
            .filter(|token| !token.is_empty()))
    }

    /// `true` when there is no record or the record is within the expiry
    /// margin.
    #[must_use]
    pub fn is_expired(&self, record: Option<&TokenRecord>) -> bool {
        self.is_expired_at(record, Utc::now())
    }

    #[must_use]
    pub fn is_expired_at(&self, record: Option<&TokenRecord>, now: DateTime<Utc>) -> bool {
        record.map_or(true, |r| r.is_expired_at(now))
    }

    /// Whether the next [`ensure_valid_token`](Self::ensure_valid_token)
    /// would contact the token endpoint.
    ///
    /// # Errors
    /// Returns `AmoError::Store` if the store cannot be read
    pub fn needs_authorization(&self) -> Result<bool> {
        Ok(!is_usable_at(self.stored_record()?.as_ref(), Utc::now()))
    }

    /// Grant parameters for the next token request.
    ///
    /// See [`GrantPolicy`] for how `record` selects the grant type.
    #[must_use]
    pub fn build_auth_params(&self, record: Option<&TokenRecord>) -> GrantParams {
        self.build_auth_params_at(record, Utc::now())
    }

    #[must_use]
    pub fn build_auth_params_at(
        &self,
        record: Option<&TokenRecord>,
        now: DateTime<Utc>,
    ) -> GrantParams {
        let refresh_token = match self.policy {
            GrantPolicy::RefreshWhenExpired => record,
            GrantPolicy::ReauthorizeWhenExpired => record.filter(|r| !r.is_expired_at(now)),
        }
        .map(|r| r.refresh_token.as_str())
        .filter(|token| !token.is_empty());

        let identity = &self.identity;
        match refresh_token {
            Some(refresh_token) => GrantParams::RefreshToken {
                client_id: identity.client_id.clone(),
                client_secret: identity.client_secret.clone(),
                refresh_token: refresh_token.to_string(),
                redirect_uri: identity.redirect_uri.clone(),
            },
            None => GrantParams::AuthorizationCode {
                client_id: identity.client_id.clone(),
                client_secret: identity.client_secret.clone(),
                code: identity.authorization_code.clone(),
                redirect_uri: identity.redirect_uri.clone(),
            },
        }
    }

    /// Return a token with more than the expiry margin of validity left.
    ///
    /// Makes no network call while the stored record is fresh. Otherwise
    /// authorizes, persists the new record and returns it.
    ///
    /// # Errors
    /// Returns store, transport, API or `AuthResponseIncomplete` errors from
    /// the authorization round-trip
    pub fn ensure_valid_token(&self) -> Result<TokenRecord> {
        let _guard = self.lock.lock();

        let current = self.stored_record()?;
        match current {
            Some(record) if is_usable_at(Some(&record), Utc::now()) => {
                debug!(client_id = %self.identity.client_id, "Stored token is fresh");
                Ok(record)
            }
            other => {
                debug!(
                    client_id = %self.identity.client_id,
                    stored = other.is_some(),
                    "Stored token missing, blank or expiring, authorizing"
                );
                self.authorize_locked(other.as_ref())
            }
        }
    }

    /// Force a token round-trip regardless of freshness.
    ///
    /// # Errors
    /// Returns store, transport, API or `AuthResponseIncomplete` errors
    pub fn authorize(&self) -> Result<TokenRecord> {
        let _guard = self.lock.lock();
        let current = self.stored_record()?;
        self.authorize_locked(current.as_ref())
    }

    fn authorize_locked(&self, current: Option<&TokenRecord>) -> Result<TokenRecord> {
        let params = self.build_auth_params(current);
        let grant_type = params.grant_type();

        let response = self.endpoint.request_token(&params).map_err(|err| {
            warn!(client_id = %self.identity.client_id, grant_type, error = %err, "Token request failed");
            err
        })?;

        let record = response.into_record(Utc::now()).map_err(|err| {
            warn!(client_id = %self.identity.client_id, grant_type, error = %err, "Token response rejected");
            err
        })?;

        self.store.put(&self.identity.client_secret, &record)?;

        info!(
            client_id = %self.identity.client_id,
            grant_type,
            expires_in = record.expires_in_seconds,
            "Token stored"
        );

        Ok(record)
    }
}

/// A record can be sent as a bearer: present, not expiring and with a
/// non-blank access token.
fn is_usable_at(record: Option<&TokenRecord>, now: DateTime<Utc>) -> bool {
    record.is_some_and(|r| !r.is_expired_at(now) && !r.access_token.trim().is_empty())
}
