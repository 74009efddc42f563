//! Token exchange over HTTP
//!
//! Implements [`TokenEndpoint`] by POSTing the grant parameters as JSON to
//! `<endpoint><auth_url>`. The request carries no bearer token and goes
//! through the same transport (and therefore the same mirror failover) and
//! classifier as API calls.

use amocrm_common::auth::{GrantParams, TokenEndpoint, TokenResponse};
use amocrm_domain::{AmoError, Result};
use tracing::{debug, instrument};
use url::Url;

use super::errors::classify;
use crate::http::{HttpRequest, Transport};

/// [`TokenEndpoint`] backed by a [`Transport`].
#[derive(Debug, Clone)]
pub struct TokenExchange<T> {
    transport: T,
    token_url: Url,
}

impl<T: Transport> TokenExchange<T> {
    /// Create an exchange for `endpoint` + `auth_url`.
    ///
    /// An absolute `auth_url` is used as-is.
    ///
    /// # Errors
    /// Returns `AmoError::Config` if the resulting URL is invalid.
    pub fn new(transport: T, endpoint: &str, auth_url: &str) -> Result<Self> {
        let token_url = if Url::parse(auth_url).is_ok() {
            auth_url.to_string()
        } else {
            join_endpoint(endpoint, auth_url)
        };
        let token_url = Url::parse(&token_url)
            .map_err(|err| AmoError::Config(format!("invalid token URL {token_url}: {err}")))?;

        Ok(Self { transport, token_url })
    }

    #[must_use]
    pub fn token_url(&self) -> &Url {
        &self.token_url
    }
}

impl<T: Transport> TokenEndpoint for TokenExchange<T> {
    #[instrument(skip_all, fields(grant_type = params.grant_type()))]
    fn request_token(&self, params: &GrantParams) -> Result<TokenResponse> {
        let request = HttpRequest::post(self.token_url.clone()).json(params)?;

        debug!(url = %self.token_url, "requesting token");
        let response = self.transport.send(&request)?;
        let response = classify(response)?;

        response.json::<TokenResponse>()
    }
}

/// `endpoint` and `path` joined with exactly one slash.
pub(crate) fn join_endpoint(endpoint: &str, path: &str) -> String {
    let endpoint = endpoint.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{endpoint}{path}")
    } else {
        format!("{endpoint}/{path}")
    }
}
