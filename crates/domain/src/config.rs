//! Client configuration structures
//!
//! `ClientConfig` is passed explicitly to the client at construction time;
//! there is no process-wide configuration object.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_PATH, DEFAULT_AUTH_URL, DEFAULT_CREDENTIALS_PATH, DEFAULT_TIMEOUT_SECS,
};
use crate::errors::{AmoError, Result};

/// How the token manager picks a grant type when it has to authorize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantPolicy {
    /// Use the stored refresh token whenever one exists; fall back to the
    /// authorization code only when nothing usable is stored.
    #[default]
    RefreshWhenExpired,
    /// Re-run the authorization-code grant whenever the stored record is
    /// absent or expired; a fresh record yields a refresh-token grant.
    ReauthorizeWhenExpired,
}

impl FromStr for GrantPolicy {
    type Err = AmoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "refresh_when_expired" | "refresh" => Ok(Self::RefreshWhenExpired),
            "reauthorize_when_expired" | "reauthorize" => Ok(Self::ReauthorizeWhenExpired),
            other => Err(AmoError::Config(format!("Unknown grant policy: {other}"))),
        }
    }
}

/// Immutable OAuth2 identity of a client instance.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub endpoint: String,
    pub client_id: String,
    pub client_secret: String,
    pub authorization_code: String,
    pub redirect_uri: String,
}

impl fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("endpoint", &self.endpoint)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("authorization_code", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

/// Configuration for the amoCRM client
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Account endpoint, e.g. `https://example.amocrm.ru`
    pub api_endpoint: String,
    pub client_id: String,
    pub client_secret: String,
    /// Authorization code issued for the integration
    #[serde(alias = "authorization_code")]
    pub code: String,
    pub redirect_uri: String,
    #[serde(default = "default_api_path")]
    pub api_path: String,
    /// Token endpoint, relative to `api_endpoint` or absolute
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    /// Alternate host used after a connection failure against the primary
    #[serde(default)]
    pub mirror_endpoint: Option<String>,
    /// Where the credential document lives
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub grant_policy: GrantPolicy,
}

fn default_api_path() -> String {
    DEFAULT_API_PATH.to_string()
}

fn default_auth_url() -> String {
    DEFAULT_AUTH_URL.to_string()
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from(DEFAULT_CREDENTIALS_PATH)
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ClientConfig {
    /// Create a configuration with default paths, timeout and grant policy.
    #[must_use]
    pub fn new(
        api_endpoint: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        code: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            api_endpoint: api_endpoint.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            code: code.into(),
            redirect_uri: redirect_uri.into(),
            api_path: default_api_path(),
            auth_url: default_auth_url(),
            mirror_endpoint: None,
            credentials_path: default_credentials_path(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            grant_policy: GrantPolicy::default(),
        }
    }

    /// Set the mirror host used for failover.
    #[must_use]
    pub fn with_mirror(mut self, mirror_endpoint: impl Into<String>) -> Self {
        self.mirror_endpoint = Some(mirror_endpoint.into());
        self
    }

    /// Set the credential document location.
    #[must_use]
    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = path.into();
        self
    }

    #[must_use]
    pub const fn with_grant_policy(mut self, policy: GrantPolicy) -> Self {
        self.grant_policy = policy;
        self
    }

    /// The OAuth2 identity slice of this configuration.
    #[must_use]
    pub fn identity(&self) -> ClientIdentity {
        ClientIdentity {
            endpoint: self.api_endpoint.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            authorization_code: self.code.clone(),
            redirect_uri: self.redirect_uri.clone(),
        }
    }

    /// Check that every required field is present.
    ///
    /// # Errors
    /// Returns `AmoError::Config` naming the first empty required field.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("api_endpoint", &self.api_endpoint),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("code", &self.code),
            ("redirect_uri", &self.redirect_uri),
            ("auth_url", &self.auth_url),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(AmoError::Config(format!("Missing required field: {name}")));
            }
        }

        if self.timeout_secs == 0 {
            return Err(AmoError::Config("timeout_secs must be greater than zero".to_string()));
        }

        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_endpoint", &self.api_endpoint)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("code", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("api_path", &self.api_path)
            .field("auth_url", &self.auth_url)
            .field("mirror_endpoint", &self.mirror_endpoint)
            .field("credentials_path", &self.credentials_path)
            .field("timeout_secs", &self.timeout_secs)
            .field("grant_policy", &self.grant_policy)
            .finish()
    }
}
