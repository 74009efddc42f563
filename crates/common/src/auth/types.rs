//! OAuth2 token types
//!
//! Defines the persisted token record, the raw token endpoint response and
//! the grant parameters sent to the token endpoint.

use std::fmt;

use amocrm_domain::constants::{
    GRANT_TYPE_AUTHORIZATION_CODE, GRANT_TYPE_REFRESH_TOKEN, TOKEN_EXPIRY_MARGIN_SECS,
};
use amocrm_domain::{AmoError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::lenient_seconds;

/// Access/refresh token pair as persisted in the credential store
///
/// Serialized with the storage field names `created_at` and `expires_in`.
/// A record whose `issued_at` is missing is always treated as expired.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Bearer credential for API calls
    pub access_token: String,

    /// Credential used to mint a new access token
    pub refresh_token: String,

    /// When the token endpoint issued this pair
    #[serde(rename = "created_at", default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<DateTime<Utc>>,

    /// Access token lifetime in seconds, as reported by the endpoint
    #[serde(rename = "expires_in", default)]
    pub expires_in_seconds: i64,
}

impl TokenRecord {
    /// Create a record issued now.
    #[must_use]
    pub fn new(access_token: String, refresh_token: String, expires_in_seconds: i64) -> Self {
        Self::with_issue_time(access_token, refresh_token, Utc::now(), expires_in_seconds)
    }

    /// Create a record with an explicit issue time.
    #[must_use]
    pub fn with_issue_time(
        access_token: String,
        refresh_token: String,
        issued_at: DateTime<Utc>,
        expires_in_seconds: i64,
    ) -> Self {
        Self { access_token, refresh_token, issued_at: Some(issued_at), expires_in_seconds }
    }

    /// Seconds of validity left at `now`, or `None` without an issue time.
    #[must_use]
    pub fn seconds_until_expiry_at(&self, now: DateTime<Utc>) -> Option<i64> {
        self.issued_at.map(|issued| {
            issued.timestamp().saturating_add(self.expires_in_seconds) - now.timestamp()
        })
    }

    /// Seconds of validity left right now.
    #[must_use]
    pub fn seconds_until_expiry(&self) -> Option<i64> {
        self.seconds_until_expiry_at(Utc::now())
    }

    /// `true` when the token has at most [`TOKEN_EXPIRY_MARGIN_SECS`] of
    /// validity left at `now`, or when no issue time is recorded.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.seconds_until_expiry_at(now) {
            Some(remaining) => remaining <= TOKEN_EXPIRY_MARGIN_SECS,
            None => true,
        }
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

impl fmt::Debug for TokenRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRecord")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .field("expires_in_seconds", &self.expires_in_seconds)
            .finish()
    }
}

/// Token endpoint response body
///
/// Every field is optional on the wire; [`TokenResponse::into_record`]
/// decides whether the response is complete enough to persist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default, deserialize_with = "lenient_seconds::deserialize")]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenResponse {
    /// Convert into a storable record issued at `issued_at`.
    ///
    /// A missing `expires_in` is stored as zero, which makes the record
    /// expired on the next freshness check.
    ///
    /// # Errors
    /// Returns `AmoError::AuthResponseIncomplete` when `access_token` or
    /// `refresh_token` is absent or empty.
    pub fn into_record(self, issued_at: DateTime<Utc>) -> Result<TokenRecord> {
        let access_token = non_empty(self.access_token)
            .ok_or(AmoError::AuthResponseIncomplete { missing: "access_token" })?;
        let refresh_token = non_empty(self.refresh_token)
            .ok_or(AmoError::AuthResponseIncomplete { missing: "refresh_token" })?;

        Ok(TokenRecord::with_issue_time(
            access_token,
            refresh_token,
            issued_at,
            self.expires_in.unwrap_or_default(),
        ))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parameters for one call to the token endpoint
///
/// Serializes to the flat JSON body the endpoint expects, with `grant_type`
/// as a discriminator field.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "grant_type", rename_all = "snake_case")]
pub enum GrantParams {
    AuthorizationCode {
        client_id: String,
        client_secret: String,
        code: String,
        redirect_uri: String,
    },
    RefreshToken {
        client_id: String,
        client_secret: String,
        refresh_token: String,
        redirect_uri: String,
    },
}

impl GrantParams {
    /// OAuth2 `grant_type` value for these parameters.
    #[must_use]
    pub const fn grant_type(&self) -> &'static str {
        match self {
            Self::AuthorizationCode { .. } => GRANT_TYPE_AUTHORIZATION_CODE,
            Self::RefreshToken { .. } => GRANT_TYPE_REFRESH_TOKEN,
        }
    }

    #[must_use]
    pub const fn is_refresh(&self) -> bool {
        matches!(self, Self::RefreshToken { .. })
    }
}

impl fmt::Debug for GrantParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AuthorizationCode { client_id, redirect_uri, .. }
            | Self::RefreshToken { client_id, redirect_uri, .. } => f
                .debug_struct("GrantParams")
                .field("grant_type", &self.grant_type())
                .field("client_id", client_id)
                .field("redirect_uri", redirect_uri)
                .finish_non_exhaustive(),
        }
    }
}
