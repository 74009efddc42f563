//! Test fixture generators

use chrono::{Duration, Utc};

use crate::auth::{TokenRecord, TokenResponse};

/// Complete token endpoint response.
#[must_use]
pub fn token_response(access_token: &str, refresh_token: &str, expires_in: i64) -> TokenResponse {
    TokenResponse {
        access_token: Some(access_token.to_string()),
        refresh_token: Some(refresh_token.to_string()),
        expires_in: Some(expires_in),
        token_type: Some("Bearer".to_string()),
    }
}

/// Record issued just now with a one-day lifetime.
#[must_use]
pub fn fresh_record(access_token: &str, refresh_token: &str) -> TokenRecord {
    TokenRecord::new(access_token.to_string(), refresh_token.to_string(), 86_400)
}

/// Record issued a day ago with a one-day lifetime.
#[must_use]
pub fn expired_record(access_token: &str, refresh_token: &str) -> TokenRecord {
    TokenRecord::with_issue_time(
        access_token.to_string(),
        refresh_token.to_string(),
        Utc::now() - Duration::days(1),
        86_400,
    )
}
