//! Successful API response

use amocrm_domain::{AmoError, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

/// A response that passed classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    status: StatusCode,
    body: Vec<u8>,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: StatusCode, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    #[must_use]
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Body as UTF-8 text, with invalid sequences replaced.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserialize the JSON body.
    ///
    /// 204 and empty bodies deserialize from `null`, so `()` and `Option<T>`
    /// work for endpoints that return nothing.
    ///
    /// # Errors
    /// Returns `AmoError::Serialization` if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        let blank = self.body.iter().all(u8::is_ascii_whitespace);
        let parsed = if self.status == StatusCode::NO_CONTENT || blank {
            serde_json::from_value(serde_json::Value::Null)
        } else {
            serde_json::from_slice(&self.body)
        };

        parsed.map_err(|err| {
            AmoError::Serialization(format!(
                "failed to parse {} response body: {err}",
                self.status.as_u16()
            ))
        })
    }
}
