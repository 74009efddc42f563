//! Mock implementations of the auth traits
//!
//! [`MockTokenEndpoint`] replays scripted results in order and records every
//! grant it receives.

use std::collections::VecDeque;
use std::time::Duration;

use amocrm_domain::{AmoError, Result};
use parking_lot::Mutex;

use crate::auth::{GrantParams, TokenEndpoint, TokenResponse};

/// Scripted token endpoint
///
/// Each call pops the next queued result. An exhausted queue yields
/// `AmoError::InvalidInput` so unexpected calls fail loudly.
#[derive(Debug, Default)]
pub struct MockTokenEndpoint {
    responses: Mutex<VecDeque<Result<TokenResponse>>>,
    calls: Mutex<Vec<GrantParams>>,
    delay: Option<Duration>,
}

impl MockTokenEndpoint {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep for `delay` inside every call, to widen race windows.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a successful response.
    pub fn push_response(&self, response: TokenResponse) {
        self.responses.lock().push_back(Ok(response));
    }

    /// Queue a failure.
    pub fn push_error(&self, error: AmoError) {
        self.responses.lock().push_back(Err(error));
    }

    /// Grants received so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<GrantParams> {
        self.calls.lock().clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl TokenEndpoint for MockTokenEndpoint {
    fn request_token(&self, params: &GrantParams) -> Result<TokenResponse> {
        self.calls.lock().push(params.clone());

        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        self.responses.lock().pop_front().unwrap_or_else(|| {
            Err(AmoError::InvalidInput(format!(
                "unexpected {} token request",
                params.grant_type()
            )))
        })
    }
}
