//! Transport abstraction shared by the API client and the token exchange
//!
//! Requests are fully buffered so a failed attempt can be replayed against
//! another host without re-serializing anything.

use std::sync::Arc;

use amocrm_domain::{AmoError, Result, TransportError};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use url::Url;

/// A buffered HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    #[must_use]
    pub fn new(method: Method, url: Url) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Self { method, url, headers, body: None }
    }

    #[must_use]
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    #[must_use]
    pub fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    /// Attach `Authorization: Bearer <token>`.
    ///
    /// # Errors
    /// Returns `AmoError::InvalidInput` if the token is not a valid header
    /// value.
    pub fn bearer_auth(mut self, token: &str) -> Result<Self> {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| AmoError::InvalidInput("access token is not a valid header value".into()))?;
        value.set_sensitive(true);
        self.headers.insert(AUTHORIZATION, value);
        Ok(self)
    }

    /// Serialize `body` as the JSON payload.
    ///
    /// # Errors
    /// Returns `AmoError::Serialization` if `body` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let bytes =
            serde_json::to_vec(body).map_err(|err| AmoError::Serialization(err.to_string()))?;
        self.headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = Some(bytes);
        Ok(self)
    }

    /// Same request aimed at another URL.
    #[must_use]
    pub fn with_url(&self, url: Url) -> Self {
        Self { url, ..self.clone() }
    }
}

/// A fully read HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    status: StatusCode,
    body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self { status, body: body.into() }
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
    pub fn into_parts(self) -> (StatusCode, Vec<u8>) {
        (self.status, self.body)
    }
}

/// Something that turns a request into a response.
///
/// Any HTTP status is a successful send; only failures to obtain a response
/// at all are errors.
pub trait Transport: Send + Sync {
    /// Send `request` and read the whole response.
    ///
    /// # Errors
    /// Returns a [`TransportError`] when no response was received.
    fn send(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        (**self).send(request)
    }
}
