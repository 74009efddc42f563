//! Error types used throughout the client

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classified HTTP failure returned by the amoCRM API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApiErrorKind {
    /// 301
    MovedPermanently,
    /// 400
    BadRequest,
    /// 401
    Unauthorized,
    /// 403
    Forbidden,
    /// 404
    NotFound,
    /// 500
    InternalError,
    /// 502
    BadGateway,
    /// 503
    ServiceUnavailable,
    /// Any status without a dedicated kind; the body is kept for diagnostics.
    Unknown,
}

impl ApiErrorKind {
    /// Stable label suitable for logging.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MovedPermanently => "moved_permanently",
            Self::BadRequest => "bad_request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::InternalError => "internal_error",
            Self::BadGateway => "bad_gateway",
            Self::ServiceUnavailable => "service_unavailable",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP-level error produced by the response classifier.
///
/// Carries the status code and the raw response body so callers can inspect
/// what the API actually said. Instances are built by the classifier in
/// `amocrm-infra`; nothing else in the workspace constructs them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("amoCRM API error {kind} (status {status_code})")]
pub struct ApiError {
    kind: ApiErrorKind,
    status_code: u16,
    body: String,
}

impl ApiError {
    /// Create a classified API error.
    #[must_use]
    pub fn new(kind: ApiErrorKind, status_code: u16, body: impl Into<String>) -> Self {
        Self { kind, status_code, body: body.into() }
    }

    #[must_use]
    pub const fn kind(&self) -> ApiErrorKind {
        self.kind
    }

    #[must_use]
    pub const fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Raw response body as returned by the server.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// `true` for statuses that have no dedicated kind.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.kind == ApiErrorKind::Unknown
    }
}

/// Category of a transport-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    /// Connection refused, unreachable host, DNS or TLS handshake failure.
    Connect,
    /// Connect or read timeout.
    Timeout,
    /// Request construction, redirect or body failures.
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => f.write_str("connect"),
            Self::Timeout => f.write_str("timeout"),
            Self::Other => f.write_str("transport"),
        }
    }
}

/// Failure to obtain any HTTP response at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} failure for {url}: {message}")]
pub struct TransportError {
    kind: TransportErrorKind,
    url: String,
    message: String,
}

impl TransportError {
    #[must_use]
    pub fn new(kind: TransportErrorKind, url: impl Into<String>, message: impl Into<String>) -> Self {
        Self { kind, url: url.into(), message: message.into() }
    }

    #[must_use]
    pub const fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    /// URL of the attempt that failed.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the host-failover layer may retry this failure on the mirror.
    #[must_use]
    pub const fn is_failover_eligible(&self) -> bool {
        matches!(self.kind, TransportErrorKind::Connect | TransportErrorKind::Timeout)
    }
}

/// Main error type for the amoCRM client
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmoError {
    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),

    #[error("Token endpoint response is missing `{missing}`")]
    AuthResponseIncomplete { missing: &'static str },

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Credential store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AmoError {
    /// Classified API error, if this is one.
    #[must_use]
    pub const fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }

    /// Stable label suitable for logging.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::AuthResponseIncomplete { .. } => "auth_response_incomplete",
            Self::Api(err) => err.kind.as_str(),
            Self::Store(_) => "store",
            Self::Config(_) => "config",
            Self::Serialization(_) => "serialization",
            Self::InvalidInput(_) => "invalid_input",
        }
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, AmoError>;
