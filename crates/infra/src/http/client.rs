use std::time::Duration;

use amocrm_domain::constants::DEFAULT_TIMEOUT_SECS;
use amocrm_domain::{AmoError, Result, TransportError, TransportErrorKind};
use reqwest::blocking::Client as ReqwestClient;
use tracing::debug;
use url::Url;

use super::transport::{HttpRequest, HttpResponse, Transport};

/// Blocking HTTP client backed by `reqwest`.
///
/// Sends each request exactly once; retrying on another host is the job of
/// [`HostFailover`](super::HostFailover).
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }
}

impl Transport for HttpClient {
    fn send(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        let method = &request.method;
        let url = &request.url;
        debug!(%method, url = %url.as_str(), "sending HTTP request");

        let mut builder =
            self.client.request(request.method.clone(), url.clone()).headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().map_err(|err| {
            debug!(%method, url = %url.as_str(), error = %err, "HTTP request failed");
            map_reqwest_error(&err, url)
        })?;

        let status = response.status();
        let body = response.bytes().map_err(|err| map_reqwest_error(&err, url))?;
        debug!(%method, url = %url.as_str(), %status, bytes = body.len(), "received HTTP response");

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: None,
            default_headers: None,
        }
    }
}

impl HttpClientBuilder {
    /// Total per-request timeout (connect and read).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| concat!("amocrm-client/", env!("CARGO_PKG_VERSION")).to_string());

        let mut builder = ReqwestClient::builder()
            .timeout(self.timeout)
            .connect_timeout(self.timeout)
            .user_agent(user_agent)
            .no_proxy();

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder
            .build()
            .map_err(|err| AmoError::Config(format!("failed to build HTTP client: {err}")))?;

        Ok(HttpClient { client })
    }
}

/// Only connect and timeout failures are eligible for host failover.
fn map_reqwest_error(err: &reqwest::Error, url: &Url) -> TransportError {
    let kind = if err.is_timeout() {
        TransportErrorKind::Timeout
    } else if err.is_connect() {
        TransportErrorKind::Connect
    } else {
        TransportErrorKind::Other
    };

    TransportError::new(kind, url.as_str(), err.to_string())
}
