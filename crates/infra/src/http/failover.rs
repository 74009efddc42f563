//! Host failover
//!
//! ```text
//! Sending(primary) ──ok──────────────────────────────► Delivered
//!        │
//!        └─ connect/timeout, target != mirror origin
//!               │
//!               ▼
//!        Sending(mirror) ──ok──► Delivered
//!               └──────err─────► Failed
//! ```
//!
//! HTTP error statuses are responses, not failures, and pass through.

use amocrm_domain::{AmoError, Result, TransportError};
use tracing::warn;
use url::Url;

use super::transport::{HttpRequest, HttpResponse, Transport};

/// Transport wrapper that retries once against a mirror host.
#[derive(Debug, Clone)]
pub struct HostFailover<T> {
    inner: T,
    mirror: Option<Url>,
}

impl<T: Transport> HostFailover<T> {
    /// Wrap `inner`. Without a mirror every request passes straight through.
    pub fn new(inner: T, mirror: Option<Url>) -> Self {
        Self { inner, mirror }
    }

    /// Wrap `inner`, parsing the mirror endpoint from configuration.
    ///
    /// # Errors
    /// Returns `AmoError::Config` when `mirror` is not an absolute URL.
    pub fn from_endpoint(inner: T, mirror: Option<&str>) -> Result<Self> {
        let mirror = mirror
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(|m| {
                Url::parse(m)
                    .map_err(|err| AmoError::Config(format!("invalid mirror endpoint {m}: {err}")))
            })
            .transpose()?;
        Ok(Self::new(inner, mirror))
    }

    #[must_use]
    pub fn mirror(&self) -> Option<&Url> {
        self.mirror.as_ref()
    }

    #[must_use]
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: Transport> Transport for HostFailover<T> {
    fn send(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        let err = match self.inner.send(request) {
            Ok(response) => return Ok(response),
            Err(err) => err,
        };

        let Some(mirror) = &self.mirror else {
            return Err(err);
        };
        if !err.is_failover_eligible() || same_origin(&request.url, mirror) {
            return Err(err);
        }
        let Some(target) = rewrite_origin(&request.url, mirror) else {
            return Err(err);
        };

        warn!(
            primary = %request.url.origin().ascii_serialization(),
            mirror = %mirror.origin().ascii_serialization(),
            error = %err,
            "primary host unreachable, retrying on mirror"
        );

        self.inner.send(&request.with_url(target))
    }
}

/// Scheme, host and port match.
#[must_use]
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}

/// `url` with its scheme, host and port taken from `mirror`.
///
/// Path, query and fragment are kept. Returns `None` when the scheme change
/// is not permitted (e.g. between special and non-special schemes).
#[must_use]
pub fn rewrite_origin(url: &Url, mirror: &Url) -> Option<Url> {
    let mut target = url.clone();
    target.set_scheme(mirror.scheme()).ok()?;
    target.set_host(mirror.host_str()).ok()?;
    target.set_port(mirror.port()).ok()?;
    Some(target)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use amocrm_domain::TransportErrorKind;
    use reqwest::StatusCode;

    use super::*;

    /// Fails for listed hosts, answers 200 for everything else.
    struct FakeTransport {
        failing: Vec<(String, TransportErrorKind)>,
        status: StatusCode,
        seen: Mutex<Vec<Url>>,
    }

    impl FakeTransport {
        fn new(failing: &[(&str, TransportErrorKind)]) -> Self {
            Self {
                failing: failing.iter().map(|(h, k)| ((*h).to_string(), *k)).collect(),
                status: StatusCode::OK,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn seen(&self) -> Vec<Url> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl Transport for FakeTransport {
        fn send(
            &self,
            request: &HttpRequest,
        ) -> std::result::Result<HttpResponse, TransportError> {
            self.seen.lock().unwrap().push(request.url.clone());
            let host = request.url.host_str().unwrap_or_default();
            match self.failing.iter().find(|(h, _)| h == host) {
                Some((_, kind)) => Err(TransportError::new(*kind, request.url.as_str(), "down")),
                None => Ok(HttpResponse::new(self.status, host.as_bytes().to_vec())),
            }
        }
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn failover(fake: FakeTransport, mirror: &str) -> HostFailover<FakeTransport> {
        HostFailover::new(fake, Some(url(mirror)))
    }

    #[test]
    fn connect_failure_moves_request_to_mirror() {
        let fake = FakeTransport::new(&[("primary.example", TransportErrorKind::Connect)]);
        let transport = failover(fake, "https://mirror.example");

        let response = transport
            .send(&HttpRequest::get(url("https://primary.example/api/v4/leads?page=2")))
            .unwrap();

        assert_eq!(response.body(), b"mirror.example");
        let seen = transport.inner().seen();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].as_str(), "https://mirror.example/api/v4/leads?page=2");
    }

    #[test]
    fn timeout_failure_moves_request_to_mirror() {
        let fake = FakeTransport::new(&[("primary.example", TransportErrorKind::Timeout)]);
        let transport = failover(fake, "https://mirror.example");

        assert!(transport.send(&HttpRequest::get(url("https://primary.example/x"))).is_ok());
        assert_eq!(transport.inner().seen().len(), 2);
    }

    #[test]
    fn mirror_failure_propagates_once() {
        let fake = FakeTransport::new(&[
            ("primary.example", TransportErrorKind::Connect),
            ("mirror.example", TransportErrorKind::Connect),
        ]);
        let transport = failover(fake, "https://mirror.example");

        let err = transport.send(&HttpRequest::get(url("https://primary.example/x"))).unwrap_err();

        assert!(err.url().starts_with("https://mirror.example"));
        assert_eq!(transport.inner().seen().len(), 2);
    }

    #[test]
    fn request_already_on_mirror_is_not_retried() {
        let fake = FakeTransport::new(&[("mirror.example", TransportErrorKind::Connect)]);
        let transport = failover(fake, "https://mirror.example");

        assert!(transport.send(&HttpRequest::get(url("https://mirror.example/x"))).is_err());
        assert_eq!(transport.inner().seen().len(), 1);
    }

    #[test]
    fn other_transport_errors_are_not_retried() {
        let fake = FakeTransport::new(&[("primary.example", TransportErrorKind::Other)]);
        let transport = failover(fake, "https://mirror.example");

        assert!(transport.send(&HttpRequest::get(url("https://primary.example/x"))).is_err());
        assert_eq!(transport.inner().seen().len(), 1);
    }

    #[test]
    fn error_statuses_pass_through() {
        let mut fake = FakeTransport::new(&[]);
        fake.status = StatusCode::INTERNAL_SERVER_ERROR;
        let transport = failover(fake, "https://mirror.example");

        let response = transport.send(&HttpRequest::get(url("https://primary.example/x"))).unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(transport.inner().seen().len(), 1);
    }

    #[test]
    fn without_mirror_is_pass_through() {
        let fake = FakeTransport::new(&[("primary.example", TransportErrorKind::Connect)]);
        let transport = HostFailover::from_endpoint(fake, None).unwrap();

        assert!(transport.send(&HttpRequest::get(url("https://primary.example/x"))).is_err());
        assert_eq!(transport.inner().seen().len(), 1);
    }

    #[test]
    fn origin_includes_port() {
        assert!(same_origin(&url("http://127.0.0.1:8080/a"), &url("http://127.0.0.1:8080/b")));
        assert!(!same_origin(&url("http://127.0.0.1:8080/a"), &url("http://127.0.0.1:9090/a")));
        assert!(same_origin(&url("https://example.com/a"), &url("https://example.com:443/b")));
    }

    #[test]
    fn rewrite_keeps_path_and_query() {
        let rewritten = rewrite_origin(
            &url("https://primary.example/oauth2/access_token?x=1"),
            &url("http://127.0.0.1:9000"),
        )
        .unwrap();

        assert_eq!(rewritten.as_str(), "http://127.0.0.1:9000/oauth2/access_token?x=1");
    }

    #[test]
    fn invalid_mirror_is_a_config_error() {
        let result = HostFailover::from_endpoint(FakeTransport::new(&[]), Some("not a url"));
        assert!(matches!(result, Err(AmoError::Config(_))));
    }
}
