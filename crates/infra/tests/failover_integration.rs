//! Host failover through the real HTTP client
//!
//! The primary endpoint is a local port with no listener, the mirror a
//! wiremock server on a different port.

mod support;

use amocrm_domain::{AmoError, TransportErrorKind};
use amocrm_infra::ApiClient;
use reqwest::Method;
use serde_json::{json, Value};
use support::{blocking, client_config, dead_endpoint, init_tracing, token_body};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_primary_fails_over_to_mirror() {
    init_tracing();
    let mirror = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/oauth2/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("mirror-access", "r")))
        .expect(1)
        .mount(&mirror)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v4/leads"))
        .and(query_param("page", "3"))
        .and(header("Authorization", "Bearer mirror-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"served_by": "mirror"})))
        .expect(1)
        .mount(&mirror)
        .await;

    let config = client_config(&dead_endpoint(), dir.path()).with_mirror(mirror.uri());
    let body = blocking(move || {
        let client = ApiClient::new(config).unwrap();
        client
            .safe_request(Method::GET, "/api/v4/leads", &json!({"page": 3}))
            .unwrap()
            .json::<Value>()
            .unwrap()
    })
    .await;

    assert_eq!(body["served_by"], "mirror");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_both_hosts_unreachable_surfaces_connect_error() {
    init_tracing();
    let dir = TempDir::new().unwrap();

    let mirror = dead_endpoint();
    let config = client_config(&dead_endpoint(), dir.path()).with_mirror(mirror.clone());
    let err = blocking(move || {
        ApiClient::new(config).unwrap().safe_request(Method::GET, "/leads", &Value::Null).unwrap_err()
    })
    .await;

    match err {
        AmoError::Transport(err) => {
            assert_eq!(err.kind(), TransportErrorKind::Connect);
            assert!(err.url().starts_with(&mirror), "last attempt was {}", err.url());
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_primary_without_mirror_fails() {
    init_tracing();
    let dir = TempDir::new().unwrap();

    let config = client_config(&dead_endpoint(), dir.path());
    let err = blocking(move || ApiClient::new(config).unwrap().authorize().unwrap_err()).await;

    assert!(matches!(err, AmoError::Transport(ref e) if e.kind() == TransportErrorKind::Connect));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_errors_do_not_fail_over() {
    init_tracing();
    let primary = MockServer::start().await;
    let mirror = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/leads"))
        .respond_with(ResponseTemplate::new(500).set_body_string("primary broke"))
        .expect(1)
        .mount(&primary)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mirror)
        .await;

    let config = client_config(&primary.uri(), dir.path()).with_mirror(mirror.uri());
    let err = blocking(move || {
        ApiClient::new(config).unwrap().get("/leads", &Value::Null).unwrap_err()
    })
    .await;

    let api = err.as_api_error().expect("classified error");
    assert_eq!(api.status_code(), 500);
    assert_eq!(api.body(), "primary broke");
}
