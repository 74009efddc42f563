//! Shared helpers for infra integration tests.

#![allow(dead_code)]

use std::net::TcpListener;
use std::path::Path;
use std::sync::Once;

use amocrm_domain::ClientConfig;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

pub const CLIENT_SECRET: &str = "client-secret";

/// Install a test-writer subscriber once per test binary.
///
/// Set `RUST_LOG=debug` to see client logs in failing tests.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// An `http://` endpoint on a port nothing listens on.
pub fn dead_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener); // release the port so that requests fail with ECONNREFUSED
    format!("http://{addr}")
}

/// Client configuration for `endpoint` with credentials under `dir`.
pub fn client_config(endpoint: &str, dir: &Path) -> ClientConfig {
    let mut config = ClientConfig::new(
        endpoint,
        "client-id",
        CLIENT_SECRET,
        "auth-code",
        "https://example.com/callback",
    )
    .with_credentials_path(dir.join("tmp").join("amocrm_credentials.json"));
    config.timeout_secs = 5;
    config
}

/// Token endpoint response body.
pub fn token_body(access_token: &str, refresh_token: &str) -> Value {
    json!({
        "token_type": "Bearer",
        "expires_in": 86400,
        "access_token": access_token,
        "refresh_token": refresh_token,
    })
}

/// Run blocking client code off the async test runtime.
pub async fn blocking<F, R>(f: F) -> R
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.expect("blocking task panicked")
}
