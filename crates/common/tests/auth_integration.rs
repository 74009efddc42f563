//! Integration tests for auth module
//!
//! Exercises the token manager against the file-backed credential store and
//! a scripted token endpoint.

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use amocrm_common::auth::{
    CredentialStore, FileCredentialStore, GrantParams, TokenManager, TokenResponse,
};
use amocrm_common::testing::{expired_record, fresh_record, token_response, MockTokenEndpoint};
use amocrm_domain::{AmoError, ClientConfig, GrantPolicy};
use tempfile::TempDir;

fn config(dir: &TempDir) -> ClientConfig {
    ClientConfig::new(
        "https://example.amocrm.ru",
        "client-id",
        "client-secret",
        "auth-code",
        "https://example.com/callback",
    )
    .with_credentials_path(dir.path().join("tmp").join("credentials.json"))
}

fn manager_for(
    config: &ClientConfig,
    endpoint: Arc<MockTokenEndpoint>,
) -> TokenManager<Arc<MockTokenEndpoint>, FileCredentialStore> {
    TokenManager::new(
        endpoint,
        FileCredentialStore::new(&config.credentials_path),
        config.identity(),
        config.grant_policy,
    )
}

/// First use against an empty directory authorizes with the code grant and
/// persists the record under the client secret.
#[test]
fn test_first_authorization_persists_record() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let endpoint = Arc::new(MockTokenEndpoint::new());
    endpoint.push_response(token_response("access-1", "refresh-1", 86_400));
    let manager = manager_for(&config, endpoint.clone());

    let token = manager.ensure_valid_token().unwrap();

    assert_eq!(token.access_token, "access-1");
    assert_eq!(endpoint.calls()[0].grant_type(), "authorization_code");

    // A fresh store instance sees the same record
    let reopened = FileCredentialStore::new(&config.credentials_path);
    assert_eq!(reopened.get("client-secret").unwrap(), Some(token));
}

/// A record persisted by a previous process is reused without a network
/// round-trip.
#[test]
fn test_fresh_record_survives_restart() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    FileCredentialStore::new(&config.credentials_path)
        .put("client-secret", &fresh_record("persisted", "persisted-refresh"))
        .unwrap();

    let endpoint = Arc::new(MockTokenEndpoint::new());
    let manager = manager_for(&config, endpoint.clone());

    assert_eq!(manager.ensure_valid_token().unwrap().access_token, "persisted");
    assert_eq!(manager.ensure_valid_token().unwrap().access_token, "persisted");
    assert_eq!(endpoint.call_count(), 0);
}

/// An expiring record is refreshed with its stored refresh token and
/// replaced wholesale.
#[test]
fn test_expired_record_is_refreshed_and_replaced() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let store = FileCredentialStore::new(&config.credentials_path);
    store.put("client-secret", &expired_record("old", "old-refresh")).unwrap();

    let endpoint = Arc::new(MockTokenEndpoint::new());
    endpoint.push_response(token_response("new", "new-refresh", 86_400));
    let manager = manager_for(&config, endpoint.clone());

    let token = manager.ensure_valid_token().unwrap();

    match &endpoint.calls()[0] {
        GrantParams::RefreshToken { refresh_token, .. } => assert_eq!(refresh_token, "old-refresh"),
        other => panic!("expected refresh grant, got {other:?}"),
    }
    let stored = store.get("client-secret").unwrap().unwrap();
    assert_eq!(stored, token);
    assert_eq!(stored.refresh_token, "new-refresh");
}

/// A token response without a refresh token fails and leaves the credential
/// file byte-for-byte unchanged.
#[test]
fn test_incomplete_response_leaves_file_unchanged() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let store = FileCredentialStore::new(&config.credentials_path);
    store.put("client-secret", &expired_record("old", "old-refresh")).unwrap();
    let before = std::fs::read(&config.credentials_path).unwrap();

    let endpoint = Arc::new(MockTokenEndpoint::new());
    endpoint.push_response(TokenResponse {
        access_token: Some("new".to_string()),
        refresh_token: None,
        expires_in: Some(86_400),
        token_type: None,
    });
    let manager = manager_for(&config, endpoint);

    let err = manager.ensure_valid_token().unwrap_err();

    assert_eq!(err, AmoError::AuthResponseIncomplete { missing: "refresh_token" });
    assert_eq!(std::fs::read(&config.credentials_path).unwrap(), before);
}

/// Records for other client secrets in the same file are preserved.
#[test]
fn test_other_clients_are_preserved() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let store = FileCredentialStore::new(&config.credentials_path);
    let other = fresh_record("other-access", "other-refresh");
    store.put("other-secret", &other).unwrap();

    let endpoint = Arc::new(MockTokenEndpoint::new());
    endpoint.push_response(token_response("mine", "mine-refresh", 86_400));
    manager_for(&config, endpoint).ensure_valid_token().unwrap();

    assert_eq!(store.get("other-secret").unwrap(), Some(other));
    assert_eq!(store.load_all().unwrap().len(), 2);
}

/// Under the reauthorize policy an expired record is replaced through the
/// authorization code grant.
#[test]
fn test_reauthorize_policy_uses_code_grant() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir).with_grant_policy(GrantPolicy::ReauthorizeWhenExpired);
    FileCredentialStore::new(&config.credentials_path)
        .put("client-secret", &expired_record("old", "old-refresh"))
        .unwrap();

    let endpoint = Arc::new(MockTokenEndpoint::new());
    endpoint.push_response(token_response("new", "new-refresh", 86_400));
    manager_for(&config, endpoint.clone()).ensure_valid_token().unwrap();

    assert!(!endpoint.calls()[0].is_refresh());
}

/// Concurrent callers sharing one manager cause a single token round-trip.
#[test]
fn test_concurrent_callers_share_one_authorization() {
    const THREADS: usize = 8;

    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let endpoint = Arc::new(MockTokenEndpoint::new().with_delay(Duration::from_millis(50)));
    endpoint.push_response(token_response("shared", "shared-refresh", 86_400));
    let manager = Arc::new(manager_for(&config, endpoint.clone()));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let manager = Arc::clone(&manager);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                manager.ensure_valid_token().map(|token| token.access_token)
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), "shared");
    }
    assert_eq!(endpoint.call_count(), 1);
}
