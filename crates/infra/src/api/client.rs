//! amoCRM API client
//!
//! Dispatches GET/POST requests relative to the account endpoint, attaches
//! the stored bearer token and classifies every response. Token acquisition
//! is delegated to [`TokenManager`]; transport failures fail over to the
//! mirror host through [`HostFailover`].

use std::sync::Arc;
use std::time::Duration;

use amocrm_common::auth::{CredentialStore, FileCredentialStore, TokenManager, TokenRecord};
use amocrm_domain::{AmoError, ClientConfig, Result};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument};
use url::form_urlencoded::Serializer;
use url::{Url, UrlQuery};

use super::auth::{join_endpoint, TokenExchange};
use super::errors::classify;
use super::response::ApiResponse;
use crate::http::{HostFailover, HttpClient, HttpRequest, Transport};

/// Transport shared between API calls and the token exchange.
pub type SharedTransport = Arc<dyn Transport>;

/// Credential store behind a client.
pub type SharedStore = Arc<dyn CredentialStore>;

/// Token manager as wired by [`ApiClient`].
pub type ClientTokenManager = TokenManager<TokenExchange<SharedTransport>, SharedStore>;

/// Blocking amoCRM API client
///
/// `Send + Sync`; share it behind an `Arc` to let concurrent callers reuse
/// one token round-trip.
pub struct ApiClient {
    config: ClientConfig,
    transport: SharedTransport,
    tokens: ClientTokenManager,
}

impl ApiClient {
    /// Create a client with the default HTTP transport and a file-backed
    /// credential store at `config.credentials_path`.
    ///
    /// # Errors
    /// Returns `AmoError::Config` if the configuration is incomplete or the
    /// HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    fn from_parts(
        config: ClientConfig,
        transport: SharedTransport,
        store: SharedStore,
    ) -> Result<Self> {
        config.validate()?;
        Url::parse(&config.api_endpoint).map_err(|err| {
            AmoError::Config(format!("invalid api_endpoint {}: {err}", config.api_endpoint))
        })?;

        let transport: SharedTransport =
            Arc::new(HostFailover::from_endpoint(transport, config.mirror_endpoint.as_deref())?);
        let exchange =
            TokenExchange::new(Arc::clone(&transport), &config.api_endpoint, &config.auth_url)?;
        let tokens = TokenManager::new(exchange, store, config.identity(), config.grant_policy);

        Ok(Self { config, transport, tokens })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn token_manager(&self) -> &ClientTokenManager {
        &self.tokens
    }

    /// Path of `resource` under the configured API prefix.
    ///
    /// ```
    /// # use amocrm_domain::ClientConfig;
    /// # use amocrm_infra::api::ApiClient;
    /// let config =
    ///     ClientConfig::new("https://example.amocrm.ru", "id", "secret", "code", "https://cb");
    /// let client = ApiClient::new(config)?;
    /// assert_eq!(client.api_resource("accounts/current"), "/private/api/v2/json/accounts/current");
    /// # Ok::<(), amocrm_domain::AmoError>(())
    /// ```
    #[must_use]
    pub fn api_resource(&self, resource: &str) -> String {
        let prefix = self.config.api_path.trim_end_matches('/');
        let resource = resource.trim_start_matches('/');
        format!("{prefix}/{resource}")
    }

    /// Force a token round-trip and persist the result.
    ///
    /// # Errors
    /// Returns transport, API, store or `AuthResponseIncomplete` errors.
    pub fn authorize(&self) -> Result<TokenRecord> {
        self.tokens.authorize()
    }

    /// GET `path` with `params` as the query string.
    ///
    /// `params` must be a JSON object or `null`. Nested objects and arrays
    /// are encoded as `key[sub]=v` and `key[]=v`.
    ///
    /// The stored access token is attached when one exists; nothing is
    /// authorized here, see [`safe_request`](Self::safe_request).
    ///
    /// # Errors
    /// Returns `AmoError::InvalidInput` for unusable params, otherwise
    /// transport or classified API errors.
    #[instrument(skip(self, params), fields(path = %path))]
    pub fn get(&self, path: &str, params: &Value) -> Result<ApiResponse> {
        let token = self.tokens.current_access_token()?;
        self.send_get(path, params, token.as_deref())
    }

    /// POST `body` as JSON to `path`.
    ///
    /// # Errors
    /// Returns serialization, transport or classified API errors.
    #[instrument(skip(self, body), fields(path = %path))]
    pub fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        let token = self.tokens.current_access_token()?;
        self.send_post(path, body, token.as_deref())
    }

    /// Make sure a valid token exists, then dispatch.
    ///
    /// For `GET`, `params` is the query; for `POST`, the JSON body.
    ///
    /// # Errors
    /// Returns `AmoError::InvalidInput` for methods other than GET and POST,
    /// otherwise token, transport or classified API errors.
    #[instrument(skip(self, params), fields(method = %method, path = %path))]
    pub fn safe_request(&self, method: Method, path: &str, params: &Value) -> Result<ApiResponse> {
        if method != Method::GET && method != Method::POST {
            return Err(AmoError::InvalidInput(format!("unsupported method {method}")));
        }

        let token = self.tokens.ensure_valid_token()?;
        if method == Method::GET {
            self.send_get(path, params, Some(&token.access_token))
        } else {
            self.send_post(path, params, Some(&token.access_token))
        }
    }

    fn send_get(&self, path: &str, params: &Value, token: Option<&str>) -> Result<ApiResponse> {
        let mut url = self.url_for(path)?;
        append_query(&mut url, params)?;
        let request = with_bearer(HttpRequest::get(url), token)?;
        self.execute(&request)
    }

    fn send_post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<ApiResponse> {
        let url = self.url_for(path)?;
        let request = with_bearer(HttpRequest::post(url), token)?.json(body)?;
        self.execute(&request)
    }

    fn execute(&self, request: &HttpRequest) -> Result<ApiResponse> {
        debug!(method = %request.method, url = %request.url, "dispatching API request");

        let response = self.transport.send(request)?;
        let response = classify(response)?;

        info!(
            method = %request.method,
            status = response.status().as_u16(),
            "API request successful"
        );
        Ok(response)
    }

    fn url_for(&self, path: &str) -> Result<Url> {
        let raw = join_endpoint(&self.config.api_endpoint, path);
        Url::parse(&raw)
            .map_err(|err| AmoError::InvalidInput(format!("invalid request path {path}: {err}")))
    }
}

fn with_bearer(request: HttpRequest, token: Option<&str>) -> Result<HttpRequest> {
    match token.filter(|t| !t.is_empty()) {
        Some(token) => request.bearer_auth(token),
        None => Ok(request),
    }
}

/// Encode a JSON object as query pairs on `url`.
fn append_query(url: &mut Url, params: &Value) -> Result<()> {
    match params {
        Value::Null => Ok(()),
        Value::Object(map) if map.is_empty() => Ok(()),
        Value::Object(map) => {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in map {
                append_param(&mut pairs, key, value);
            }
            Ok(())
        }
        other => Err(AmoError::InvalidInput(format!(
            "query params must be a JSON object, got {}",
            json_type(other)
        ))),
    }
}

fn append_param(pairs: &mut Serializer<'_, UrlQuery<'_>>, key: &str, value: &Value) {
    match value {
        Value::Null => {}
        Value::String(s) => {
            pairs.append_pair(key, s);
        }
        Value::Bool(_) | Value::Number(_) => {
            pairs.append_pair(key, &value.to_string());
        }
        Value::Array(items) => {
            let key = format!("{key}[]");
            for item in items {
                append_param(pairs, &key, item);
            }
        }
        Value::Object(map) => {
            for (sub, item) in map {
                append_param(pairs, &format!("{key}[{sub}]"), item);
            }
        }
    }
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Builder for API client
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<ClientConfig>,
    store: Option<SharedStore>,
    transport: Option<SharedTransport>,
    user_agent: Option<String>,
}

impl ApiClientBuilder {
    /// Set the client configuration
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use `store` instead of the file store at `credentials_path`
    pub fn store(mut self, store: SharedStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Use `transport` instead of the default HTTP client.
    ///
    /// Mirror failover is layered on top either way.
    pub fn transport(mut self, transport: SharedTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the API client
    ///
    /// # Errors
    ///
    /// Returns `AmoError::Config` if the configuration is missing or invalid
    pub fn build(self) -> Result<ApiClient> {
        let config =
            self.config.ok_or_else(|| AmoError::Config("Client configuration not set".to_string()))?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let mut builder =
                    HttpClient::builder().timeout(Duration::from_secs(config.timeout_secs));
                if let Some(agent) = self.user_agent {
                    builder = builder.user_agent(agent);
                }
                Arc::new(builder.build()?)
            }
        };

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(FileCredentialStore::new(&config.credentials_path)));

        ApiClient::from_parts(config, transport, store)
    }
}
