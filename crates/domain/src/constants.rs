//! Protocol constants
//!
//! Centralized location for the values the client and its configuration
//! defaults share.

/// Minimum remaining validity (seconds) a token must have to be used as-is.
pub const TOKEN_EXPIRY_MARGIN_SECS: i64 = 3600;

/// Default API prefix used by resource wrappers.
pub const DEFAULT_API_PATH: &str = "/private/api/v2/json/";

/// Default OAuth2 token endpoint, relative to the API endpoint.
pub const DEFAULT_AUTH_URL: &str = "/oauth2/access_token";

/// Default location of the persisted credential document.
pub const DEFAULT_CREDENTIALS_PATH: &str = "tmp/amocrm_credentials.json";

/// Default connect/read timeout for outbound requests.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Status codes treated as success by the response classifier.
pub const SUCCESS_STATUS_CODES: [u16; 2] = [200, 204];

// OAuth2 grant type identifiers
pub const GRANT_TYPE_AUTHORIZATION_CODE: &str = "authorization_code";
pub const GRANT_TYPE_REFRESH_TOKEN: &str = "refresh_token";
