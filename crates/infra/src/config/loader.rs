//! Configuration loader
//!
//! Loads the client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! Required:
//! - `AMOCRM_API_ENDPOINT`: Account endpoint, e.g. `https://example.amocrm.ru`
//! - `AMOCRM_CLIENT_ID`: Integration ID
//! - `AMOCRM_CLIENT_SECRET`: Integration secret
//! - `AMOCRM_CODE`: Authorization code
//! - `AMOCRM_REDIRECT_URI`: Redirect URI registered for the integration
//!
//! Optional:
//! - `AMOCRM_API_PATH`: API prefix for resource paths
//! - `AMOCRM_AUTH_URL`: Token endpoint path
//! - `AMOCRM_MIRROR_ENDPOINT`: Failover host
//! - `AMOCRM_CREDENTIALS_PATH`: Credential document location
//! - `AMOCRM_TIMEOUT_SECS`: Request timeout in seconds
//! - `AMOCRM_GRANT_POLICY`: `refresh_when_expired` or `reauthorize_when_expired`
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./amocrm.json` or `./amocrm.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. `../amocrm.json` or `../amocrm.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};

use amocrm_domain::{AmoError, ClientConfig, GrantPolicy, Result};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `AmoError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<ClientConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// All required environment variables must be present.
///
/// # Errors
/// Returns `AmoError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<ClientConfig> {
    let mut config = ClientConfig::new(
        env_var("AMOCRM_API_ENDPOINT")?,
        env_var("AMOCRM_CLIENT_ID")?,
        env_var("AMOCRM_CLIENT_SECRET")?,
        env_var("AMOCRM_CODE")?,
        env_var("AMOCRM_REDIRECT_URI")?,
    );

    if let Some(api_path) = env_opt("AMOCRM_API_PATH") {
        config.api_path = api_path;
    }
    if let Some(auth_url) = env_opt("AMOCRM_AUTH_URL") {
        config.auth_url = auth_url;
    }
    config.mirror_endpoint = env_opt("AMOCRM_MIRROR_ENDPOINT");
    if let Some(path) = env_opt("AMOCRM_CREDENTIALS_PATH") {
        config.credentials_path = PathBuf::from(path);
    }
    if let Some(timeout) = env_opt("AMOCRM_TIMEOUT_SECS") {
        config.timeout_secs = timeout
            .parse::<u64>()
            .map_err(|e| AmoError::Config(format!("Invalid timeout: {e}")))?;
    }
    if let Some(policy) = env_opt("AMOCRM_GRANT_POLICY") {
        config.grant_policy = policy.parse::<GrantPolicy>()?;
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `AmoError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(AmoError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            AmoError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| AmoError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `AmoError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| AmoError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| AmoError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(AmoError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    const NAMES: [&str; 4] = ["amocrm.json", "amocrm.toml", "config.json", "config.toml"];

    let mut dirs = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.clone());
        dirs.push(cwd.join(".."));
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `AmoError::Config` if the variable is not set or empty.
fn env_var(key: &str) -> Result<String> {
    env_opt(key)
        .ok_or_else(|| AmoError::Config(format!("Missing required environment variable: {key}")))
}

/// Optional environment variable; empty values count as unset.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
