//! Serialization utilities for token payloads
//!
//! Token endpoints are not consistent about numeric fields: some send
//! `"expires_in": 86400`, others `"expires_in": "86400"`. The helpers here
//! accept both.

use serde::{Deserialize, Deserializer};

/// Optional seconds value that may arrive as a JSON number or numeric string.
///
/// # Usage
/// ```rust
/// use amocrm_common::utils::lenient_seconds;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Example {
///     #[serde(default, deserialize_with = "lenient_seconds::deserialize")]
///     expires_in: Option<i64>,
/// }
///
/// let parsed: Example = serde_json::from_str(r#"{"expires_in":"60"}"#).unwrap();
/// assert_eq!(parsed.expires_in, Some(60));
/// ```
pub mod lenient_seconds {
    use super::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    /// Deserialize a number, numeric string or `null` into `Option<i64>`.
    ///
    /// Unparseable strings become `None`, matching how the token endpoint's
    /// missing `expires_in` is treated.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Raw>::deserialize(deserializer)?;
        Ok(raw.and_then(|value| match value {
            Raw::Int(n) => Some(n),
            #[allow(clippy::cast_possible_truncation)]
            Raw::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            Raw::Float(_) => None,
            Raw::Text(s) => s.trim().parse::<i64>().ok(),
        }))
    }
}
