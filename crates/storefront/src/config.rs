//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `PIZZERIA_API_BASE_URL` - Base URL of the remote API (default: `http://localhost:5757`)
//! - `PIZZERIA_STORAGE_PATH` - File used as durable storage (default: `.pizzeria/storage.json`)
//! - `PIZZERIA_HTTP_TIMEOUT_SECS` - Per-request timeout in seconds (default: 30)
//! - `PIZZERIA_ADMIN_EMAIL` - Account whose logins are always granted admin rights.
//!   Unset by default, in which case the server's `isAdmin` flag is authoritative.

use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use pizzeria_core::Email;
use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://localhost:5757/";
const DEFAULT_STORAGE_PATH: &str = ".pizzeria/storage.json";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL every API path is joined onto
    pub api_base_url: Url,
    /// Path of the durable storage file
    pub storage_path: PathBuf,
    /// Timeout applied to each HTTP request
    pub http_timeout: Duration,
    /// Email that is granted admin rights on login regardless of the server
    pub admin_override_email: Option<Email>,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            admin_override_email: None,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_base_url = match lookup("PIZZERIA_API_BASE_URL") {
            Some(raw) => parse_base_url(&raw).map_err(|e| {
                ConfigError::InvalidEnvVar("PIZZERIA_API_BASE_URL".to_string(), e.to_string())
            })?,
            None => default_api_base_url(),
        };

        let storage_path = lookup("PIZZERIA_STORAGE_PATH")
            .map_or_else(|| PathBuf::from(DEFAULT_STORAGE_PATH), PathBuf::from);

        let http_timeout = match lookup("PIZZERIA_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| {
                    ConfigError::InvalidEnvVar(
                        "PIZZERIA_HTTP_TIMEOUT_SECS".to_string(),
                        e.to_string(),
                    )
                })?,
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        let admin_override_email = lookup("PIZZERIA_ADMIN_EMAIL")
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| Email::parse(&raw))
            .transpose()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("PIZZERIA_ADMIN_EMAIL".to_string(), e.to_string())
            })?;

        Ok(Self {
            api_base_url,
            storage_path,
            http_timeout,
            admin_override_email,
        })
    }
}

/// Parse a base URL, making sure it ends with `/` so relative joins keep
/// any path prefix (`https://host/shop` + `api/pizzas`).
///
/// # Errors
///
/// Returns the underlying parse error for malformed input.
pub fn parse_base_url(raw: &str) -> Result<Url, url::ParseError> {
    let trimmed = raw.trim();
    if trimmed.ends_with('/') {
        Url::parse(trimmed)
    } else {
        Url::parse(&format!("{trimmed}/"))
    }
}

#[allow(clippy::expect_used)]
static DEFAULT_BASE: LazyLock<Url> =
    LazyLock::new(|| Url::parse(DEFAULT_API_BASE_URL).expect("default API base URL is valid"));

fn default_api_base_url() -> Url {
    DEFAULT_BASE.clone()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.api_base_url.as_str(), "http://localhost:5757/");
        assert_eq!(config.storage_path, PathBuf::from(".pizzeria/storage.json"));
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert!(config.admin_override_email.is_none());
    }

    #[test]
    fn test_default_base_url_matches_parsed_form() {
        let default = default_api_base_url();
        assert_eq!(default, parse_base_url("http://localhost:5757").unwrap());
        assert_eq!(
            default.join("api/pizzas").unwrap().as_str(),
            "http://localhost:5757/api/pizzas"
        );
    }

    #[test]
    fn test_overrides() {
        let config = StorefrontConfig::from_lookup(lookup_from(&[
            ("PIZZERIA_API_BASE_URL", "https://pizza.example.com/shop"),
            ("PIZZERIA_STORAGE_PATH", "/tmp/pizza.json"),
            ("PIZZERIA_HTTP_TIMEOUT_SECS", "5"),
            ("PIZZERIA_ADMIN_EMAIL", "owner@example.com"),
        ]))
        .unwrap();

        assert_eq!(
            config.api_base_url.join("api/pizzas").unwrap().as_str(),
            "https://pizza.example.com/shop/api/pizzas"
        );
        assert_eq!(config.storage_path, PathBuf::from("/tmp/pizza.json"));
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(
            config.admin_override_email.unwrap().as_str(),
            "owner@example.com"
        );
    }

    #[test]
    fn test_blank_admin_email_is_unset() {
        let config =
            StorefrontConfig::from_lookup(lookup_from(&[("PIZZERIA_ADMIN_EMAIL", "  ")])).unwrap();
        assert!(config.admin_override_email.is_none());
    }

    #[test]
    fn test_invalid_values() {
        let err = StorefrontConfig::from_lookup(lookup_from(&[(
            "PIZZERIA_HTTP_TIMEOUT_SECS",
            "soon",
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "PIZZERIA_HTTP_TIMEOUT_SECS"));

        let err =
            StorefrontConfig::from_lookup(lookup_from(&[("PIZZERIA_API_BASE_URL", "not a url")]))
                .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));

        let err =
            StorefrontConfig::from_lookup(lookup_from(&[("PIZZERIA_ADMIN_EMAIL", "nobody")]))
                .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }
}
