//! Orderflow configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TABLESIDE_BACKEND_URL` - Base URL of the ordering backend
//! - `TABLESIDE_PROVIDER_KEY` - Payment provider publishable key
//!
//! ## Optional
//! - `TABLESIDE_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
//! - `TABLESIDE_CURRENCY` - ISO 4217 display currency (default: USD)

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use tableside_core::CurrencyCode;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Orderflow configuration.
///
/// Implements `Debug` manually to redact the provider key.
#[derive(Clone)]
pub struct OrderflowConfig {
    /// Base URL of the ordering backend (orders, payments, email).
    pub backend_url: Url,
    /// Payment provider publishable key, handed to the provider widget.
    pub provider_key: SecretString,
    /// Timeout applied to every backend request.
    pub http_timeout: Duration,
    /// Display currency for formatted amounts.
    pub currency: CurrencyCode,
}

impl std::fmt::Debug for OrderflowConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderflowConfig")
            .field("backend_url", &self.backend_url.as_str())
            .field("provider_key", &"[REDACTED]")
            .field("http_timeout", &self.http_timeout)
            .field("currency", &self.currency)
            .finish()
    }
}

impl OrderflowConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let backend_url = parse_backend_url(&get_required_env("TABLESIDE_BACKEND_URL")?)?;
        let provider_key = SecretString::from(get_required_env("TABLESIDE_PROVIDER_KEY")?);

        let timeout_secs = get_env_or_default(
            "TABLESIDE_HTTP_TIMEOUT_SECS",
            &DEFAULT_HTTP_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("TABLESIDE_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        let currency_code = get_env_or_default("TABLESIDE_CURRENCY", "USD");
        let currency = CurrencyCode::from_code(&currency_code).ok_or_else(|| {
            ConfigError::InvalidEnvVar(
                "TABLESIDE_CURRENCY".to_string(),
                format!("unsupported currency code: {currency_code}"),
            )
        })?;

        Ok(Self {
            backend_url,
            provider_key,
            http_timeout: Duration::from_secs(timeout_secs),
            currency,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse and sanity-check the backend base URL.
fn parse_backend_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar("TABLESIDE_BACKEND_URL".to_string(), e.to_string()))?;

    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            "TABLESIDE_BACKEND_URL".to_string(),
            "URL cannot be used as a base".to_string(),
        ));
    }

    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend_url_accepts_http_base() {
        let url = parse_backend_url("http://localhost:3000").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/");
    }

    #[test]
    fn test_parse_backend_url_rejects_non_base() {
        assert!(parse_backend_url("mailto:orders@example.com").is_err());
        assert!(parse_backend_url("not a url").is_err());
    }

    #[test]
    fn test_debug_redacts_provider_key() {
        let config = OrderflowConfig {
            backend_url: Url::parse("http://localhost:3000").unwrap(),
            provider_key: SecretString::from("rzp_test_abc123".to_string()),
            http_timeout: Duration::from_secs(30),
            currency: CurrencyCode::USD,
        };

        let rendered = format!("{config:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("rzp_test_abc123"));
    }
}
