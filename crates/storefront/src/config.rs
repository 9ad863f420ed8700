//! Storefront API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPIFY_STORE` - Shopify store domain (e.g., your-store.myshopify.com)
//! - `SHOPIFY_STOREFRONT_PUBLIC_TOKEN` - Storefront API public access token
//!
//! The names `NEXT_PUBLIC_SHOPIFY_SHOP` and
//! `NEXT_PUBLIC_SHOPIFY_STOREFRONT_ACCESS_TOKEN` are accepted as fallbacks so
//! existing `.env` files keep working.
//!
//! ## Optional
//! - `SHOPIFY_API_VERSION` - API version (default: 2024-01)

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

/// Default Storefront API version.
pub const DEFAULT_API_VERSION: &str = "2024-01";

const STORE_VARS: &[&str] = &["SHOPIFY_STORE", "NEXT_PUBLIC_SHOPIFY_SHOP"];
const TOKEN_VARS: &[&str] = &[
    "SHOPIFY_STOREFRONT_PUBLIC_TOKEN",
    "NEXT_PUBLIC_SHOPIFY_STOREFRONT_ACCESS_TOKEN",
];
const API_VERSION_VAR: &str = "SHOPIFY_API_VERSION";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Shopify Storefront API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct ShopifyStorefrontConfig {
    /// Shopify store domain (e.g., your-store.myshopify.com)
    pub store: String,
    /// Shopify API version (e.g., 2024-01)
    pub api_version: String,
    /// Storefront API public access token
    pub storefront_public_token: SecretString,
}

impl std::fmt::Debug for ShopifyStorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyStorefrontConfig")
            .field("store", &self.store)
            .field("api_version", &self.api_version)
            .field("storefront_public_token", &"[REDACTED]")
            .finish()
    }
}

impl ShopifyStorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the store domain or access token is missing,
    /// or if either fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let store = first_present(&lookup, STORE_VARS)?;
        let store = normalize_store_domain(&store);
        let token = first_present(&lookup, TOKEN_VARS)?;
        validate_token(&token, TOKEN_VARS[0])?;
        let api_version = lookup(API_VERSION_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        let config = Self {
            store,
            api_version,
            storefront_public_token: SecretString::from(token),
        };

        // Fail at load time rather than on the first request
        config.endpoint()?;

        Ok(config)
    }

    /// The GraphQL endpoint for this store and API version.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the store domain does not form a valid URL.
    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        let raw = format!(
            "https://{}/api/{}/graphql.json",
            self.store, self.api_version
        );
        let url = Url::parse(&raw)
            .map_err(|e| ConfigError::InvalidEnvVar(STORE_VARS[0].to_string(), e.to_string()))?;

        if url.host_str().is_none_or(str::is_empty) {
            return Err(ConfigError::InvalidEnvVar(
                STORE_VARS[0].to_string(),
                "store domain has no host".to_string(),
            ));
        }

        Ok(url)
    }

    /// Expose the access token for the request header.
    #[must_use]
    pub fn access_token(&self) -> &str {
        self.storefront_public_token.expose_secret()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Return the first non-empty value among `keys`.
///
/// Reports the preferred (first) key name when none is set.
fn first_present(
    lookup: &impl Fn(&str) -> Option<String>,
    keys: &[&str],
) -> Result<String, ConfigError> {
    keys.iter()
        .filter_map(|key| lookup(key))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(keys.first().copied().unwrap_or("").to_string()))
}

/// Strip a scheme and trailing slashes so both `shop.myshopify.com` and
/// `https://shop.myshopify.com/` are accepted.
fn normalize_store_domain(store: &str) -> String {
    store
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/')
        .to_string()
}

/// Validate that a token is not a placeholder value.
fn validate_token(token: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = token.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    if token.chars().any(char::is_whitespace) {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "must not contain whitespace".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const TOKEN: &str = "3f9a1c0e7b2d4a6f8e1b3c5d7f9a0b2c";

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_loads_primary_names() {
        let config = ShopifyStorefrontConfig::from_lookup(lookup_from(&[
            ("SHOPIFY_STORE", "test.myshopify.com"),
            ("SHOPIFY_STOREFRONT_PUBLIC_TOKEN", TOKEN),
        ]))
        .unwrap();

        assert_eq!(config.store, "test.myshopify.com");
        assert_eq!(config.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.access_token(), TOKEN);
        assert_eq!(
            config.endpoint().unwrap().as_str(),
            "https://test.myshopify.com/api/2024-01/graphql.json"
        );
    }

    #[test]
    fn test_loads_legacy_names() {
        let config = ShopifyStorefrontConfig::from_lookup(lookup_from(&[
            ("NEXT_PUBLIC_SHOPIFY_SHOP", "https://legacy.myshopify.com/"),
            ("NEXT_PUBLIC_SHOPIFY_STOREFRONT_ACCESS_TOKEN", TOKEN),
            ("SHOPIFY_API_VERSION", "2025-04"),
        ]))
        .unwrap();

        assert_eq!(config.store, "legacy.myshopify.com");
        assert_eq!(config.api_version, "2025-04");
    }

    #[test]
    fn test_missing_store() {
        let err = ShopifyStorefrontConfig::from_lookup(lookup_from(&[(
            "SHOPIFY_STOREFRONT_PUBLIC_TOKEN",
            TOKEN,
        )]))
        .unwrap_err();

        assert_eq!(err, ConfigError::MissingEnvVar("SHOPIFY_STORE".to_string()));
    }

    #[test]
    fn test_empty_token_counts_as_missing() {
        let err = ShopifyStorefrontConfig::from_lookup(lookup_from(&[
            ("SHOPIFY_STORE", "test.myshopify.com"),
            ("SHOPIFY_STOREFRONT_PUBLIC_TOKEN", "   "),
        ]))
        .unwrap_err();

        assert_eq!(
            err,
            ConfigError::MissingEnvVar("SHOPIFY_STOREFRONT_PUBLIC_TOKEN".to_string())
        );
    }

    #[test]
    fn test_placeholder_token_rejected() {
        let err = ShopifyStorefrontConfig::from_lookup(lookup_from(&[
            ("SHOPIFY_STORE", "test.myshopify.com"),
            ("SHOPIFY_STOREFRONT_PUBLIC_TOKEN", "your-token-here"),
        ]))
        .unwrap_err();

        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_invalid_store_domain() {
        let err = ShopifyStorefrontConfig::from_lookup(lookup_from(&[
            ("SHOPIFY_STORE", "bad domain with spaces"),
            ("SHOPIFY_STOREFRONT_PUBLIC_TOKEN", TOKEN),
        ]))
        .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = ShopifyStorefrontConfig {
            store: "test.myshopify.com".to_string(),
            api_version: "2024-01".to_string(),
            storefront_public_token: SecretString::from("super_secret_token_value"),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("test.myshopify.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_token_value"));
    }
}
