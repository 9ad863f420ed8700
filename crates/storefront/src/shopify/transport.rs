//! HTTP transport for Storefront API requests.
//!
//! [`StorefrontClient`](super::StorefrontClient) builds GraphQL request bodies
//! and interprets responses; a [`Transport`] only moves bytes. Production uses
//! [`HttpTransport`] (reqwest 0.13); tests plug in an in-memory remote.

use std::future::Future;
use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};
use url::Url;

use super::ShopifyError;
use crate::config::{ConfigError, ShopifyStorefrontConfig};

/// Header carrying the public Storefront access token.
pub const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Storefront-Access-Token";

/// Moves a serialized GraphQL request to the Storefront API and returns the
/// raw response body.
pub trait Transport: Send + Sync {
    /// Report whether the transport has the settings it needs.
    ///
    /// # Errors
    ///
    /// Returns the `ConfigError` recorded when the transport was built.
    fn ensure_configured(&self) -> Result<(), ConfigError>;

    /// POST a GraphQL request body (`{"query", "variables", "operationName"}`).
    ///
    /// Implementations return the response text for any 2xx status and an
    /// error for everything else.
    fn post(
        &self,
        body: serde_json::Value,
    ) -> impl Future<Output = Result<String, ShopifyError>> + Send;
}

/// Storefront API transport over HTTPS.
///
/// Cheap to clone. A transport built without valid settings still exists but
/// fails every request with the recorded `ConfigError`.
#[derive(Clone)]
pub struct HttpTransport {
    inner: Arc<HttpTransportInner>,
}

struct HttpTransportInner {
    client: reqwest::Client,
    target: Result<Target, ConfigError>,
}

struct Target {
    endpoint: Url,
    access_token: SecretString,
}

impl HttpTransport {
    /// Create a transport for the configured store.
    #[must_use]
    pub fn new(config: &ShopifyStorefrontConfig) -> Self {
        let target = config.endpoint().map(|endpoint| Target {
            endpoint,
            access_token: config.storefront_public_token.clone(),
        });
        Self::with_target(target)
    }

    /// Create a transport that fails every request with `error`.
    #[must_use]
    pub fn unconfigured(error: ConfigError) -> Self {
        Self::with_target(Err(error))
    }

    /// Load settings from the environment.
    ///
    /// Missing settings do not fail here; they surface on first use.
    #[must_use]
    pub fn from_env() -> Self {
        match ShopifyStorefrontConfig::from_env() {
            Ok(config) => Self::new(&config),
            Err(e) => {
                warn!(error = %e, "Storefront API is not configured");
                Self::unconfigured(e)
            }
        }
    }

    fn with_target(target: Result<Target, ConfigError>) -> Self {
        Self {
            inner: Arc::new(HttpTransportInner {
                client: reqwest::Client::new(),
                target,
            }),
        }
    }

    /// The GraphQL endpoint, if configured.
    #[must_use]
    pub fn endpoint(&self) -> Option<&Url> {
        self.inner.target.as_ref().ok().map(|t| &t.endpoint)
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint().map(Url::as_str))
            .finish_non_exhaustive()
    }
}

impl Transport for HttpTransport {
    fn ensure_configured(&self) -> Result<(), ConfigError> {
        self.inner.target.as_ref().map(|_| ()).map_err(Clone::clone)
    }

    async fn post(&self, body: serde_json::Value) -> Result<String, ShopifyError> {
        let target = self.inner.target.as_ref().map_err(Clone::clone)?;

        debug!(endpoint = %target.endpoint, "Sending Storefront API request");

        let response = self
            .inner
            .client
            .post(target.endpoint.clone())
            .header(ACCESS_TOKEN_HEADER, target.access_token.expose_secret())
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Shopify API returned non-success status"
            );
            return Err(ShopifyError::Status {
                status: status.as_u16(),
                body: response_text.chars().take(200).collect(),
            });
        }

        Ok(response_text)
    }
}
