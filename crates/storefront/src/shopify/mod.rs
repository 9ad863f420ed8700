//! Shopify Storefront API client.
//!
//! # Architecture
//!
//! - Uses `graphql_client`'s request/response envelope for GraphQL operations
//! - Shopify is source of truth - NO local sync of catalog data, direct API calls
//! - HTTP goes through the [`Transport`] seam so tests can swap in a fake
//!   remote service
//!
//! # Example
//!
//! ```rust,ignore
//! use shopfront_storefront::shopify::{HttpTransport, StorefrontClient};
//!
//! let client = StorefrontClient::new(HttpTransport::new(&config));
//!
//! // Create a cart and add items
//! let cart = client.create_cart().await?;
//! let cart = client.add_to_cart(&cart_id, vec![CartLineInput {
//!     merchandise_id: MerchandiseId::new("gid://shopify/ProductVariant/1"),
//!     quantity: Quantity::ONE,
//! }]).await?;
//! ```

mod storefront;
pub mod transport;
pub mod types;

pub use storefront::StorefrontClient;
pub use storefront::queries;
pub use transport::{HttpTransport, Transport};
pub use types::*;

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur when interacting with Shopify APIs.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// Storefront API settings are missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request could not be delivered by a non-HTTP transport.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The API answered with a non-success status code.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Status code.
        status: u16,
        /// First part of the response body.
        body: String,
    },

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// User errors from a mutation (e.g., invalid input, insufficient inventory).
    #[error("User error: {}", format_user_errors(.0))]
    UserErrors(Vec<CartUserError>),
}

impl ShopifyError {
    /// Build a single-message GraphQL error.
    pub(crate) fn graphql_message(message: impl Into<String>) -> Self {
        Self::GraphQL(vec![GraphQLError {
            message: message.into(),
            locations: vec![],
            path: vec![],
        }])
    }

    /// Whether the request never produced a usable GraphQL response.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Http(_)
                | Self::Transport(_)
                | Self::Status { .. }
                | Self::Parse(_)
                | Self::RateLimited(_)
        )
    }

    /// The first message reported by the remote system, if any.
    #[must_use]
    pub fn first_message(&self) -> Option<&str> {
        match self {
            Self::GraphQL(errors) => errors
                .iter()
                .map(|e| e.message.as_str())
                .find(|m| !m.is_empty()),
            Self::UserErrors(errors) => errors.first().map(|e| e.message.as_str()),
            Self::NotFound(message) => Some(message),
            _ => None,
        }
    }
}

/// A GraphQL error returned by the Shopify API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut parts = Vec::new();

            if !e.message.is_empty() {
                parts.push(e.message.clone());
            }

            if !e.path.is_empty() {
                let path_str = e
                    .path
                    .iter()
                    .map(|p| match p {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                parts.push(format!("path: {path_str}"));
            }

            if let Some(loc) = e.locations.first() {
                parts.push(format!("at line {}:{}", loc.line, loc.column));
            }

            if parts.is_empty() {
                format!("[error {}]: (no details)", i + 1)
            } else {
                parts.join(" ")
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn format_user_errors(errors: &[CartUserError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .map(|e| match &e.field {
            Some(field) if !field.is_empty() => format!("{} ({})", e.message, field.join(".")),
            _ => e.message.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}
