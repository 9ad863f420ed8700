//! Shopfront Storefront library.
//!
//! Talks to the Shopify Storefront API on behalf of a single shopper and keeps
//! their cart in sync with the remote cart resource.
//!
//! # Modules
//!
//! - [`config`] - Storefront API settings loaded from the environment
//! - [`shopify`] - GraphQL client, transport seam and domain types
//! - [`cart`] - Cart synchronization session and cart ID stores
//! - [`featured`] - Ordered product-source fallback chains for homepage slots

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod featured;
pub mod shopify;

pub use cart::{
    Adjustment, CartError, CartIdStore, CartSession, CartState, DetachedCartIdStore,
    FileCartIdStore, MemoryCartIdStore,
};
pub use config::{ConfigError, ShopifyStorefrontConfig};
pub use featured::{FallbackChain, ProductSource};
pub use shopify::{HttpTransport, ShopifyError, StorefrontClient, Transport};
