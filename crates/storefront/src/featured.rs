//! Featured product slots with ordered fallbacks.
//!
//! A slot prefers a curated collection and falls back to the general catalog.
//! Each [`FallbackChain`] tries its sources in order and stops once it holds
//! `min_items` usable products. A product is usable when it has a featured
//! image.

use tracing::{debug, warn};

use crate::config::ConfigError;
use crate::shopify::types::Product;
use crate::shopify::{ShopifyError, StorefrontClient, Transport};

/// Products requested per source unless a preset says otherwise.
pub const DEFAULT_SOURCE_LIMIT: i64 = 100;

/// Collection curated for the three-item homepage grid.
pub const HOMEPAGE_GRID_COLLECTION: &str = "hidden-homepage-featured-items";

/// Collection curated for the homepage carousel.
pub const HOMEPAGE_CAROUSEL_COLLECTION: &str = "hidden-homepage-carousel";

/// Where a slot can take products from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductSource {
    /// The first `limit` products of a collection.
    Collection { handle: String, limit: i64 },
    /// The first `limit` products of the catalog.
    AllProducts { limit: i64 },
}

impl ProductSource {
    #[must_use]
    pub fn collection(handle: impl Into<String>) -> Self {
        Self::Collection {
            handle: handle.into(),
            limit: DEFAULT_SOURCE_LIMIT,
        }
    }

    #[must_use]
    pub const fn all_products(limit: i64) -> Self {
        Self::AllProducts { limit }
    }

    async fn fetch<T: Transport>(
        &self,
        client: &StorefrontClient<T>,
    ) -> Result<Vec<Product>, ShopifyError> {
        match self {
            Self::Collection { handle, limit } => {
                client.get_collection_products(handle, *limit).await
            }
            Self::AllProducts { limit } => client.get_products(*limit).await,
        }
    }
}

impl std::fmt::Display for ProductSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Collection { handle, limit } => write!(f, "collection {handle} (first {limit})"),
            Self::AllProducts { limit } => write!(f, "all products (first {limit})"),
        }
    }
}

/// Ordered product sources with a stopping condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackChain {
    sources: Vec<ProductSource>,
    min_items: usize,
    max_items: usize,
}

impl FallbackChain {
    /// An empty chain. `max_items` is raised to `min_items` if lower.
    #[must_use]
    pub fn new(min_items: usize, max_items: usize) -> Self {
        Self {
            sources: Vec::new(),
            min_items,
            max_items: max_items.max(min_items),
        }
    }

    /// Append a source to try after the existing ones.
    #[must_use]
    pub fn then(mut self, source: ProductSource) -> Self {
        self.sources.push(source);
        self
    }

    /// Homepage grid: exactly three products.
    #[must_use]
    pub fn homepage_grid() -> Self {
        Self::new(3, 3)
            .then(ProductSource::collection(HOMEPAGE_GRID_COLLECTION))
            .then(ProductSource::all_products(DEFAULT_SOURCE_LIMIT))
    }

    /// Homepage carousel: the curated collection, else the first six products.
    #[must_use]
    pub fn homepage_carousel() -> Self {
        Self::new(1, usize::try_from(DEFAULT_SOURCE_LIMIT).unwrap_or(usize::MAX))
            .then(ProductSource::collection(HOMEPAGE_CAROUSEL_COLLECTION))
            .then(ProductSource::all_products(6))
    }

    #[must_use]
    pub fn sources(&self) -> &[ProductSource] {
        &self.sources
    }

    #[must_use]
    pub const fn min_items(&self) -> usize {
        self.min_items
    }

    #[must_use]
    pub const fn max_items(&self) -> usize {
        self.max_items
    }

    /// Collect products for the slot.
    ///
    /// Returns `Ok(None)` when the sources together yield fewer than
    /// `min_items` usable products. Sources that fail are skipped.
    ///
    /// # Errors
    ///
    /// Returns the `ConfigError` when the Storefront API is not configured.
    pub async fn resolve<T: Transport>(
        &self,
        client: &StorefrontClient<T>,
    ) -> Result<Option<Vec<Product>>, ConfigError> {
        client.ensure_configured()?;

        let mut items: Vec<Product> = Vec::new();

        for source in &self.sources {
            if items.len() >= self.min_items {
                break;
            }

            let products = match source.fetch(client).await {
                Ok(products) => products,
                Err(ShopifyError::Config(e)) => return Err(e),
                Err(e) => {
                    warn!(source = %source, error = %e, "Product source unavailable, trying next");
                    continue;
                }
            };

            let before = items.len();
            for product in products {
                if items.len() >= self.max_items {
                    break;
                }
                if product.has_featured_image() && !items.iter().any(|p| p.id == product.id) {
                    items.push(product);
                }
            }
            debug!(source = %source, added = items.len() - before, "Product source read");
        }

        if items.len() < self.min_items {
            debug!(
                found = items.len(),
                needed = self.min_items,
                "Not enough featured products"
            );
            return Ok(None);
        }

        Ok(Some(items))
    }
}
