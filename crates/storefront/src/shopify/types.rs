//! Domain types for Shopify Storefront API.
//!
//! These types are the flat view model handed to display code. They are kept
//! separate from the raw GraphQL response shapes in
//! [`queries`](super::queries), which nest cart lines inside edge/node
//! pagination wrappers.

use serde::{Deserialize, Serialize};

pub use shopfront_core::{
    CartId, CartLineId, DEFAULT_CURRENCY, MerchandiseId, Money, ProductId, Quantity,
};

// =============================================================================
// Image Types
// =============================================================================

/// Product or variant image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Image URL.
    pub url: String,
    /// Alt text for accessibility.
    pub alt_text: Option<String>,
    /// Image width in pixels.
    pub width: Option<i64>,
    /// Image height in pixels.
    pub height: Option<i64>,
}

// =============================================================================
// Product Types
// =============================================================================

/// Selected option on a product variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    /// Option name (e.g., "Size", "Color").
    pub name: String,
    /// Selected value (e.g., "Large", "Blue").
    pub value: String,
}

/// Price range for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    /// Minimum price among all variants.
    pub min_variant_price: Money,
    /// Maximum price among all variants.
    pub max_variant_price: Money,
}

/// A product as shown on listing tiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// URL handle.
    pub handle: String,
    /// Product title.
    pub title: String,
    /// Whether any variant is available.
    pub available_for_sale: bool,
    /// Featured image.
    pub featured_image: Option<Image>,
    /// Price range across variants.
    pub price_range: PriceRange,
}

impl Product {
    /// Whether the product has a featured image with a non-empty URL.
    ///
    /// Listing tiles cannot render without one.
    #[must_use]
    pub fn has_featured_image(&self) -> bool {
        self.featured_image
            .as_ref()
            .is_some_and(|img| !img.url.trim().is_empty())
    }
}

// =============================================================================
// Cart Types
// =============================================================================

/// Simplified product info for cart merchandise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartMerchandiseProduct {
    /// Product ID.
    pub id: ProductId,
    /// Product handle.
    pub handle: String,
    /// Product title.
    pub title: String,
    /// Featured image.
    pub featured_image: Option<Image>,
}

/// Merchandise in a cart line (the purchasable variant).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartMerchandise {
    /// Variant ID.
    pub id: MerchandiseId,
    /// Variant title.
    pub title: String,
    /// Selected options.
    pub selected_options: Vec<SelectedOption>,
    /// Parent product info.
    pub product: CartMerchandiseProduct,
}

/// Cost for a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineCost {
    /// Line total.
    pub total_amount: Money,
}

/// A line item in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Cart line ID, needed to update or remove the line.
    pub id: CartLineId,
    /// Quantity (never zero).
    pub quantity: Quantity,
    /// Line cost.
    pub cost: CartLineCost,
    /// Product variant.
    pub merchandise: CartMerchandise,
}

/// Cart cost summary.
///
/// Tax is always present: carts without a reported tax carry a zero amount
/// in the total's currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartCost {
    /// Subtotal before tax/shipping.
    #[serde(rename = "subtotal_amount")]
    pub subtotal: Money,
    /// Total amount.
    #[serde(rename = "total_amount")]
    pub total: Money,
    /// Total tax amount.
    #[serde(rename = "total_tax_amount")]
    pub total_tax: Money,
}

/// A shopping cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Cart ID. `None` for the local placeholder cart.
    pub id: Option<CartId>,
    /// Hosted checkout URL. Empty for the placeholder cart.
    pub checkout_url: String,
    /// Total item quantity, equal to the sum of line quantities.
    pub total_quantity: u32,
    /// Cart lines in API order.
    pub lines: Vec<CartLine>,
    /// Cart cost summary.
    pub cost: CartCost,
}

impl Cart {
    /// The empty cart shown before any remote cart exists.
    #[must_use]
    pub fn placeholder() -> Self {
        let zero = || Money::new("0", DEFAULT_CURRENCY);
        Self {
            id: None,
            checkout_url: String::new(),
            total_quantity: 0,
            lines: Vec::new(),
            cost: CartCost {
                subtotal: zero(),
                total: zero(),
                total_tax: zero(),
            },
        }
    }

    /// Whether this is the local placeholder (no remote cart behind it).
    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        self.id.is_none()
    }

    /// Find a line by its ID.
    #[must_use]
    pub fn line(&self, line_id: &CartLineId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.id == line_id)
    }

    /// Find the line holding the given variant.
    #[must_use]
    pub fn line_for_merchandise(&self, merchandise_id: &MerchandiseId) -> Option<&CartLine> {
        self.lines
            .iter()
            .find(|line| &line.merchandise.id == merchandise_id)
    }

    /// Sum of line quantities.
    #[must_use]
    pub fn lines_quantity(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |acc, line| acc.saturating_add(line.quantity.get()))
    }

    /// The checkout URL, if this cart exists remotely.
    #[must_use]
    pub fn checkout_url(&self) -> Option<&str> {
        Some(self.checkout_url.as_str()).filter(|url| !url.is_empty())
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::placeholder()
    }
}

/// Input for adding a line to cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    /// Product variant ID.
    pub merchandise_id: MerchandiseId,
    /// Quantity to add.
    pub quantity: Quantity,
}

/// Input for updating a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineUpdateInput {
    /// Cart line ID.
    pub id: CartLineId,
    /// New quantity.
    pub quantity: Quantity,
}

/// User error from cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartUserError {
    /// Error code.
    pub code: Option<String>,
    /// Field path that caused the error.
    pub field: Option<Vec<String>>,
    /// Human-readable error message.
    pub message: String,
}
