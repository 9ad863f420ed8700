//! Type conversion functions for Shopify Storefront API responses.

pub mod cart;
pub mod products;

pub use cart::{convert_cart, convert_user_errors};
pub use products::convert_product_connection;
