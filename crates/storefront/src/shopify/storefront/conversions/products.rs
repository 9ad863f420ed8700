//! Product type conversion functions.

use crate::shopify::types::{PriceRange, Product, ProductId};

use super::super::queries::fields::{Connection, ProductFields};
use super::cart::{convert_image, convert_money};

fn convert_product(p: ProductFields) -> Product {
    Product {
        id: ProductId::new(p.id),
        handle: p.handle,
        title: p.title,
        available_for_sale: p.available_for_sale,
        featured_image: p.featured_image.map(convert_image),
        price_range: PriceRange {
            min_variant_price: convert_money(p.price_range.min_variant_price),
            max_variant_price: convert_money(p.price_range.max_variant_price),
        },
    }
}

/// Flatten a product connection, preserving API order.
pub fn convert_product_connection(connection: Connection<ProductFields>) -> Vec<Product> {
    connection
        .edges
        .into_iter()
        .map(|edge| convert_product(edge.node))
        .collect()
}
