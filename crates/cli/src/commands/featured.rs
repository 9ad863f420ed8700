//! Featured product slot commands.

use std::io::Write;

use shopfront_storefront::{FallbackChain, HttpTransport, StorefrontClient};

use super::CommandError;

/// Print the products a slot would render, or nothing.
pub async fn show(
    client: &StorefrontClient<HttpTransport>,
    chain: &FallbackChain,
) -> Result<(), CommandError> {
    let items = chain.resolve(client).await?;

    let mut out = std::io::stdout().lock();
    match items {
        Some(products) => {
            for product in products {
                writeln!(
                    out,
                    "{}  {}  {}",
                    product.handle,
                    product.title,
                    product.price_range.max_variant_price.display()
                )?;
            }
        }
        None => writeln!(out, "Not enough featured products; slot is hidden.")?,
    }

    Ok(())
}
