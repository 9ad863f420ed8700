//! Cart commands.
//!
//! Each invocation is one "page load": the session starts uninitialized and
//! reads the cart ID from the store file.

use std::io::Write;
use std::path::Path;

use shopfront_core::{CartLineId, MerchandiseId};
use shopfront_storefront::shopify::Cart;
use shopfront_storefront::{
    Adjustment, CartSession, FileCartIdStore, HttpTransport, StorefrontClient,
};
use tracing::info;

use super::CommandError;

pub type Session = CartSession<HttpTransport, FileCartIdStore>;

/// Build a session over the environment's Storefront settings.
pub fn open_session(store_file: &Path) -> Session {
    CartSession::new(
        StorefrontClient::new(HttpTransport::from_env()),
        FileCartIdStore::new(store_file),
    )
}

pub async fn show(session: &Session) -> Result<(), CommandError> {
    let cart = session.refresh().await?;
    render(&cart)
}

pub async fn create(session: &Session) -> Result<(), CommandError> {
    let cart = session.create_cart().await?;
    render(&cart)
}

pub async fn add(session: &Session, variant: &str, quantity: i64) -> Result<(), CommandError> {
    let cart = session
        .add_to_cart(&MerchandiseId::new(variant), quantity)
        .await?;
    info!(variant, quantity, "Added to cart");
    render(&cart)
}

pub async fn update(session: &Session, line: &str, quantity: i64) -> Result<(), CommandError> {
    let cart = session
        .update_cart_line(&CartLineId::new(line), quantity)
        .await?;
    render(&cart)
}

pub async fn remove(session: &Session, lines: &[String]) -> Result<(), CommandError> {
    let line_ids: Vec<CartLineId> = lines.iter().map(|l| CartLineId::new(l.as_str())).collect();
    let cart = session.remove_from_cart(&line_ids).await?;
    render(&cart)
}

pub async fn adjust(
    session: &Session,
    variant: &str,
    adjustment: Adjustment,
) -> Result<(), CommandError> {
    let cart = session
        .adjust_line(&MerchandiseId::new(variant), adjustment)
        .await?;
    render(&cart)
}

pub async fn checkout(session: &Session) -> Result<(), CommandError> {
    session.refresh().await?;

    let url = session
        .checkout_url()
        .ok_or(CommandError::Unavailable("No cart to check out"))?;

    let mut out = std::io::stdout().lock();
    writeln!(out, "{url}")?;
    Ok(())
}

fn render(cart: &Cart) -> Result<(), CommandError> {
    let mut out = std::io::stdout().lock();

    let Some(id) = &cart.id else {
        writeln!(out, "Your cart is empty.")?;
        return Ok(());
    };

    writeln!(out, "Cart {id} ({} items)", cart.total_quantity)?;
    for line in &cart.lines {
        let merchandise = &line.merchandise;
        writeln!(
            out,
            "  {} x {} - {}  {}",
            line.quantity,
            merchandise.product.title,
            merchandise.title,
            line.cost.total_amount.display()
        )?;
        writeln!(out, "      line {}  variant {}", line.id, merchandise.id)?;
    }
    writeln!(out, "Subtotal: {}", cart.cost.subtotal.display())?;
    writeln!(out, "Tax:      {}", cart.cost.total_tax.display())?;
    writeln!(out, "Total:    {}", cart.cost.total.display())?;
    if let Some(url) = cart.checkout_url() {
        writeln!(out, "Checkout: {url}")?;
    }

    Ok(())
}
