//! Client-side cart synchronization.
//!
//! [`CartSession`] maps the locally stored cart ID onto the remote cart and
//! keeps the last cart it saw. Reads degrade to "no cart"; writes surface
//! their failures so callers can roll back whatever they showed optimistically.
//!
//! # State machine
//!
//! ```text
//! Uninitialized ──get/create──▶ Syncing ──ok──▶ Ready
//!        │                         │ └──cart gone──▶ Stale ──▶ Empty
//!        └──get (no ID)──▶ Empty ◀─┘
//! ```

pub mod store;

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use shopfront_core::QuantityError;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::config::ConfigError;
use crate::shopify::types::{
    Cart, CartId, CartLineId, CartLineInput, CartLineUpdateInput, MerchandiseId, Quantity,
};
use crate::shopify::{HttpTransport, ShopifyError, StorefrontClient, Transport};

pub use store::{CartIdStore, DetachedCartIdStore, FileCartIdStore, MemoryCartIdStore};

/// Errors surfaced by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Storefront API settings are missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The request never produced a usable API response.
    #[error("Transport error: {0}")]
    Transport(#[source] ShopifyError),

    /// The API rejected the request. Carries the first reported message.
    #[error("Storefront API error: {0}")]
    RemoteApi(String),

    /// The operation needs an existing cart and none is stored.
    #[error("No cart exists for this session")]
    NoCart,

    /// The caller passed a structurally invalid value.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<ShopifyError> for CartError {
    fn from(err: ShopifyError) -> Self {
        match err {
            ShopifyError::Config(e) => Self::Configuration(e),
            e if e.is_transport() => Self::Transport(e),
            e => Self::RemoteApi(
                e.first_message()
                    .map_or_else(|| e.to_string(), str::to_string),
            ),
        }
    }
}

impl From<QuantityError> for CartError {
    fn from(err: QuantityError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

/// Where the session stands relative to the remote cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartState {
    /// Nothing read or written yet.
    Uninitialized,
    /// No stored cart ID; the placeholder cart is shown.
    Empty,
    /// An operation is in flight.
    Syncing,
    /// A cart ID is stored and the held cart reflects the last remote result.
    Ready,
    /// The remote cart went missing; its ID is being discarded.
    Stale,
}

impl CartState {
    /// Resting state implied by the held cart.
    fn settled(cart: Option<&Cart>) -> Self {
        match cart {
            None => Self::Uninitialized,
            Some(cart) if cart.is_placeholder() => Self::Empty,
            Some(_) => Self::Ready,
        }
    }
}

impl std::fmt::Display for CartState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Uninitialized => "uninitialized",
            Self::Empty => "empty",
            Self::Syncing => "syncing",
            Self::Ready => "ready",
            Self::Stale => "stale",
        };
        f.write_str(s)
    }
}

/// A relative change to one cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    /// One more unit.
    Increment,
    /// One unit fewer; removes the line at quantity one.
    Decrement,
    /// Drop the line.
    Remove,
}

#[derive(Debug)]
struct Held {
    state: CartState,
    cart: Option<Cart>,
}

/// One session's view of its cart.
///
/// Concurrent operations are not serialized: the last response to resolve
/// becomes the held cart.
#[derive(Debug)]
pub struct CartSession<T = HttpTransport, S = MemoryCartIdStore> {
    client: StorefrontClient<T>,
    store: S,
    held: Mutex<Held>,
}

impl<T: Transport, S: CartIdStore> CartSession<T, S> {
    #[must_use]
    pub const fn new(client: StorefrontClient<T>, store: S) -> Self {
        Self {
            client,
            store,
            held: Mutex::new(Held {
                state: CartState::Uninitialized,
                cart: None,
            }),
        }
    }

    #[must_use]
    pub const fn client(&self) -> &StorefrontClient<T> {
        &self.client
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> CartState {
        self.held().state
    }

    /// The last cart seen, or the placeholder.
    #[must_use]
    pub fn current(&self) -> Cart {
        self.held().cart.clone().unwrap_or_default()
    }

    /// Hosted checkout URL of the last cart seen.
    #[must_use]
    pub fn checkout_url(&self) -> Option<String> {
        self.held()
            .cart
            .as_ref()
            .and_then(Cart::checkout_url)
            .map(str::to_string)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Fetch the stored cart.
    ///
    /// Returns `Ok(None)` without a request when no cart ID is stored. When
    /// the remote cart cannot be read for any reason the stored ID is
    /// discarded and `Ok(None)` is returned.
    ///
    /// # Errors
    ///
    /// Only `CartError::Configuration`.
    #[instrument(skip(self))]
    pub async fn get_cart(&self) -> Result<Option<Cart>, CartError> {
        self.client.ensure_configured()?;

        let Some(cart_id) = self.store.get() else {
            self.settle(Cart::placeholder());
            return Ok(None);
        };

        self.transition(CartState::Syncing);

        match self.client.get_cart(&cart_id).await {
            Ok(cart) => {
                self.settle(cart.clone());
                Ok(Some(cart))
            }
            Err(ShopifyError::Config(e)) => {
                self.restore();
                Err(CartError::Configuration(e))
            }
            Err(e) => {
                warn!(cart_id = %cart_id, error = %e, "Stored cart is unavailable, discarding it");
                self.transition(CartState::Stale);
                self.store.clear();
                self.settle(Cart::placeholder());
                Ok(None)
            }
        }
    }

    /// Re-read the cart, falling back to the placeholder.
    ///
    /// # Errors
    ///
    /// Only `CartError::Configuration`.
    pub async fn refresh(&self) -> Result<Cart, CartError> {
        Ok(self.get_cart().await?.unwrap_or_default())
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Create a new remote cart and remember its ID.
    ///
    /// # Errors
    ///
    /// Returns `CartError::RemoteApi` for user errors or a missing cart
    /// payload and `CartError::Transport` when the request fails.
    #[instrument(skip(self))]
    pub async fn create_cart(&self) -> Result<Cart, CartError> {
        self.client.ensure_configured()?;

        let cart = self.sync(self.client.create_cart()).await?;

        if let Some(cart_id) = &cart.id {
            self.store.set(cart_id);
            info!(cart_id = %cart_id, "Created cart");
        }

        Ok(cart)
    }

    /// Add `quantity` units of a variant, creating the cart first if needed.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidArgument` for a quantity below one, and the
    /// errors of [`create_cart`](Self::create_cart) otherwise.
    #[instrument(skip(self), fields(merchandise_id = %merchandise_id))]
    pub async fn add_to_cart(
        &self,
        merchandise_id: &MerchandiseId,
        quantity: i64,
    ) -> Result<Cart, CartError> {
        self.client.ensure_configured()?;
        let quantity = Quantity::new(quantity)?;

        let cart_id = match self.store.get() {
            Some(cart_id) => cart_id,
            None => {
                debug!("No stored cart, creating one");
                self.create_cart()
                    .await?
                    .id
                    .ok_or_else(|| CartError::RemoteApi("Created cart has no ID".to_string()))?
            }
        };

        let lines = vec![CartLineInput {
            merchandise_id: merchandise_id.clone(),
            quantity,
        }];

        self.sync(self.client.add_to_cart(&cart_id, lines)).await
    }

    /// Add a single unit of a variant.
    ///
    /// # Errors
    ///
    /// See [`add_to_cart`](Self::add_to_cart).
    pub async fn add_item(&self, merchandise_id: &MerchandiseId) -> Result<Cart, CartError> {
        self.add_to_cart(merchandise_id, 1).await
    }

    /// Set the quantity of a line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidArgument` for a quantity below one (remove
    /// the line instead) and `CartError::NoCart` without a stored cart.
    #[instrument(skip(self), fields(line_id = %line_id))]
    pub async fn update_cart_line(
        &self,
        line_id: &CartLineId,
        quantity: i64,
    ) -> Result<Cart, CartError> {
        self.client.ensure_configured()?;
        let quantity = Quantity::new(quantity)?;
        let cart_id = self.stored_cart_id()?;

        let lines = vec![CartLineUpdateInput {
            id: line_id.clone(),
            quantity,
        }];

        self.sync(self.client.update_cart(&cart_id, lines)).await
    }

    /// Remove lines. Duplicate IDs are sent once.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidArgument` for an empty list and
    /// `CartError::NoCart` without a stored cart.
    #[instrument(skip(self, line_ids), fields(lines = line_ids.len()))]
    pub async fn remove_from_cart(&self, line_ids: &[CartLineId]) -> Result<Cart, CartError> {
        self.client.ensure_configured()?;

        if line_ids.is_empty() {
            return Err(CartError::InvalidArgument(
                "At least one line ID is required".to_string(),
            ));
        }

        let mut unique: Vec<CartLineId> = Vec::with_capacity(line_ids.len());
        for id in line_ids {
            if !unique.contains(id) {
                unique.push(id.clone());
            }
        }

        let cart_id = self.stored_cart_id()?;

        self.sync(self.client.remove_from_cart(&cart_id, unique)).await
    }

    /// Step the line holding `merchandise_id` up, down, or out.
    ///
    /// Loads the cart first when this session has not seen it yet.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NoCart` when there is no cart and
    /// `CartError::InvalidArgument` when no line holds the variant.
    #[instrument(skip(self), fields(merchandise_id = %merchandise_id))]
    pub async fn adjust_line(
        &self,
        merchandise_id: &MerchandiseId,
        adjustment: Adjustment,
    ) -> Result<Cart, CartError> {
        self.client.ensure_configured()?;

        let known = self.held().cart.clone().filter(|c| !c.is_placeholder());
        let cart = match known {
            Some(cart) => cart,
            None => self.get_cart().await?.ok_or(CartError::NoCart)?,
        };

        let line = cart.line_for_merchandise(merchandise_id).ok_or_else(|| {
            CartError::InvalidArgument(format!("No cart line holds {merchandise_id}"))
        })?;

        let next = match adjustment {
            Adjustment::Increment => Some(line.quantity.increment()),
            Adjustment::Decrement => line.quantity.decrement(),
            Adjustment::Remove => None,
        };

        match next {
            Some(quantity) => {
                self.update_cart_line(&line.id, i64::from(quantity))
                    .await
            }
            None => self.remove_from_cart(std::slice::from_ref(&line.id)).await,
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn held(&self) -> std::sync::MutexGuard<'_, Held> {
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stored_cart_id(&self) -> Result<CartId, CartError> {
        self.store.get().ok_or(CartError::NoCart)
    }

    /// Run one remote call, keeping the held cart on failure.
    async fn sync(
        &self,
        request: impl Future<Output = Result<Cart, ShopifyError>>,
    ) -> Result<Cart, CartError> {
        self.transition(CartState::Syncing);

        match request.await {
            Ok(cart) => {
                self.settle(cart.clone());
                Ok(cart)
            }
            Err(e) => {
                debug!(error = %e, "Cart request failed");
                self.restore();
                Err(e.into())
            }
        }
    }

    fn transition(&self, state: CartState) {
        let mut held = self.held();
        if held.state != state {
            debug!(from = %held.state, to = %state, "Cart state change");
            held.state = state;
        }
    }

    fn settle(&self, cart: Cart) {
        let state = CartState::settled(Some(&cart));
        self.held().cart = Some(cart);
        self.transition(state);
    }

    fn restore(&self) {
        let state = CartState::settled(self.held().cart.as_ref());
        self.transition(state);
    }
}
