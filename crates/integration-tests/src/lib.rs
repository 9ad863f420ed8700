//! Integration tests for Shopfront.
//!
//! [`FakeStorefront`] stands in for the Storefront GraphQL API. It answers
//! the cart and catalog operations the client sends, keeps carts in memory,
//! and can be told to misbehave.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rust_decimal::Decimal;
use serde_json::{Value, json};
use shopfront_core::{CartId, MerchandiseId, Money};
use shopfront_storefront::cart::{CartSession, MemoryCartIdStore};
use shopfront_storefront::{ConfigError, ShopifyError, StorefrontClient, Transport};

/// Shop domain used in generated checkout URLs.
pub const SHOP_DOMAIN: &str = "fake-shop.myshopify.com";

/// Tax rate applied to every cart subtotal (10%).
const TAX_RATE: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// How the next request should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// The request never reaches the API.
    Network,
    /// The API answers with this HTTP status.
    Status(u16),
    /// The API answers with a body that is not JSON.
    Malformed,
}

#[derive(Debug, Clone)]
struct FakeProduct {
    id: String,
    handle: String,
    title: String,
    variant_id: String,
    price: Money,
    image: bool,
}

#[derive(Debug, Clone)]
struct FakeLine {
    id: String,
    variant_id: String,
    quantity: i64,
}

#[derive(Debug, Clone, Default)]
struct FakeCart {
    lines: Vec<FakeLine>,
}

#[derive(Debug, Default)]
struct State {
    products: Vec<FakeProduct>,
    collections: HashMap<String, Vec<String>>,
    carts: HashMap<String, FakeCart>,
    next_id: u64,
    failures: VecDeque<Failure>,
    rejection: Option<String>,
    omit_tax: bool,
    operations: Vec<String>,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<State>,
    calls: AtomicUsize,
    config_error: Option<ConfigError>,
}

/// In-memory Storefront API.
///
/// Cloning shares the same remote state, so several sessions (or "page
/// loads") can talk to one fake shop.
#[derive(Debug, Clone, Default)]
pub struct FakeStorefront {
    shared: Arc<Shared>,
}

impl FakeStorefront {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A fake that reports missing settings and never answers.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self {
            shared: Arc::new(Shared {
                config_error: Some(ConfigError::MissingEnvVar(
                    "SHOPIFY_STOREFRONT_PUBLIC_TOKEN".to_string(),
                )),
                ..Shared::default()
            }),
        }
    }

    /// Add a product with a single variant priced at `price` USD.
    #[must_use]
    pub fn with_product(self, handle: &str, price: &str, image: bool) -> Self {
        self.state().products.push(FakeProduct {
            id: format!("gid://shopify/Product/{handle}"),
            handle: handle.to_string(),
            title: title_case(handle),
            variant_id: variant_gid(handle),
            price: Money::new(price, "USD"),
            image,
        });
        self
    }

    /// Add a collection holding the given product handles.
    #[must_use]
    pub fn with_collection(self, handle: &str, products: &[&str]) -> Self {
        self.state().collections.insert(
            handle.to_string(),
            products.iter().map(|p| (*p).to_string()).collect(),
        );
        self
    }

    /// A catalog of three imaged products: `tee` (25.00), `mug` (12.50),
    /// `cap` (18.00).
    #[must_use]
    pub fn with_basic_catalog(self) -> Self {
        self.with_product("tee", "25.00", true)
            .with_product("mug", "12.50", true)
            .with_product("cap", "18.00", true)
    }

    /// Fail the next request.
    pub fn fail_next(&self, failure: Failure) {
        self.state().failures.push_back(failure);
    }

    /// Reject the next cart mutation with a user error.
    pub fn reject_next_mutation(&self, message: &str) {
        self.state().rejection = Some(message.to_string());
    }

    /// Leave `totalTaxAmount` out of cart payloads.
    pub fn omit_tax(&self, omit: bool) {
        self.state().omit_tax = omit;
    }

    /// Forget a cart, as if it expired remotely.
    pub fn delete_cart(&self, cart_id: &CartId) {
        self.state().carts.remove(cart_id.as_str());
    }

    /// Number of carts the shop holds.
    #[must_use]
    pub fn cart_count(&self) -> usize {
        self.state().carts.len()
    }

    /// Requests received, including failed ones.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.shared.calls.load(Ordering::SeqCst)
    }

    /// Operation names received, in order.
    #[must_use]
    pub fn operations(&self) -> Vec<String> {
        self.state().operations.clone()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn handle(&self, body: &Value) -> Result<String, ShopifyError> {
        let operation = body["operationName"].as_str().unwrap_or_default();
        let variables = &body["variables"];

        let mut state = self.state();
        state.operations.push(operation.to_string());

        if let Some(failure) = state.failures.pop_front() {
            return match failure {
                Failure::Network => Err(ShopifyError::Transport(
                    "connection reset by peer".to_string(),
                )),
                Failure::Status(status) => Err(ShopifyError::Status {
                    status,
                    body: "upstream unavailable".to_string(),
                }),
                Failure::Malformed => Ok("<html>Bad Gateway</html>".to_string()),
            };
        }

        let data = match operation {
            "CreateCart" => json!({ "cartCreate": state.create_cart() }),
            "GetCart" => {
                let cart_id = variables["cartId"].as_str().unwrap_or_default();
                json!({ "cart": state.cart_json(cart_id) })
            }
            "AddToCart" => json!({ "cartLinesAdd": state.mutate(variables, State::add_lines) }),
            "UpdateCartLines" => {
                json!({ "cartLinesUpdate": state.mutate(variables, State::update_lines) })
            }
            "RemoveFromCart" => {
                json!({ "cartLinesRemove": state.mutate(variables, State::remove_lines) })
            }
            "GetCollectionProducts" => {
                let handle = variables["handle"].as_str().unwrap_or_default();
                let first = variables["first"].as_u64().unwrap_or(0);
                json!({ "collection": state.collection_json(handle, first) })
            }
            "GetProducts" => {
                let first = variables["first"].as_u64().unwrap_or(0);
                let handles: Vec<String> =
                    state.products.iter().map(|p| p.handle.clone()).collect();
                json!({ "products": state.products_json(&handles, first) })
            }
            other => {
                return Ok(json!({
                    "errors": [{ "message": format!("Unknown operation {other}") }]
                })
                .to_string());
            }
        };

        Ok(json!({ "data": data }).to_string())
    }
}

impl Transport for FakeStorefront {
    fn ensure_configured(&self) -> Result<(), ConfigError> {
        self.shared.config_error.clone().map_or(Ok(()), Err)
    }

    async fn post(&self, body: Value) -> Result<String, ShopifyError> {
        self.shared.calls.fetch_add(1, Ordering::SeqCst);
        self.ensure_configured()?;
        self.handle(&body)
    }
}

type Mutation = fn(&mut State, &str, &Value) -> Result<(), String>;

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn create_cart(&mut self) -> Value {
        if let Some(message) = self.rejection.take() {
            return user_error_payload(&message, "input");
        }
        let cart_id = format!("gid://shopify/Cart/c{}", self.next_id());
        self.carts.insert(cart_id.clone(), FakeCart::default());
        json!({ "cart": self.cart_json(&cart_id), "userErrors": [] })
    }

    fn mutate(&mut self, variables: &Value, apply: Mutation) -> Value {
        let cart_id = variables["cartId"].as_str().unwrap_or_default().to_string();

        if !self.carts.contains_key(&cart_id) {
            return user_error_payload("The specified cart does not exist.", "cartId");
        }
        if let Some(message) = self.rejection.take() {
            return json!({
                "cart": self.cart_json(&cart_id),
                "userErrors": [{ "code": "INVALID", "field": ["lines"], "message": message }]
            });
        }

        match apply(self, &cart_id, variables) {
            Ok(()) => json!({ "cart": self.cart_json(&cart_id), "userErrors": [] }),
            Err(message) => json!({
                "cart": self.cart_json(&cart_id),
                "userErrors": [{ "code": "INVALID", "field": ["lines"], "message": message }]
            }),
        }
    }

    fn add_lines(&mut self, cart_id: &str, variables: &Value) -> Result<(), String> {
        let lines = variables["lines"].as_array().cloned().unwrap_or_default();
        for input in lines {
            let variant_id = input["merchandiseId"].as_str().unwrap_or_default().to_string();
            let quantity = input["quantity"].as_i64().unwrap_or(0);

            if !self.products.iter().any(|p| p.variant_id == variant_id) {
                return Err(format!(
                    "The merchandise with id {variant_id} does not exist."
                ));
            }
            if quantity < 1 {
                return Err("Quantity must be at least 1.".to_string());
            }

            let line_id = format!("gid://shopify/CartLine/l{}", self.next_id());
            let Some(cart) = self.carts.get_mut(cart_id) else {
                return Err("The specified cart does not exist.".to_string());
            };
            match cart.lines.iter_mut().find(|l| l.variant_id == variant_id) {
                Some(line) => line.quantity += quantity,
                None => cart.lines.push(FakeLine {
                    id: line_id,
                    variant_id,
                    quantity,
                }),
            }
        }
        Ok(())
    }

    fn update_lines(&mut self, cart_id: &str, variables: &Value) -> Result<(), String> {
        let Some(cart) = self.carts.get_mut(cart_id) else {
            return Err("The specified cart does not exist.".to_string());
        };
        for input in variables["lines"].as_array().cloned().unwrap_or_default() {
            let line_id = input["id"].as_str().unwrap_or_default();
            let quantity = input["quantity"].as_i64().unwrap_or(0);
            let Some(line) = cart.lines.iter_mut().find(|l| l.id == line_id) else {
                return Err(format!("The merchandise line with id {line_id} does not exist."));
            };
            line.quantity = quantity;
        }
        cart.lines.retain(|l| l.quantity > 0);
        Ok(())
    }

    fn remove_lines(&mut self, cart_id: &str, variables: &Value) -> Result<(), String> {
        let Some(cart) = self.carts.get_mut(cart_id) else {
            return Err("The specified cart does not exist.".to_string());
        };
        let ids: Vec<&str> = variables["lineIds"]
            .as_array()
            .map(|ids| ids.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        if let Some(missing) = ids.iter().find(|id| !cart.lines.iter().any(|l| l.id == **id)) {
            return Err(format!("The merchandise line with id {missing} does not exist."));
        }
        cart.lines.retain(|l| !ids.contains(&l.id.as_str()));
        Ok(())
    }

    fn product_for_variant(&self, variant_id: &str) -> Option<&FakeProduct> {
        self.products.iter().find(|p| p.variant_id == variant_id)
    }

    fn cart_json(&self, cart_id: &str) -> Value {
        let Some(cart) = self.carts.get(cart_id) else {
            return Value::Null;
        };

        let mut subtotal = Money::zero("USD");
        let mut edges = Vec::new();
        for line in &cart.lines {
            let Some(product) = self.product_for_variant(&line.variant_id) else {
                continue;
            };
            let line_total = product
                .price
                .times(u32::try_from(line.quantity).unwrap_or(0))
                .unwrap_or_else(|_| Money::zero("USD"));
            subtotal = subtotal.checked_add(&line_total).unwrap_or(subtotal);
            edges.push(json!({ "node": {
                "id": line.id,
                "quantity": line.quantity,
                "cost": { "totalAmount": money_json(&line_total) },
                "merchandise": {
                    "id": line.variant_id,
                    "title": "Default Title",
                    "selectedOptions": [{ "name": "Title", "value": "Default Title" }],
                    "product": {
                        "id": product.id,
                        "handle": product.handle,
                        "title": product.title,
                        "featuredImage": image_json(product)
                    }
                }
            } }));
        }

        let tax = Money::from_decimal(
            subtotal.decimal().unwrap_or_default() * TAX_RATE,
            "USD",
        );
        let total = subtotal.checked_add(&tax).unwrap_or_else(|_| subtotal.clone());
        let total_quantity: i64 = cart.lines.iter().map(|l| l.quantity).sum();

        let mut cost = json!({
            "totalAmount": money_json(&total),
            "subtotalAmount": money_json(&subtotal),
        });
        if !self.omit_tax {
            cost["totalTaxAmount"] = money_json(&tax);
        }

        json!({
            "id": cart_id,
            "checkoutUrl": format!(
                "https://{SHOP_DOMAIN}/cart/c/{}",
                cart_id.rsplit('/').next().unwrap_or_default()
            ),
            "totalQuantity": total_quantity,
            "lines": { "edges": edges },
            "cost": cost
        })
    }

    fn collection_json(&self, handle: &str, first: u64) -> Value {
        self.collections.get(handle).map_or(Value::Null, |handles| {
            json!({ "products": self.products_json(handles, first) })
        })
    }

    fn products_json(&self, handles: &[String], first: u64) -> Value {
        let edges: Vec<Value> = handles
            .iter()
            .filter_map(|h| self.products.iter().find(|p| &p.handle == h))
            .take(usize::try_from(first).unwrap_or(usize::MAX))
            .map(|p| {
                json!({ "node": {
                    "id": p.id,
                    "handle": p.handle,
                    "title": p.title,
                    "availableForSale": true,
                    "featuredImage": image_json(p),
                    "priceRange": {
                        "minVariantPrice": money_json(&p.price),
                        "maxVariantPrice": money_json(&p.price)
                    }
                } })
            })
            .collect();
        json!({ "edges": edges })
    }
}

fn user_error_payload(message: &str, field: &str) -> Value {
    json!({
        "cart": null,
        "userErrors": [{ "code": "INVALID", "field": [field], "message": message }]
    })
}

fn money_json(money: &Money) -> Value {
    json!({ "amount": money.amount, "currencyCode": money.currency_code })
}

fn image_json(product: &FakeProduct) -> Value {
    if product.image {
        json!({
            "url": format!("https://cdn.shopify.com/s/files/{}.png", product.handle),
            "altText": product.title,
            "width": 1024,
            "height": 1024
        })
    } else {
        Value::Null
    }
}

fn title_case(handle: &str) -> String {
    handle
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |c| {
                c.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Variant ID the fake assigns to a product handle.
#[must_use]
pub fn variant_gid(handle: &str) -> String {
    format!("gid://shopify/ProductVariant/{handle}")
}

/// Variant ID of a product handle as a typed ID.
#[must_use]
pub fn variant(handle: &str) -> MerchandiseId {
    MerchandiseId::new(variant_gid(handle))
}

/// A session against `fake` with an in-memory cart ID store.
#[must_use]
pub fn memory_session(fake: &FakeStorefront) -> CartSession<FakeStorefront, MemoryCartIdStore> {
    CartSession::new(StorefrontClient::new(fake.clone()), MemoryCartIdStore::new())
}
