//! Shopify Storefront API client implementation.
//!
//! Builds requests through `graphql_client`'s [`GraphQLQuery`] envelope and
//! hands them to a [`Transport`]. Cart payloads are never cached; they are
//! mutable remote state.

mod conversions;
pub mod queries;

use graphql_client::{GraphQLQuery, Response};
use tracing::{debug, instrument};

use crate::config::ConfigError;
use crate::shopify::transport::{HttpTransport, Transport};
use crate::shopify::types::{
    Cart, CartId, CartLineId, CartLineInput, CartLineUpdateInput, Product,
};
use crate::shopify::{GraphQLError, GraphQLErrorLocation, ShopifyError};

use conversions::{convert_cart, convert_product_connection, convert_user_errors};
use queries::fields::CartMutationPayload;
use queries::{
    AddToCart, CreateCart, GetCart, GetCollectionProducts, GetProducts, RemoveFromCart,
    UpdateCartLines, add_to_cart, create_cart, get_cart, get_collection_products, get_products,
    remove_from_cart, update_cart_lines,
};

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the Shopify Storefront API.
///
/// Provides typed access to cart operations and the product listings used by
/// homepage slots.
#[derive(Debug, Clone)]
pub struct StorefrontClient<T = HttpTransport> {
    transport: T,
}

impl<T: Transport> StorefrontClient<T> {
    /// Create a new Storefront API client over `transport`.
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    /// The underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Report whether the transport has its settings.
    ///
    /// # Errors
    ///
    /// Returns the `ConfigError` recorded by the transport.
    pub fn ensure_configured(&self) -> Result<(), ConfigError> {
        self.transport.ensure_configured()
    }

    /// Execute a GraphQL operation.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ShopifyError> {
        let request_body = serde_json::to_value(Q::build_query(variables))?;

        let response_text = self.transport.post(request_body).await?;

        // Parse the response
        let response: Response<Q::ResponseData> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse Shopify GraphQL response"
                );
                return Err(ShopifyError::Parse(e));
            }
        };

        // Check for GraphQL errors
        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            debug!(errors = ?errors, "GraphQL errors in response");

            return Err(ShopifyError::GraphQL(
                errors
                    .into_iter()
                    .map(|e| GraphQLError {
                        message: e.message,
                        locations: e.locations.map_or_else(Vec::new, |locs| {
                            locs.into_iter()
                                .map(|l| GraphQLErrorLocation {
                                    line: i64::from(l.line),
                                    column: i64::from(l.column),
                                })
                                .collect()
                        }),
                        path: e.path.map_or_else(Vec::new, |p| {
                            p.into_iter()
                                .map(|fragment| match fragment {
                                    graphql_client::PathFragment::Key(s) => {
                                        serde_json::Value::String(s)
                                    }
                                    graphql_client::PathFragment::Index(i) => {
                                        serde_json::Value::Number(i.into())
                                    }
                                })
                                .collect()
                        }),
                    })
                    .collect(),
            ));
        }

        response.data.ok_or_else(|| {
            tracing::error!(
                body = %response_text.chars().take(500).collect::<String>(),
                "Shopify GraphQL response has no data and no errors"
            );
            ShopifyError::graphql_message("No data in response")
        })
    }

    // =========================================================================
    // Cart Methods (not cached - mutable state)
    // =========================================================================

    /// Create a new, empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart creation fails or user errors are returned.
    #[instrument(skip(self))]
    pub async fn create_cart(&self) -> Result<Cart, ShopifyError> {
        let data = self
            .execute::<CreateCart>(create_cart::Variables::default())
            .await?;

        cart_from_payload(data.cart_create, "Failed to create cart")
    }

    /// Get an existing cart.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::NotFound` if the API no longer knows the cart,
    /// or another error if the request fails.
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn get_cart(&self, cart_id: &CartId) -> Result<Cart, ShopifyError> {
        let variables = get_cart::Variables {
            cart_id: cart_id.to_string(),
        };

        let data = self.execute::<GetCart>(variables).await?;

        data.cart
            .map(convert_cart)
            .ok_or_else(|| ShopifyError::NotFound(format!("Cart not found: {cart_id}")))
    }

    /// Add lines to a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, lines), fields(cart_id = %cart_id, lines = lines.len()))]
    pub async fn add_to_cart(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, ShopifyError> {
        let variables = add_to_cart::Variables {
            cart_id: cart_id.to_string(),
            lines,
        };

        let data = self.execute::<AddToCart>(variables).await?;

        cart_from_payload(data.cart_lines_add, "Failed to add to cart")
    }

    /// Update cart lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, lines), fields(cart_id = %cart_id, lines = lines.len()))]
    pub async fn update_cart(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<Cart, ShopifyError> {
        let variables = update_cart_lines::Variables {
            cart_id: cart_id.to_string(),
            lines,
        };

        let data = self.execute::<UpdateCartLines>(variables).await?;

        cart_from_payload(data.cart_lines_update, "Failed to update cart")
    }

    /// Remove lines from a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, line_ids), fields(cart_id = %cart_id, lines = line_ids.len()))]
    pub async fn remove_from_cart(
        &self,
        cart_id: &CartId,
        line_ids: Vec<CartLineId>,
    ) -> Result<Cart, ShopifyError> {
        let variables = remove_from_cart::Variables {
            cart_id: cart_id.to_string(),
            line_ids: line_ids.into_iter().map(CartLineId::into_inner).collect(),
        };

        let data = self.execute::<RemoveFromCart>(variables).await?;

        cart_from_payload(data.cart_lines_remove, "Failed to remove from cart")
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// Get the first `first` products of a collection.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::NotFound` if the collection does not exist, or
    /// another error if the API request fails.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_collection_products(
        &self,
        handle: &str,
        first: i64,
    ) -> Result<Vec<Product>, ShopifyError> {
        let variables = get_collection_products::Variables {
            handle: handle.to_string(),
            first,
        };

        let data = self.execute::<GetCollectionProducts>(variables).await?;

        data.collection
            .map(|c| convert_product_connection(c.products))
            .ok_or_else(|| ShopifyError::NotFound(format!("Collection not found: {handle}")))
    }

    /// Get the first `first` products of the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self, first: i64) -> Result<Vec<Product>, ShopifyError> {
        let data = self
            .execute::<GetProducts>(get_products::Variables { first })
            .await?;

        Ok(convert_product_connection(data.products))
    }
}

/// Unwrap a cart mutation payload, surfacing user errors first.
fn cart_from_payload(
    payload: Option<CartMutationPayload>,
    failure: &str,
) -> Result<Cart, ShopifyError> {
    if let Some(result) = payload {
        if !result.user_errors.is_empty() {
            return Err(ShopifyError::UserErrors(convert_user_errors(
                result.user_errors,
            )));
        }

        if let Some(cart) = result.cart {
            return Ok(convert_cart(cart));
        }
    }

    Err(ShopifyError::graphql_message(failure))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::shopify::transport::testing::ScriptedTransport;
    use crate::shopify::types::{MerchandiseId, Quantity};

    fn cart_payload(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "checkoutUrl": "https://shop.example/checkout",
            "totalQuantity": 0,
            "lines": { "edges": [] },
            "cost": {
                "totalAmount": { "amount": "0.0", "currencyCode": "USD" },
                "subtotalAmount": { "amount": "0.0", "currencyCode": "USD" },
                "totalTaxAmount": null
            }
        })
    }

    #[tokio::test]
    async fn test_create_cart() {
        let transport = ScriptedTransport::new().respond_data(json!({
            "cartCreate": { "cart": cart_payload("gid://shopify/Cart/1"), "userErrors": [] }
        }));
        let client = StorefrontClient::new(transport);

        let cart = client.create_cart().await.unwrap();

        assert_eq!(cart.id, Some(CartId::new("gid://shopify/Cart/1")));
        assert_eq!(client.transport().operations(), vec!["CreateCart"]);
    }

    #[tokio::test]
    async fn test_get_cart_null_is_not_found() {
        let transport = ScriptedTransport::new().respond_data(json!({ "cart": null }));
        let client = StorefrontClient::new(transport);

        let err = client
            .get_cart(&CartId::new("gid://shopify/Cart/gone"))
            .await
            .unwrap_err();

        assert!(matches!(err, ShopifyError::NotFound(_)));
        assert_eq!(
            client.transport().last_variables(),
            json!({ "cartId": "gid://shopify/Cart/gone" })
        );
    }

    #[tokio::test]
    async fn test_add_to_cart_sends_line_input() {
        let transport = ScriptedTransport::new().respond_data(json!({
            "cartLinesAdd": { "cart": cart_payload("gid://shopify/Cart/1"), "userErrors": [] }
        }));
        let client = StorefrontClient::new(transport);

        client
            .add_to_cart(
                &CartId::new("gid://shopify/Cart/1"),
                vec![CartLineInput {
                    merchandise_id: MerchandiseId::new("gid://shopify/ProductVariant/7"),
                    quantity: Quantity::new(2).unwrap(),
                }],
            )
            .await
            .unwrap();

        assert_eq!(
            client.transport().last_variables(),
            json!({
                "cartId": "gid://shopify/Cart/1",
                "lines": [{ "merchandiseId": "gid://shopify/ProductVariant/7", "quantity": 2 }]
            })
        );
    }

    #[tokio::test]
    async fn test_user_errors_win_over_cart() {
        let transport = ScriptedTransport::new().respond_data(json!({
            "cartLinesUpdate": {
                "cart": cart_payload("gid://shopify/Cart/1"),
                "userErrors": [{ "code": "INVALID", "field": ["lines"], "message": "Out of stock" }]
            }
        }));
        let client = StorefrontClient::new(transport);

        let err = client
            .update_cart(&CartId::new("gid://shopify/Cart/1"), vec![])
            .await
            .unwrap_err();

        assert_eq!(err.first_message(), Some("Out of stock"));
    }

    #[tokio::test]
    async fn test_missing_payload_is_graphql_error() {
        let transport =
            ScriptedTransport::new().respond_data(json!({ "cartLinesRemove": null }));
        let client = StorefrontClient::new(transport);

        let err = client
            .remove_from_cart(
                &CartId::new("gid://shopify/Cart/1"),
                vec![CartLineId::new("l1")],
            )
            .await
            .unwrap_err();

        assert_eq!(err.first_message(), Some("Failed to remove from cart"));
        assert_eq!(
            client.transport().last_variables()["lineIds"],
            json!(["l1"])
        );
    }

    #[tokio::test]
    async fn test_top_level_graphql_errors() {
        let transport = ScriptedTransport::new().respond_raw(
            json!({
                "errors": [{
                    "message": "Variable $cartId of type ID! was provided invalid value",
                    "locations": [{ "line": 2, "column": 15 }],
                    "path": ["cart"]
                }]
            })
            .to_string(),
        );
        let client = StorefrontClient::new(transport);

        let err = client
            .get_cart(&CartId::new("not-a-gid"))
            .await
            .unwrap_err();

        assert!(matches!(err, ShopifyError::GraphQL(_)));
        assert!(err.to_string().contains("at line 2:15"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let transport = ScriptedTransport::new().respond_raw("<html>oops</html>");
        let client = StorefrontClient::new(transport);

        let err = client.create_cart().await.unwrap_err();

        assert!(matches!(err, ShopifyError::Parse(_)));
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_collection_not_found() {
        let transport = ScriptedTransport::new().respond_data(json!({ "collection": null }));
        let client = StorefrontClient::new(transport);

        let err = client
            .get_collection_products("hidden-homepage-carousel", 10)
            .await
            .unwrap_err();

        assert!(matches!(err, ShopifyError::NotFound(_)));
    }
}
