//! GraphQL operation definitions for Shopify Storefront API.
//!
//! Each operation module mirrors the layout `graphql_client` codegen produces
//! (`OPERATION_NAME`, `QUERY`, `Variables`, `ResponseData`) and implements
//! [`GraphQLQuery`] so the client can execute any of them generically.
//! Response shapes are the raw API payloads; see
//! [`conversions`](super::conversions) for the flat domain types.

use graphql_client::{GraphQLQuery, QueryBody};

/// Maximum number of cart lines fetched with every cart payload.
pub const CART_LINES_PAGE_SIZE: i64 = 100;

macro_rules! cart_fields_fragment {
    () => {
        r"
fragment CartFields on Cart {
  id
  checkoutUrl
  totalQuantity
  lines(first: 100) {
    edges {
      node {
        id
        quantity
        cost {
          totalAmount { amount currencyCode }
        }
        merchandise {
          ... on ProductVariant {
            id
            title
            selectedOptions { name value }
            product {
              id
              handle
              title
              featuredImage { url altText width height }
            }
          }
        }
      }
    }
  }
  cost {
    totalAmount { amount currencyCode }
    subtotalAmount { amount currencyCode }
    totalTaxAmount { amount currencyCode }
  }
}
"
    };
}

macro_rules! product_fields_fragment {
    () => {
        r"
fragment ProductFields on Product {
  id
  handle
  title
  availableForSale
  featuredImage { url altText width height }
  priceRange {
    minVariantPrice { amount currencyCode }
    maxVariantPrice { amount currencyCode }
  }
}
"
    };
}

/// Implement [`GraphQLQuery`] for an operation marker type.
macro_rules! graphql_operation {
    ($marker:ident, $module:ident) => {
        #[doc = concat!("Marker type for the `", stringify!($marker), "` operation.")]
        pub struct $marker;

        impl GraphQLQuery for $marker {
            type Variables = $module::Variables;
            type ResponseData = $module::ResponseData;

            fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
                QueryBody {
                    variables,
                    query: $module::QUERY,
                    operation_name: $module::OPERATION_NAME,
                }
            }
        }
    };
}

graphql_operation!(CreateCart, create_cart);
graphql_operation!(GetCart, get_cart);
graphql_operation!(AddToCart, add_to_cart);
graphql_operation!(UpdateCartLines, update_cart_lines);
graphql_operation!(RemoveFromCart, remove_from_cart);
graphql_operation!(GetCollectionProducts, get_collection_products);
graphql_operation!(GetProducts, get_products);

// =============================================================================
// Shared response shapes (fragments)
// =============================================================================

/// Shapes shared by several operations.
pub mod fields {
    use serde::Deserialize;

    /// `MoneyV2`.
    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MoneyFields {
        pub amount: String,
        pub currency_code: String,
    }

    /// `Image`.
    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ImageFields {
        pub url: String,
        pub alt_text: Option<String>,
        pub width: Option<i64>,
        pub height: Option<i64>,
    }

    /// A relay-style connection.
    #[derive(Debug, Clone, Deserialize)]
    pub struct Connection<T> {
        pub edges: Vec<Edge<T>>,
    }

    /// One edge of a connection.
    #[derive(Debug, Clone, Deserialize)]
    pub struct Edge<T> {
        pub node: T,
    }

    /// `fragment CartFields on Cart`.
    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CartFields {
        pub id: String,
        pub checkout_url: String,
        pub total_quantity: i64,
        pub lines: Connection<CartLineFields>,
        pub cost: CartCostFields,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CartCostFields {
        pub total_amount: MoneyFields,
        pub subtotal_amount: MoneyFields,
        #[serde(default)]
        pub total_tax_amount: Option<MoneyFields>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CartLineFields {
        pub id: String,
        pub quantity: i64,
        pub cost: CartLineCostFields,
        pub merchandise: MerchandiseFields,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CartLineCostFields {
        pub total_amount: MoneyFields,
    }

    /// `... on ProductVariant`.
    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MerchandiseFields {
        pub id: String,
        pub title: String,
        #[serde(default)]
        pub selected_options: Vec<SelectedOptionFields>,
        pub product: MerchandiseProductFields,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct SelectedOptionFields {
        pub name: String,
        pub value: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MerchandiseProductFields {
        pub id: String,
        pub handle: String,
        pub title: String,
        pub featured_image: Option<ImageFields>,
    }

    /// `CartUserError`.
    #[derive(Debug, Clone, Deserialize)]
    pub struct UserErrorFields {
        pub code: Option<String>,
        pub field: Option<Vec<String>>,
        pub message: String,
    }

    /// Payload returned by every cart mutation.
    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CartMutationPayload {
        pub cart: Option<CartFields>,
        #[serde(default)]
        pub user_errors: Vec<UserErrorFields>,
    }

    /// `fragment ProductFields on Product`.
    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProductFields {
        pub id: String,
        pub handle: String,
        pub title: String,
        #[serde(default)]
        pub available_for_sale: bool,
        pub featured_image: Option<ImageFields>,
        pub price_range: PriceRangeFields,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PriceRangeFields {
        pub min_variant_price: MoneyFields,
        pub max_variant_price: MoneyFields,
    }
}

// =============================================================================
// Cart operations
// =============================================================================

pub mod create_cart {
    use serde::{Deserialize, Serialize};

    use super::fields::CartMutationPayload;

    pub const OPERATION_NAME: &str = "CreateCart";
    pub const QUERY: &str = concat!(
        r"
mutation CreateCart {
  cartCreate {
    cart { ...CartFields }
    userErrors { code field message }
  }
}
",
        cart_fields_fragment!()
    );

    #[derive(Debug, Clone, Default, Serialize)]
    pub struct Variables {}

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_create: Option<CartMutationPayload>,
    }
}

pub mod get_cart {
    use serde::{Deserialize, Serialize};

    use super::fields::CartFields;

    pub const OPERATION_NAME: &str = "GetCart";
    pub const QUERY: &str = concat!(
        r"
query GetCart($cartId: ID!) {
  cart(id: $cartId) { ...CartFields }
}
",
        cart_fields_fragment!()
    );

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub cart: Option<CartFields>,
    }
}

pub mod add_to_cart {
    use serde::{Deserialize, Serialize};

    use super::fields::CartMutationPayload;
    use crate::shopify::types::CartLineInput;

    pub const OPERATION_NAME: &str = "AddToCart";
    pub const QUERY: &str = concat!(
        r"
mutation AddToCart($cartId: ID!, $lines: [CartLineInput!]!) {
  cartLinesAdd(cartId: $cartId, lines: $lines) {
    cart { ...CartFields }
    userErrors { code field message }
  }
}
",
        cart_fields_fragment!()
    );

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
        pub lines: Vec<CartLineInput>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_lines_add: Option<CartMutationPayload>,
    }
}

pub mod update_cart_lines {
    use serde::{Deserialize, Serialize};

    use super::fields::CartMutationPayload;
    use crate::shopify::types::CartLineUpdateInput;

    pub const OPERATION_NAME: &str = "UpdateCartLines";
    pub const QUERY: &str = concat!(
        r"
mutation UpdateCartLines($cartId: ID!, $lines: [CartLineUpdateInput!]!) {
  cartLinesUpdate(cartId: $cartId, lines: $lines) {
    cart { ...CartFields }
    userErrors { code field message }
  }
}
",
        cart_fields_fragment!()
    );

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
        pub lines: Vec<CartLineUpdateInput>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_lines_update: Option<CartMutationPayload>,
    }
}

pub mod remove_from_cart {
    use serde::{Deserialize, Serialize};

    use super::fields::CartMutationPayload;

    pub const OPERATION_NAME: &str = "RemoveFromCart";
    pub const QUERY: &str = concat!(
        r"
mutation RemoveFromCart($cartId: ID!, $lineIds: [ID!]!) {
  cartLinesRemove(cartId: $cartId, lineIds: $lineIds) {
    cart { ...CartFields }
    userErrors { code field message }
  }
}
",
        cart_fields_fragment!()
    );

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
        pub line_ids: Vec<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_lines_remove: Option<CartMutationPayload>,
    }
}

// =============================================================================
// Catalog queries
// =============================================================================

pub mod get_collection_products {
    use serde::{Deserialize, Serialize};

    use super::fields::{Connection, ProductFields};

    pub const OPERATION_NAME: &str = "GetCollectionProducts";
    pub const QUERY: &str = concat!(
        r"
query GetCollectionProducts($handle: String!, $first: Int!) {
  collection(handle: $handle) {
    products(first: $first) {
      edges { node { ...ProductFields } }
    }
  }
}
",
        product_fields_fragment!()
    );

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub handle: String,
        pub first: i64,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub collection: Option<CollectionProducts>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct CollectionProducts {
        pub products: Connection<ProductFields>,
    }
}

pub mod get_products {
    use serde::{Deserialize, Serialize};

    use super::fields::{Connection, ProductFields};

    pub const OPERATION_NAME: &str = "GetProducts";
    pub const QUERY: &str = concat!(
        r"
query GetProducts($first: Int!) {
  products(first: $first) {
    edges { node { ...ProductFields } }
  }
}
",
        product_fields_fragment!()
    );

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub first: i64,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub products: Connection<ProductFields>,
    }
}
