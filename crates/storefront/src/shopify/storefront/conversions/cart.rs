//! Cart type conversion functions.
//!
//! Flattens the `lines.edges[].node` pagination wrapper into `Cart::lines`,
//! preserving API order, and fills in a zero tax amount when the API omits
//! one so display code never has to special-case it.

use tracing::warn;

use crate::shopify::types::{
    Cart, CartCost, CartId, CartLine, CartLineCost, CartLineId, CartMerchandise,
    CartMerchandiseProduct, CartUserError, Image, MerchandiseId, Money, ProductId, Quantity,
    SelectedOption,
};

use super::super::queries::fields::{
    CartCostFields, CartFields, CartLineFields, ImageFields, MerchandiseFields, MoneyFields,
    UserErrorFields,
};

pub(crate) fn convert_money(money: MoneyFields) -> Money {
    Money {
        amount: money.amount,
        currency_code: money.currency_code,
    }
}

pub(crate) fn convert_image(image: ImageFields) -> Image {
    Image {
        url: image.url,
        alt_text: image.alt_text,
        width: image.width,
        height: image.height,
    }
}

/// Convert a raw cart payload into the flat cart view model.
pub fn convert_cart(cart: CartFields) -> Cart {
    let lines: Vec<CartLine> = cart
        .lines
        .edges
        .into_iter()
        .filter_map(|edge| convert_cart_line(edge.node))
        .collect();

    let mut converted = Cart {
        id: Some(CartId::new(cart.id)),
        checkout_url: cart.checkout_url,
        total_quantity: 0,
        lines,
        cost: convert_cart_cost(cart.cost),
    };

    // Keep totalQuantity consistent with the lines we actually hold
    converted.total_quantity = converted.lines_quantity();
    if i64::from(converted.total_quantity) != cart.total_quantity {
        warn!(
            reported = cart.total_quantity,
            counted = converted.total_quantity,
            "Cart totalQuantity disagrees with its lines"
        );
    }

    converted
}

fn convert_cart_cost(cost: CartCostFields) -> CartCost {
    let total = convert_money(cost.total_amount);
    let total_tax = cost
        .total_tax_amount
        .map_or_else(|| Money::zero(total.currency_code.clone()), convert_money);

    CartCost {
        subtotal: convert_money(cost.subtotal_amount),
        total,
        total_tax,
    }
}

fn convert_cart_line(line: CartLineFields) -> Option<CartLine> {
    let Ok(quantity) = Quantity::new(line.quantity) else {
        warn!(
            line_id = %line.id,
            quantity = line.quantity,
            "Skipping cart line with non-positive quantity"
        );
        return None;
    };

    Some(CartLine {
        id: CartLineId::new(line.id),
        quantity,
        cost: CartLineCost {
            total_amount: convert_money(line.cost.total_amount),
        },
        merchandise: convert_merchandise(line.merchandise),
    })
}

fn convert_merchandise(v: MerchandiseFields) -> CartMerchandise {
    CartMerchandise {
        id: MerchandiseId::new(v.id),
        title: v.title,
        selected_options: v
            .selected_options
            .into_iter()
            .map(|o| SelectedOption {
                name: o.name,
                value: o.value,
            })
            .collect(),
        product: CartMerchandiseProduct {
            id: ProductId::new(v.product.id),
            handle: v.product.handle,
            title: v.product.title,
            featured_image: v.product.featured_image.map(convert_image),
        },
    }
}

/// Convert mutation user errors.
pub fn convert_user_errors(errors: Vec<UserErrorFields>) -> Vec<CartUserError> {
    errors
        .into_iter()
        .map(|e| CartUserError {
            code: e.code,
            field: e.field,
            message: e.message,
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use serde_json::json;

    use super::*;

    fn line_json(id: &str, variant: &str, quantity: i64, amount: &str) -> serde_json::Value {
        json!({
            "node": {
                "id": id,
                "quantity": quantity,
                "cost": { "totalAmount": { "amount": amount, "currencyCode": "EUR" } },
                "merchandise": {
                    "id": variant,
                    "title": "Large / Blue",
                    "selectedOptions": [
                        { "name": "Size", "value": "Large" },
                        { "name": "Color", "value": "Blue" }
                    ],
                    "product": {
                        "id": "gid://shopify/Product/1",
                        "handle": "tee",
                        "title": "Tee",
                        "featuredImage": {
                            "url": "https://cdn.shopify.com/s/files/tee.png",
                            "altText": null,
                            "width": 800,
                            "height": 800
                        }
                    }
                }
            }
        })
    }

    fn cart_json(edges: Vec<serde_json::Value>, total_quantity: i64, tax: bool) -> CartFields {
        let mut cost = json!({
            "totalAmount": { "amount": "30.0", "currencyCode": "EUR" },
            "subtotalAmount": { "amount": "30.0", "currencyCode": "EUR" }
        });
        if tax {
            cost["totalTaxAmount"] = json!({ "amount": "4.5", "currencyCode": "EUR" });
        }

        serde_json::from_value(json!({
            "id": "gid://shopify/Cart/c1",
            "checkoutUrl": "https://shop.example/cart/c/c1",
            "totalQuantity": total_quantity,
            "lines": { "edges": edges },
            "cost": cost
        }))
        .unwrap()
    }

    #[test]
    fn test_flattens_lines_in_api_order() {
        let cart = convert_cart(cart_json(
            vec![
                line_json("l2", "v2", 2, "20.0"),
                line_json("l1", "v1", 1, "10.0"),
            ],
            3,
            true,
        ));

        assert_eq!(cart.id.as_ref().map(CartId::as_str), Some("gid://shopify/Cart/c1"));
        let ids: Vec<&str> = cart.lines.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["l2", "l1"]);
        assert_eq!(cart.lines[0].merchandise.selected_options.len(), 2);
        assert_eq!(cart.lines[0].merchandise.product.handle, "tee");
        assert_eq!(cart.total_quantity, 3);
        assert_eq!(cart.cost.total_tax, Money::new("4.5", "EUR"));
    }

    #[test]
    fn test_missing_tax_becomes_zero_in_total_currency() {
        let cart = convert_cart(cart_json(vec![], 0, false));

        assert_eq!(cart.cost.total_tax, Money::new("0.0", "EUR"));
        assert!(cart.lines.is_empty());
        assert_eq!(cart.total_quantity, 0);
    }

    #[test]
    fn test_null_tax_becomes_zero() {
        let mut raw = cart_json(vec![], 0, false);
        raw.cost.total_tax_amount = None;
        let cart = convert_cart(raw);
        assert!(cart.cost.total_tax.is_zero());
        assert_eq!(cart.cost.total_tax.currency_code, "EUR");
    }

    #[test]
    fn test_total_quantity_matches_lines() {
        // API reports 9 but only the first page of lines came back
        let cart = convert_cart(cart_json(
            vec![
                line_json("l1", "v1", 2, "20.0"),
                line_json("l2", "v2", 3, "30.0"),
            ],
            9,
            true,
        ));

        assert_eq!(cart.total_quantity, 5);
        assert_eq!(cart.total_quantity, cart.lines_quantity());
    }

    #[test]
    fn test_skips_zero_quantity_line() {
        let cart = convert_cart(cart_json(
            vec![
                line_json("l1", "v1", 0, "0.0"),
                line_json("l2", "v2", 1, "10.0"),
            ],
            1,
            true,
        ));

        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].id.as_str(), "l2");
    }

    #[test]
    fn test_convert_user_errors() {
        let errors = convert_user_errors(vec![UserErrorFields {
            code: Some("INVALID".to_string()),
            field: Some(vec!["lines".to_string()]),
            message: "Not enough stock".to_string(),
        }]);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Not enough stock");
        assert_eq!(errors[0].code.as_deref(), Some("INVALID"));
    }
}
