//! End-to-end cart synchronization against the in-memory Storefront API.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use shopfront_core::{CartId, CartLineId, Money};
use shopfront_integration_tests::{FakeStorefront, Failure, memory_session, variant};
use shopfront_storefront::shopify::Cart;
use shopfront_storefront::{
    Adjustment, CartError, CartIdStore, CartSession, CartState, DetachedCartIdStore,
    FileCartIdStore, MemoryCartIdStore, StorefrontClient,
};

fn assert_quantity_consistent(cart: &Cart) {
    let sum: u32 = cart.lines.iter().map(|l| l.quantity.get()).sum();
    assert_eq!(cart.total_quantity, sum, "totalQuantity must equal sum of lines");
}

// ============================================================================
// Reads
// ============================================================================

#[tokio::test]
async fn get_cart_without_stored_id_makes_no_request() {
    let fake = FakeStorefront::new().with_basic_catalog();
    let session = memory_session(&fake);

    assert!(session.get_cart().await.unwrap().is_none());

    assert_eq!(fake.calls(), 0);
    assert_eq!(session.state(), CartState::Empty);
    assert!(session.current().is_placeholder());
}

#[tokio::test]
async fn create_then_get_round_trips() {
    let fake = FakeStorefront::new().with_basic_catalog();
    let session = memory_session(&fake);

    let created = session.create_cart().await.unwrap();
    let fetched = session.get_cart().await.unwrap().unwrap();

    assert_eq!(fetched, created);
    assert!(created.id.is_some());
    assert!(fetched.lines.is_empty());
    assert_eq!(fetched.total_quantity, 0);
    assert!(fetched.cost.total.is_zero());
    assert!(fetched.cost.subtotal.is_zero());
    assert!(fetched.cost.total_tax.is_zero());
    assert_eq!(session.store().get(), created.id);
    assert_eq!(session.state(), CartState::Ready);
}

#[tokio::test]
async fn missing_remote_cart_clears_stored_id() {
    let fake = FakeStorefront::new().with_basic_catalog();
    let session = memory_session(&fake);
    let cart = session.create_cart().await.unwrap();
    let cart_id = cart.id.unwrap();

    fake.delete_cart(&cart_id);

    assert!(session.get_cart().await.unwrap().is_none());
    assert_eq!(session.store().get(), None);
    assert_eq!(session.state(), CartState::Empty);

    let calls = fake.calls();
    assert!(session.get_cart().await.unwrap().is_none());
    assert_eq!(fake.calls(), calls, "no request once the ID is gone");
}

#[tokio::test]
async fn read_failures_degrade_to_no_cart() {
    for failure in [Failure::Network, Failure::Status(502), Failure::Malformed] {
        let fake = FakeStorefront::new().with_basic_catalog();
        let session = memory_session(&fake);
        session.create_cart().await.unwrap();

        fake.fail_next(failure);

        assert!(
            session.get_cart().await.unwrap().is_none(),
            "{failure:?} should read as no cart"
        );
        assert_eq!(session.store().get(), None);
    }
}

#[tokio::test]
async fn missing_tax_becomes_zero_in_total_currency() {
    let fake = FakeStorefront::new().with_basic_catalog();
    let session = memory_session(&fake);
    session.add_to_cart(&variant("tee"), 1).await.unwrap();

    fake.omit_tax(true);
    let cart = session.refresh().await.unwrap();

    assert_eq!(cart.cost.total_tax, Money::zero(cart.cost.total.currency_code.clone()));
    assert_eq!(cart.cost.total_tax.currency_code, "USD");
}

#[tokio::test]
async fn refresh_without_cart_is_placeholder() {
    let fake = FakeStorefront::new();
    let session = memory_session(&fake);

    let cart = session.refresh().await.unwrap();

    assert_eq!(cart, Cart::placeholder());
    assert_eq!(cart.cost.total, Money::new("0", "USD"));
    assert_eq!(session.checkout_url(), None);
}

// ============================================================================
// Writes
// ============================================================================

#[tokio::test]
async fn add_to_cart_creates_cart_and_persists_id() {
    let fake = FakeStorefront::new().with_basic_catalog();
    let session = memory_session(&fake);

    let cart = session.add_to_cart(&variant("mug"), 2).await.unwrap();

    assert_eq!(fake.operations(), vec!["CreateCart", "AddToCart"]);
    assert_eq!(session.store().get(), cart.id);
    assert_eq!(cart.lines.len(), 1);
    assert_eq!(cart.lines[0].merchandise.id, variant("mug"));
    assert_eq!(cart.lines[0].quantity.get(), 2);
    assert_eq!(cart.lines[0].merchandise.product.handle, "mug");
    assert_eq!(cart.cost.subtotal, Money::new("25", "USD"));
    assert_quantity_consistent(&cart);

    // A second add reuses the stored cart
    let cart = session.add_item(&variant("tee")).await.unwrap();
    assert_eq!(fake.operations().last().map(String::as_str), Some("AddToCart"));
    assert_eq!(fake.cart_count(), 1);
    assert_eq!(cart.total_quantity, 3);
    assert_quantity_consistent(&cart);
}

#[tokio::test]
async fn update_line_changes_only_that_line() {
    let fake = FakeStorefront::new().with_basic_catalog();
    let session = memory_session(&fake);
    session.add_to_cart(&variant("tee"), 1).await.unwrap();
    let before = session.add_to_cart(&variant("cap"), 2).await.unwrap();
    let tee = before.line_for_merchandise(&variant("tee")).unwrap().clone();
    let cap = before.line_for_merchandise(&variant("cap")).unwrap().clone();

    let after = session.update_cart_line(&tee.id, 3).await.unwrap();

    assert_eq!(after.line(&tee.id).unwrap().quantity.get(), 3);
    assert_eq!(after.line(&cap.id).unwrap(), &cap);
    assert_eq!(after.total_quantity, 5);
    assert_quantity_consistent(&after);
}

#[tokio::test]
async fn remove_line_drops_its_quantity() {
    let fake = FakeStorefront::new().with_basic_catalog();
    let session = memory_session(&fake);
    session.add_to_cart(&variant("tee"), 2).await.unwrap();
    let before = session.add_to_cart(&variant("mug"), 3).await.unwrap();
    let mug = before.line_for_merchandise(&variant("mug")).unwrap().clone();

    let after = session
        .remove_from_cart(&[mug.id.clone(), mug.id.clone()])
        .await
        .unwrap();

    assert!(after.line(&mug.id).is_none());
    assert_eq!(
        after.total_quantity,
        before.total_quantity - mug.quantity.get()
    );
    assert_quantity_consistent(&after);
}

#[tokio::test]
async fn adjust_line_steps_quantity() {
    let fake = FakeStorefront::new().with_basic_catalog();
    let session = memory_session(&fake);
    session.add_to_cart(&variant("tee"), 1).await.unwrap();

    let cart = session
        .adjust_line(&variant("tee"), Adjustment::Increment)
        .await
        .unwrap();
    assert_eq!(cart.total_quantity, 2);

    let cart = session
        .adjust_line(&variant("tee"), Adjustment::Decrement)
        .await
        .unwrap();
    assert_eq!(cart.total_quantity, 1);

    // Decrementing the last unit removes the line instead of setting zero
    let cart = session
        .adjust_line(&variant("tee"), Adjustment::Decrement)
        .await
        .unwrap();
    assert!(cart.lines.is_empty());
    assert_eq!(fake.operations().last().map(String::as_str), Some("RemoveFromCart"));

    let err = session
        .adjust_line(&variant("tee"), Adjustment::Remove)
        .await
        .unwrap_err();
    assert!(matches!(err, CartError::InvalidArgument(_)));
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn unconfigured_store_fails_every_operation() {
    let fake = FakeStorefront::unconfigured();
    let store = MemoryCartIdStore::with_cart_id(CartId::new("gid://shopify/Cart/c1"));
    let session = CartSession::new(StorefrontClient::new(fake.clone()), store);

    assert!(matches!(session.get_cart().await, Err(CartError::Configuration(_))));
    assert!(matches!(session.create_cart().await, Err(CartError::Configuration(_))));
    assert!(matches!(
        session.add_to_cart(&variant("tee"), 1).await,
        Err(CartError::Configuration(_))
    ));
    assert!(matches!(
        session
            .update_cart_line(&CartLineId::new("gid://shopify/CartLine/l1"), 2)
            .await,
        Err(CartError::Configuration(_))
    ));
    assert!(matches!(
        session.remove_from_cart(&[CartLineId::new("gid://shopify/CartLine/l1")]).await,
        Err(CartError::Configuration(_))
    ));

    assert_eq!(fake.calls(), 0);
    assert!(session.store().get().is_some());
}

#[tokio::test]
async fn mutation_transport_failure_surfaces_and_keeps_cart() {
    let fake = FakeStorefront::new().with_basic_catalog();
    let session = memory_session(&fake);
    let before = session.add_to_cart(&variant("tee"), 1).await.unwrap();

    fake.fail_next(Failure::Status(503));
    let err = session.add_to_cart(&variant("mug"), 1).await.unwrap_err();

    assert!(matches!(err, CartError::Transport(_)));
    assert_eq!(session.current(), before);
    assert_eq!(session.state(), CartState::Ready);
    assert_eq!(session.store().get(), before.id);
}

#[tokio::test]
async fn user_errors_surface_first_message() {
    let fake = FakeStorefront::new().with_basic_catalog();
    let session = memory_session(&fake);
    session.create_cart().await.unwrap();

    fake.reject_next_mutation("Only 2 items were added to your cart due to availability.");
    let err = session.add_to_cart(&variant("tee"), 5).await.unwrap_err();
    assert!(matches!(
        err,
        CartError::RemoteApi(ref m) if m == "Only 2 items were added to your cart due to availability."
    ));

    let err = session.add_to_cart(&variant("hat"), 1).await.unwrap_err();
    assert!(matches!(err, CartError::RemoteApi(ref m) if m.contains("does not exist")));
}

#[tokio::test]
async fn failed_create_persists_nothing() {
    let fake = FakeStorefront::new().with_basic_catalog();
    let session = memory_session(&fake);

    fake.fail_next(Failure::Network);
    let err = session.add_to_cart(&variant("tee"), 1).await.unwrap_err();

    assert!(matches!(err, CartError::Transport(_)));
    assert_eq!(session.store().get(), None);
    assert_eq!(fake.operations(), vec!["CreateCart"]);
}

#[tokio::test]
async fn operations_needing_a_cart_fail_without_one() {
    let fake = FakeStorefront::new().with_basic_catalog();
    let session = memory_session(&fake);

    assert!(matches!(
        session
            .update_cart_line(&CartLineId::new("gid://shopify/CartLine/l1"), 2)
            .await,
        Err(CartError::NoCart)
    ));
    assert!(matches!(
        session.remove_from_cart(&[CartLineId::new("gid://shopify/CartLine/l1")]).await,
        Err(CartError::NoCart)
    ));
    assert!(matches!(
        session.adjust_line(&variant("tee"), Adjustment::Increment).await,
        Err(CartError::NoCart)
    ));
    assert!(matches!(
        session.add_to_cart(&variant("tee"), -1).await,
        Err(CartError::InvalidArgument(_))
    ));
    assert_eq!(fake.calls(), 0);
}

// ============================================================================
// Stores
// ============================================================================

#[tokio::test]
async fn file_store_survives_new_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cart-id");
    let fake = FakeStorefront::new().with_basic_catalog();

    let first = CartSession::new(
        StorefrontClient::new(fake.clone()),
        FileCartIdStore::new(&path),
    );
    let cart = first.add_to_cart(&variant("cap"), 1).await.unwrap();

    // Next "page load"
    let second = CartSession::new(
        StorefrontClient::new(fake.clone()),
        FileCartIdStore::new(&path),
    );
    assert_eq!(second.state(), CartState::Uninitialized);
    let reloaded = second.get_cart().await.unwrap().unwrap();

    assert_eq!(reloaded, cart);
    assert_eq!(second.checkout_url(), cart.checkout_url().map(str::to_string));
}

#[tokio::test]
async fn sessions_sharing_a_store_see_the_same_cart() {
    let fake = FakeStorefront::new().with_basic_catalog();
    let store = Arc::new(MemoryCartIdStore::new());
    let tab_a = CartSession::new(StorefrontClient::new(fake.clone()), Arc::clone(&store));
    let tab_b = CartSession::new(StorefrontClient::new(fake.clone()), Arc::clone(&store));

    tab_a.add_to_cart(&variant("tee"), 1).await.unwrap();
    let cart = tab_b.add_to_cart(&variant("mug"), 1).await.unwrap();

    assert_eq!(fake.cart_count(), 1);
    assert_eq!(cart.lines.len(), 2);
}

#[tokio::test]
async fn detached_store_never_remembers_a_cart() {
    let fake = FakeStorefront::new().with_basic_catalog();
    let session = CartSession::new(StorefrontClient::new(fake.clone()), DetachedCartIdStore);

    let cart = session.add_to_cart(&variant("tee"), 1).await.unwrap();

    assert_eq!(cart.lines.len(), 1);
    assert!(session.get_cart().await.unwrap().is_none());
    assert_eq!(fake.operations(), vec!["CreateCart", "AddToCart"]);
}
