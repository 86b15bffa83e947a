//! Integration tests for the cart store.
//!
//! These drive the store through the in-memory collaborators and check the
//! stock invariant across sequences of edits, including concurrent ones.

use std::sync::Arc;

use cart::{CartError, CartMutation, CartStore, CartView, InMemoryCartRepository};
use catalog::{CatalogReader, InMemoryCatalog, Product, Store};
use common::{Money, ProductId, UserId};
use futures_util::StreamExt;

type TestStore = CartStore<InMemoryCartRepository, InMemoryCatalog>;

struct TestHarness {
    store: Arc<TestStore>,
    catalog: InMemoryCatalog,
}

impl TestHarness {
    async fn new() -> Self {
        let catalog = InMemoryCatalog::new();
        catalog.upsert_store(Store::new("farm", "Hill Farm")).await;
        catalog
            .upsert_product(
                Product::new("honey", "Honey", Money::from_cents(900), "farm").with_stock(5),
            )
            .await;
        catalog
            .upsert_product(
                Product::new("jam", "Jam", Money::from_cents(650), "farm").with_stock(1),
            )
            .await;

        let store = Arc::new(CartStore::new(
            InMemoryCartRepository::new(),
            catalog.clone(),
        ));
        Self { store, catalog }
    }

    async fn quantity_in_cart(&self, user: &UserId, product: &str) -> u64 {
        self.store
            .list_lines(user)
            .await
            .unwrap()
            .iter()
            .filter(|l| l.product.id.as_str() == product)
            .map(|l| u64::from(l.quantity()))
            .sum()
    }
}

#[tokio::test]
async fn test_successful_edits_never_exceed_stock() {
    let h = TestHarness::new().await;
    let user = UserId::new("ann@example.com");
    let line = h.store.add_line(&user, &"honey".into()).await.unwrap();

    for quantity in [2, 7, 5, 6, 1, 9, 4, 0, 3] {
        let _ = h.store.set_quantity(line.id, quantity).await;
        let in_cart = h.quantity_in_cart(&user, "honey").await;
        assert!(in_cart <= 5, "cart holds {in_cart} honey, stock is 5");
        assert!(in_cart >= 1);
    }

    assert_eq!(h.quantity_in_cart(&user, "honey").await, 3);
}

#[tokio::test]
async fn test_stock_error_names_the_constraint() {
    let h = TestHarness::new().await;
    let user = UserId::new("ann@example.com");
    let line = h.store.add_line(&user, &"jam".into()).await.unwrap();

    let err = h.store.set_quantity(line.id, 2).await.unwrap_err();
    assert_eq!(err.to_string(), "Only 1 of Jam available (2 requested)");
}

#[tokio::test]
async fn test_stock_drop_after_add_blocks_increase_only() {
    let h = TestHarness::new().await;
    let user = UserId::new("ann@example.com");
    let line = h.store.add_line(&user, &"honey".into()).await.unwrap();
    h.store.set_quantity(line.id, 4).await.unwrap();

    h.catalog.set_stock(&"honey".into(), Some(2)).await;

    let result = h.store.set_quantity(line.id, 3).await;
    assert!(matches!(result, Err(CartError::InsufficientStock { .. })));
    h.store.set_quantity(line.id, 2).await.unwrap();
}

#[tokio::test]
async fn test_concurrent_shoppers_each_bounded_by_stock() {
    let h = TestHarness::new().await;
    let mut handles = Vec::new();

    for n in 0..8 {
        let store = h.store.clone();
        handles.push(tokio::spawn(async move {
            let user = UserId::new(format!("shopper-{n}"));
            let line = store.add_line(&user, &"honey".into()).await?;
            store.set_quantity(line.id, 5).await?;
            Ok::<_, CartError>(user)
        }));
    }

    for handle in handles {
        let user = handle.await.unwrap().unwrap();
        assert_eq!(h.quantity_in_cart(&user, "honey").await, 5);
    }
}

#[tokio::test]
async fn test_view_rollback_keeps_invariant() {
    let h = TestHarness::new().await;
    let user = UserId::new("ann@example.com");
    let line = h.store.add_line(&user, &"jam".into()).await.unwrap();
    let mut view = CartView::load(h.store.as_ref(), user.clone()).await.unwrap();

    let result = view
        .execute(
            h.store.as_ref(),
            CartMutation::SetQuantity {
                line_id: line.id,
                quantity: 3,
            },
        )
        .await;

    assert!(result.is_err());
    assert_eq!(view.quantity_of(line.id), Some(1));
    assert_eq!(h.quantity_in_cart(&user, "jam").await, 1);
}

#[tokio::test]
async fn test_cart_badge_follows_change_stream() {
    let h = TestHarness::new().await;
    let user = UserId::new("ann@example.com");
    let mut changes = h.store.subscribe();

    let honey = h.store.add_line(&user, &"honey".into()).await.unwrap();
    h.store.add_line(&user, &"jam".into()).await.unwrap();
    h.store.set_quantity(honey.id, 3).await.unwrap();

    let mut badge = 0;
    for _ in 0..3 {
        let change = changes.next().await.unwrap();
        assert_eq!(change.user_id, user);
        badge = h.store.item_count(&change.user_id).await.unwrap();
    }
    assert_eq!(badge, 4);
}

#[tokio::test]
async fn test_deleted_product_line_is_hidden_then_restored() {
    let h = TestHarness::new().await;
    let user = UserId::new("ann@example.com");
    h.store.add_line(&user, &"jam".into()).await.unwrap();

    let jam_id = ProductId::new("jam");
    let jam = h.catalog.get_product(&jam_id).await.unwrap().unwrap();
    h.catalog.remove_product(&jam_id).await;
    assert!(h.store.list_lines(&user).await.unwrap().is_empty());

    h.catalog.upsert_product(jam).await;
    assert_eq!(h.store.list_lines(&user).await.unwrap().len(), 1);
}
