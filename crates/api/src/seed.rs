//! Demo catalog for local runs.

use catalog::{Coupon, Discount, InMemoryCatalog, Product, Store};
use common::Money;

/// Loads two stores, a handful of products and two coupons.
pub async fn seed_demo_catalog(catalog: &InMemoryCatalog) {
    catalog
        .upsert_store(Store::new("hill-farm", "Hill Farm Stand"))
        .await;
    catalog
        .upsert_store(Store::new("main-st-bakery", "Main St Bakery"))
        .await;

    let products = [
        Product::new("honey-16oz", "Wildflower Honey", Money::from_cents(1200), "hill-farm")
            .with_stock(24),
        Product::new("eggs-dozen", "Farm Eggs (dozen)", Money::from_cents(550), "hill-farm")
            .with_stock(40),
        Product::new("sourdough", "Sourdough Loaf", Money::from_cents(800), "main-st-bakery")
            .with_stock(12),
        Product::new("gift-card", "Bakery Gift Card", Money::from_dollars(25), "main-st-bakery"),
    ];
    for product in products {
        catalog.upsert_product(product).await;
    }

    catalog
        .upsert_coupon(
            Coupon::new("welcome10", "WELCOME10", Discount::Percentage { percent: 10 })
                .with_usage_limit(100, 0),
        )
        .await;
    catalog
        .upsert_coupon(
            Coupon::new(
                "five-off",
                "FIVEOFF",
                Discount::FixedAmount {
                    amount: Money::from_dollars(5),
                },
            )
            .with_minimum_purchase(Money::from_dollars(30)),
        )
        .await;

    tracing::info!("demo catalog loaded");
}
