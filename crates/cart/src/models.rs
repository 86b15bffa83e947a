//! Cart line records.

use catalog::{Product, Store};
use chrono::{DateTime, Utc};
use common::{CartLineId, Money, ProductId, UserId};
use serde::{Deserialize, Serialize};

/// One row per (user, product) the user intends to purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: CartLineId,
    pub user_id: UserId,
    pub product_id: ProductId,
    /// Always at least 1; a line is deleted rather than set to 0.
    pub quantity: u32,
    /// Price when the line was added. Informational only.
    pub price_snapshot: Money,
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Creates a quantity-1 line for `product`.
    pub fn new(user_id: UserId, product: &Product) -> Self {
        Self {
            id: CartLineId::new(),
            user_id,
            product_id: product.id.clone(),
            quantity: 1,
            price_snapshot: product.price,
            added_at: Utc::now(),
        }
    }
}

/// A cart line whose product and store both resolve against the live catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLine {
    pub line: CartLine,
    pub product: Product,
    pub store: Store,
}

impl ResolvedLine {
    /// Current catalog price times quantity.
    pub fn line_total(&self) -> Money {
        self.product.price.multiply(self.line.quantity)
    }

    pub fn id(&self) -> CartLineId {
        self.line.id
    }

    pub fn quantity(&self) -> u32 {
        self.line.quantity
    }
}
