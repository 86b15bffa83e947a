//! Catalog records as exposed by the remote store.

use chrono::{DateTime, Utc};
use common::{CouponId, Money, ProductId, StoreId};
use serde::{Deserialize, Serialize};

/// A product offered by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Current unit price. Authoritative at checkout time.
    pub price: Money,
    pub store_id: StoreId,
    /// Units on hand. `None` means the product is not stock-tracked.
    pub stock_count: Option<u32>,
    pub is_available: bool,
}

impl Product {
    /// Creates an available, untracked-stock product.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Money,
        store_id: impl Into<StoreId>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            store_id: store_id.into(),
            stock_count: None,
            is_available: true,
        }
    }

    /// Sets a finite stock count.
    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock_count = Some(stock);
        self
    }

    /// Marks the product unavailable for purchase.
    pub fn unavailable(mut self) -> Self {
        self.is_available = false;
        self
    }

    /// Returns true if `requested` units fit within the stock count.
    pub fn has_stock_for(&self, requested: u64) -> bool {
        self.stock_count
            .is_none_or(|stock| requested <= u64::from(stock))
    }
}

/// A store (vendor) on the marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
}

impl Store {
    pub fn new(id: impl Into<StoreId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// How a coupon reduces the subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Discount {
    /// Takes `percent` percent off the subtotal.
    Percentage { percent: u32 },
    /// Takes a flat amount off the subtotal.
    FixedAmount { amount: Money },
}

/// A discount rule looked up by a case-insensitive code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: CouponId,
    pub code: String,
    pub is_active: bool,
    pub discount: Discount,
    pub minimum_purchase: Option<Money>,
    pub usage_limit: Option<u32>,
    pub times_used: u32,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Coupon {
    /// Creates an active coupon with no limits.
    pub fn new(id: impl Into<CouponId>, code: impl Into<String>, discount: Discount) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            is_active: true,
            discount,
            minimum_purchase: None,
            usage_limit: None,
            times_used: 0,
            expires_at: None,
        }
    }

    pub fn with_minimum_purchase(mut self, minimum: Money) -> Self {
        self.minimum_purchase = Some(minimum);
        self
    }

    pub fn with_usage_limit(mut self, limit: u32, times_used: u32) -> Self {
        self.usage_limit = Some(limit);
        self.times_used = times_used;
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Returns true if `code` names this coupon, ignoring case and surrounding whitespace.
    pub fn matches_code(&self, code: &str) -> bool {
        self.code.trim().to_lowercase() == code.trim().to_lowercase()
    }

    /// Returns true if the usage limit is set and has been reached.
    pub fn is_exhausted(&self) -> bool {
        self.usage_limit.is_some_and(|limit| self.times_used >= limit)
    }

    /// Returns true if the expiry is set and strictly before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| expires < now)
    }
}
