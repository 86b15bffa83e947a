//! Collaborator traits for catalog and coupon access.

use async_trait::async_trait;
use common::{CouponId, ProductId, StoreError, StoreId};

use crate::models::{Coupon, Product, Store};

/// Read-only access to products and stores.
///
/// Every call is a round-trip to the remote store; callers must assume the
/// catalog may have changed between two calls.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// Fetches a product. Returns `None` if it does not exist.
    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, StoreError>;

    /// Fetches a store. Returns `None` if it does not exist.
    async fn get_store(&self, id: &StoreId) -> Result<Option<Store>, StoreError>;
}

/// Lookup of active coupons by code.
#[async_trait]
pub trait CouponReader: Send + Sync {
    /// Finds the active coupon whose code matches case-insensitively.
    async fn find_active_coupon_by_code(&self, code: &str) -> Result<Option<Coupon>, StoreError>;
}

/// The coupon usage counter, written once per placed order.
#[async_trait]
pub trait CouponLedger: Send + Sync {
    /// Counts one use of the coupon by the order `order_number`.
    ///
    /// Repeating the call for an order already counted is a no-op, so a
    /// retry after a lost acknowledgement cannot count the order twice.
    /// Fails with [`StoreError::Conflict`] if the usage limit has already been reached.
    async fn increment_coupon_usage(
        &self,
        id: &CouponId,
        order_number: &str,
    ) -> Result<(), StoreError>;
}
