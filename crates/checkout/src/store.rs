//! Persistence used by checkout.

use async_trait::async_trait;
use common::{CouponId, StoreError, UserId};

use crate::order::{Order, OrderNumber};

/// Order persistence and the coupon counter write.
///
/// Each call is a single remote call with its own outcome; there is no
/// transaction spanning calls. Cart line deletion goes through the cart
/// store's repository.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Writes the order as one logical record.
    ///
    /// Must fail with [`StoreError::Duplicate`] if the order number is taken.
    async fn create_order(&self, order: Order) -> Result<Order, StoreError>;

    /// Fetches an order by number.
    async fn get_order(&self, number: &OrderNumber) -> Result<Option<Order>, StoreError>;

    /// Returns a buyer's orders, newest first.
    async fn orders_for_user(&self, user: &UserId) -> Result<Vec<Order>, StoreError>;

    /// Counts one use of a coupon by `order_number`.
    ///
    /// Must be idempotent per order: repeating the call for an order already
    /// counted leaves the counter unchanged.
    async fn increment_coupon_usage(
        &self,
        coupon_id: &CouponId,
        order_number: &OrderNumber,
    ) -> Result<(), StoreError>;
}
