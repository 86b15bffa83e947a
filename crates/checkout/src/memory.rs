//! In-memory order store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use catalog::CouponLedger;
use common::{CouponId, StoreError, UserId};
use tokio::sync::RwLock;

use crate::order::{Order, OrderNumber};
use crate::store::OrderStore;

#[derive(Debug, Default)]
struct InMemoryOrderState {
    orders: HashMap<OrderNumber, Order>,
    fail_on_create: bool,
}

/// In-memory order store for testing and local runs.
///
/// Coupon increments are forwarded to the given ledger.
#[derive(Debug, Clone)]
pub struct InMemoryOrderStore<L: CouponLedger> {
    state: Arc<RwLock<InMemoryOrderState>>,
    ledger: L,
}

impl<L: CouponLedger> InMemoryOrderStore<L> {
    /// Creates an empty order store.
    pub fn new(ledger: L) -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryOrderState::default())),
            ledger,
        }
    }

    /// Configures the store to fail every `create_order` call.
    pub async fn set_fail_on_create(&self, fail: bool) {
        self.state.write().await.fail_on_create = fail;
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }
}

#[async_trait]
impl<L: CouponLedger> OrderStore for InMemoryOrderStore<L> {
    async fn create_order(&self, order: Order) -> Result<Order, StoreError> {
        let mut state = self.state.write().await;

        if state.fail_on_create {
            return Err(StoreError::unavailable("order write failed"));
        }

        if state.orders.contains_key(order.order_number()) {
            return Err(StoreError::Duplicate {
                entity: "order number",
                key: order.order_number().to_string(),
            });
        }

        state
            .orders
            .insert(order.order_number().clone(), order.clone());
        Ok(order)
    }

    async fn get_order(&self, number: &OrderNumber) -> Result<Option<Order>, StoreError> {
        Ok(self.state.read().await.orders.get(number).cloned())
    }

    async fn orders_for_user(&self, user: &UserId) -> Result<Vec<Order>, StoreError> {
        let state = self.state.read().await;
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|o| o.user_id() == user)
            .cloned()
            .collect();
        orders.sort_by_key(|o| std::cmp::Reverse(o.created_at()));
        Ok(orders)
    }

    async fn increment_coupon_usage(
        &self,
        coupon_id: &CouponId,
        order_number: &OrderNumber,
    ) -> Result<(), StoreError> {
        self.ledger
            .increment_coupon_usage(coupon_id, order_number.as_str())
            .await
    }
}
