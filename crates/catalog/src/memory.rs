use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use common::{CouponId, ProductId, StoreError, StoreId};
use tokio::sync::RwLock;

use crate::models::{Coupon, Product, Store};
use crate::reader::{CatalogReader, CouponLedger, CouponReader};

#[derive(Debug, Default)]
struct CatalogState {
    products: HashMap<ProductId, Product>,
    stores: HashMap<StoreId, Store>,
    coupons: HashMap<CouponId, Coupon>,
    /// Orders already counted against each coupon.
    redemptions: HashSet<(CouponId, String)>,
    fail_reads: bool,
    fail_on_increment: bool,
}

/// In-memory catalog for testing and local runs.
///
/// Also exposes the store-owner and inventory hooks (upserts, stock changes,
/// removals) that external collaborators perform against the real store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    state: Arc<RwLock<CatalogState>>,
}

impl InMemoryCatalog {
    /// Creates an empty in-memory catalog.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert_product(&self, product: Product) {
        let mut state = self.state.write().await;
        state.products.insert(product.id.clone(), product);
    }

    pub async fn remove_product(&self, id: &ProductId) {
        self.state.write().await.products.remove(id);
    }

    /// Changes a product's stock count, as the inventory collaborator would.
    pub async fn set_stock(&self, id: &ProductId, stock: Option<u32>) {
        if let Some(product) = self.state.write().await.products.get_mut(id) {
            product.stock_count = stock;
        }
    }

    pub async fn upsert_store(&self, store: Store) {
        let mut state = self.state.write().await;
        state.stores.insert(store.id.clone(), store);
    }

    pub async fn upsert_coupon(&self, coupon: Coupon) {
        let mut state = self.state.write().await;
        state.coupons.insert(coupon.id.clone(), coupon);
    }

    /// Returns a coupon by record id regardless of its active flag.
    pub async fn coupon(&self, id: &CouponId) -> Option<Coupon> {
        self.state.read().await.coupons.get(id).cloned()
    }

    /// Makes every read fail with [`StoreError::Unavailable`].
    pub async fn set_fail_reads(&self, fail: bool) {
        self.state.write().await.fail_reads = fail;
    }

    /// Makes coupon usage increments fail with [`StoreError::Unavailable`].
    pub async fn set_fail_on_increment(&self, fail: bool) {
        self.state.write().await.fail_on_increment = fail;
    }
}

#[async_trait]
impl CatalogReader for InMemoryCatalog {
    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        let state = self.state.read().await;
        if state.fail_reads {
            return Err(StoreError::unavailable("catalog read failed"));
        }
        Ok(state.products.get(id).cloned())
    }

    async fn get_store(&self, id: &StoreId) -> Result<Option<Store>, StoreError> {
        let state = self.state.read().await;
        if state.fail_reads {
            return Err(StoreError::unavailable("catalog read failed"));
        }
        Ok(state.stores.get(id).cloned())
    }
}

#[async_trait]
impl CouponReader for InMemoryCatalog {
    async fn find_active_coupon_by_code(&self, code: &str) -> Result<Option<Coupon>, StoreError> {
        let state = self.state.read().await;
        if state.fail_reads {
            return Err(StoreError::unavailable("coupon read failed"));
        }
        Ok(state
            .coupons
            .values()
            .find(|c| c.is_active && c.matches_code(code))
            .cloned())
    }
}

#[async_trait]
impl CouponLedger for InMemoryCatalog {
    async fn increment_coupon_usage(
        &self,
        id: &CouponId,
        order_number: &str,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if state.fail_on_increment {
            return Err(StoreError::unavailable("coupon increment failed"));
        }

        let redemption = (id.clone(), order_number.to_string());
        if state.redemptions.contains(&redemption) {
            tracing::debug!(coupon_id = %id, order_number, "order already counted for coupon");
            return Ok(());
        }

        let coupon = state
            .coupons
            .get_mut(id)
            .ok_or_else(|| StoreError::Conflict(format!("coupon {id} no longer exists")))?;

        if coupon.is_exhausted() {
            return Err(StoreError::Conflict(format!(
                "coupon {} has reached its usage limit",
                coupon.code
            )));
        }

        coupon.times_used += 1;
        tracing::debug!(coupon_id = %id, times_used = coupon.times_used, "coupon usage incremented");
        state.redemptions.insert(redemption);
        Ok(())
    }
}
