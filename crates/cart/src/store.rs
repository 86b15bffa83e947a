//! Stock-aware cart store.

use catalog::{CatalogReader, Product};
use common::{CartLineId, ProductId, UserId};
use futures_util::future::try_join_all;

use crate::changes::{CartChange, CartChangeKind, CartChangeStream, ChangeNotifier};
use crate::error::{CartError, Result};
use crate::models::{CartLine, ResolvedLine};
use crate::repository::CartRepository;

/// Owns a shopper's cart lines and keeps their quantities within stock.
///
/// Stock is read at the moment of each mutation and never reserved. Two
/// concurrent updates to different lines of the same product can both pass
/// against a stale count; stock is enforced at edit time only.
#[derive(Debug, Clone)]
pub struct CartStore<R, C>
where
    R: CartRepository,
    C: CatalogReader,
{
    repository: R,
    catalog: C,
    notifier: ChangeNotifier,
}

impl<R, C> CartStore<R, C>
where
    R: CartRepository,
    C: CatalogReader,
{
    /// Creates a new cart store over the given line storage and catalog.
    pub fn new(repository: R, catalog: C) -> Self {
        Self {
            repository,
            catalog,
            notifier: ChangeNotifier::new(),
        }
    }

    /// Returns a reference to the underlying line storage.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Returns a reference to the catalog used for resolution.
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Subscribes to changes committed by this store from now on.
    pub fn subscribe(&self) -> CartChangeStream {
        self.notifier.subscribe()
    }

    /// Adds `product_id` to the user's cart with quantity 1.
    ///
    /// If the user already has a line for the product, that line is returned
    /// unchanged; quantity changes go through [`CartStore::set_quantity`].
    #[tracing::instrument(skip(self))]
    pub async fn add_line(&self, user: &UserId, product_id: &ProductId) -> Result<CartLine> {
        let product = self.purchasable_product(product_id).await?;

        let existing = self.repository.lines_for_user(user).await?;
        if let Some(line) = existing.into_iter().find(|l| &l.product_id == product_id) {
            tracing::debug!(line_id = %line.id, "product already in cart");
            return Ok(line);
        }

        if !product.has_stock_for(1) {
            return Err(stock_error(&product, 1));
        }

        let line = self
            .repository
            .insert_line(CartLine::new(user.clone(), &product))
            .await?;

        metrics::counter!("cart_lines_added_total").increment(1);
        tracing::info!(line_id = %line.id, "cart line added");
        self.notifier.publish(CartChange::new(
            user.clone(),
            CartChangeKind::LineAdded { line_id: line.id },
        ));

        Ok(line)
    }

    /// Sets a line's quantity after checking the user's total for that
    /// product against its stock count.
    #[tracing::instrument(skip(self))]
    pub async fn set_quantity(&self, line_id: CartLineId, quantity: u32) -> Result<CartLine> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity { quantity });
        }

        let line = self
            .repository
            .get_line(line_id)
            .await?
            .ok_or(CartError::LineNotFound(line_id))?;

        let product = self.purchasable_product(&line.product_id).await?;

        if product.stock_count.is_some() {
            let requested: u64 = self
                .repository
                .lines_for_user(&line.user_id)
                .await?
                .iter()
                .filter(|l| l.product_id == line.product_id)
                .map(|l| {
                    if l.id == line_id {
                        u64::from(quantity)
                    } else {
                        u64::from(l.quantity)
                    }
                })
                .sum();

            if !product.has_stock_for(requested) {
                metrics::counter!("cart_stock_rejections_total").increment(1);
                tracing::warn!(
                    product_id = %product.id,
                    requested,
                    available = ?product.stock_count,
                    "quantity update rejected: insufficient stock"
                );
                return Err(stock_error(&product, requested));
            }
        }

        let updated = self
            .repository
            .update_quantity(line_id, quantity)
            .await?
            .ok_or(CartError::LineNotFound(line_id))?;

        metrics::counter!("cart_quantity_updates_total").increment(1);
        self.notifier.publish(CartChange::new(
            updated.user_id.clone(),
            CartChangeKind::QuantityChanged { line_id, quantity },
        ));

        Ok(updated)
    }

    /// Deletes a line. Deleting an absent line is not an error.
    #[tracing::instrument(skip(self))]
    pub async fn remove_line(&self, line_id: CartLineId) -> Result<()> {
        if let Some(line) = self.repository.delete_line(line_id).await? {
            self.notifier.publish(CartChange::new(
                line.user_id,
                CartChangeKind::LineRemoved { line_id },
            ));
        }
        Ok(())
    }

    /// Deletes the listed lines that belong to `user`. Returns how many were deleted.
    #[tracing::instrument(skip(self, ids), fields(requested = ids.len()))]
    pub async fn remove_lines(&self, user: &UserId, ids: &[CartLineId]) -> Result<usize> {
        let owned: Vec<CartLineId> = self
            .repository
            .lines_for_user(user)
            .await?
            .into_iter()
            .map(|l| l.id)
            .filter(|id| ids.contains(id))
            .collect();

        if owned.is_empty() {
            return Ok(0);
        }

        let count = self.repository.delete_lines(&owned).await?;
        self.notifier.publish(CartChange::new(
            user.clone(),
            CartChangeKind::LinesRemoved { count },
        ));
        Ok(count)
    }

    /// Deletes every line the user owns.
    #[tracing::instrument(skip(self))]
    pub async fn clear(&self, user: &UserId) -> Result<()> {
        let ids: Vec<CartLineId> = self
            .repository
            .lines_for_user(user)
            .await?
            .into_iter()
            .map(|l| l.id)
            .collect();

        self.repository.delete_lines(&ids).await?;
        self.notifier
            .publish(CartChange::new(user.clone(), CartChangeKind::Cleared));
        Ok(())
    }

    /// Returns the user's lines resolved against the live catalog.
    ///
    /// Lines whose product or store no longer resolves, or whose product is
    /// unavailable, are left out but not deleted, so a later catalog fix
    /// restores them.
    #[tracing::instrument(skip(self))]
    pub async fn list_lines(&self, user: &UserId) -> Result<Vec<ResolvedLine>> {
        let lines = self.repository.lines_for_user(user).await?;
        self.resolve_all(lines).await
    }

    /// Resolves the given lines against the live catalog, dropping the ones
    /// that no longer resolve.
    pub async fn resolve_all(&self, lines: Vec<CartLine>) -> Result<Vec<ResolvedLine>> {
        let resolved = try_join_all(lines.into_iter().map(|line| self.resolve(line))).await?;
        let total = resolved.len();
        let resolved: Vec<ResolvedLine> = resolved.into_iter().flatten().collect();

        if resolved.len() < total {
            tracing::debug!(
                unresolved = total - resolved.len(),
                "skipping cart lines that no longer resolve"
            );
        }

        Ok(resolved)
    }

    /// Sum of quantities over the user's resolved lines.
    pub async fn item_count(&self, user: &UserId) -> Result<u64> {
        Ok(self
            .list_lines(user)
            .await?
            .iter()
            .map(|l| u64::from(l.quantity()))
            .sum())
    }

    async fn resolve(&self, line: CartLine) -> Result<Option<ResolvedLine>> {
        let Some(product) = self.catalog.get_product(&line.product_id).await? else {
            return Ok(None);
        };
        if !product.is_available {
            return Ok(None);
        }
        let Some(store) = self.catalog.get_store(&product.store_id).await? else {
            return Ok(None);
        };

        Ok(Some(ResolvedLine {
            line,
            product,
            store,
        }))
    }

    async fn purchasable_product(&self, product_id: &ProductId) -> Result<Product> {
        self.catalog
            .get_product(product_id)
            .await?
            .filter(|p| p.is_available)
            .ok_or_else(|| CartError::ProductNotFound(product_id.clone()))
    }
}

fn stock_error(product: &Product, requested: u64) -> CartError {
    CartError::InsufficientStock {
        product_id: product.id.clone(),
        product_name: product.name.clone(),
        requested,
        available: product.stock_count.unwrap_or(0),
    }
}
