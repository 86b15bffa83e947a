//! Optimistic client-side cart view.

use catalog::CatalogReader;
use common::{CartLineId, UserId};

use crate::error::Result;
use crate::models::ResolvedLine;
use crate::repository::CartRepository;
use crate::store::CartStore;

/// A mutation a shopper makes from the cart page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartMutation {
    SetQuantity { line_id: CartLineId, quantity: u32 },
    Remove { line_id: CartLineId },
}

impl CartMutation {
    pub fn line_id(&self) -> CartLineId {
        match self {
            Self::SetQuantity { line_id, .. } | Self::Remove { line_id } => *line_id,
        }
    }
}

/// A shopper's local copy of their resolved cart.
///
/// Mutations go through [`CartView::execute`], which shows the new value
/// immediately and restores the pre-call snapshot if the store rejects it.
/// The stock invariant relies on that rollback: a view must never keep a
/// quantity the store refused.
#[derive(Debug, Clone)]
pub struct CartView {
    user_id: UserId,
    lines: Vec<ResolvedLine>,
}

impl CartView {
    /// Loads the user's current cart.
    pub async fn load<R, C>(store: &CartStore<R, C>, user_id: UserId) -> Result<Self>
    where
        R: CartRepository,
        C: CatalogReader,
    {
        let lines = store.list_lines(&user_id).await?;
        Ok(Self { user_id, lines })
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn lines(&self) -> &[ResolvedLine] {
        &self.lines
    }

    /// Quantity currently shown for a line.
    pub fn quantity_of(&self, line_id: CartLineId) -> Option<u32> {
        self.lines
            .iter()
            .find(|l| l.id() == line_id)
            .map(ResolvedLine::quantity)
    }

    /// Sum of shown quantities.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity())).sum()
    }

    /// Applies `mutation` locally, then against the store.
    ///
    /// On success the local value stands. On any failure the view is
    /// restored to exactly what it showed before the call and the typed
    /// error is returned for user-facing messaging.
    #[tracing::instrument(skip(self, store), fields(user_id = %self.user_id))]
    pub async fn execute<R, C>(
        &mut self,
        store: &CartStore<R, C>,
        mutation: CartMutation,
    ) -> Result<()>
    where
        R: CartRepository,
        C: CatalogReader,
    {
        let snapshot = self.lines.clone();
        self.apply_local(mutation);

        let outcome = match mutation {
            CartMutation::SetQuantity { line_id, quantity } => {
                store.set_quantity(line_id, quantity).await.map(|_| ())
            }
            CartMutation::Remove { line_id } => store.remove_line(line_id).await,
        };

        if let Err(err) = outcome {
            tracing::debug!(error = %err, "rolling back optimistic cart update");
            self.lines = snapshot;
            return Err(err);
        }

        Ok(())
    }

    /// Replaces the local copy with the store's current state.
    pub async fn refresh<R, C>(&mut self, store: &CartStore<R, C>) -> Result<()>
    where
        R: CartRepository,
        C: CatalogReader,
    {
        self.lines = store.list_lines(&self.user_id).await?;
        Ok(())
    }

    fn apply_local(&mut self, mutation: CartMutation) {
        match mutation {
            CartMutation::SetQuantity { line_id, quantity } => {
                if let Some(line) = self.lines.iter_mut().find(|l| l.id() == line_id) {
                    line.line.quantity = quantity;
                }
            }
            CartMutation::Remove { line_id } => {
                self.lines.retain(|l| l.id() != line_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CartError;
    use crate::memory::InMemoryCartRepository;
    use catalog::{InMemoryCatalog, Product, Store};
    use common::Money;

    async fn setup() -> (
        CartStore<InMemoryCartRepository, InMemoryCatalog>,
        InMemoryCartRepository,
        CartLineId,
    ) {
        let catalog = InMemoryCatalog::new();
        catalog.upsert_store(Store::new("s1", "Bakery")).await;
        catalog
            .upsert_product(
                Product::new("pie", "Pie", Money::from_cents(1200), "s1").with_stock(2),
            )
            .await;
        let repository = InMemoryCartRepository::new();
        let store = CartStore::new(repository.clone(), catalog);
        let line = store
            .add_line(&UserId::new("ann"), &"pie".into())
            .await
            .unwrap();
        (store, repository, line.id)
    }

    #[tokio::test]
    async fn test_successful_update_commits_local_value() {
        let (store, _, line_id) = setup().await;
        let mut view = CartView::load(&store, UserId::new("ann")).await.unwrap();

        view.execute(&store, CartMutation::SetQuantity { line_id, quantity: 2 })
            .await
            .unwrap();
        assert_eq!(view.quantity_of(line_id), Some(2));
    }

    #[tokio::test]
    async fn test_stock_rejection_rolls_back() {
        let (store, _, line_id) = setup().await;
        let mut view = CartView::load(&store, UserId::new("ann")).await.unwrap();

        let result = view
            .execute(&store, CartMutation::SetQuantity { line_id, quantity: 5 })
            .await;
        assert!(matches!(result, Err(CartError::InsufficientStock { .. })));
        assert_eq!(view.quantity_of(line_id), Some(1));
    }

    #[tokio::test]
    async fn test_transport_failure_rolls_back_removal() {
        let (store, repository, line_id) = setup().await;
        let mut view = CartView::load(&store, UserId::new("ann")).await.unwrap();

        repository.set_fail_writes(true).await;
        let result = view.execute(&store, CartMutation::Remove { line_id }).await;
        assert!(matches!(result, Err(CartError::Store(_))));
        assert_eq!(view.lines().len(), 1);
        assert_eq!(view.item_count(), 1);
    }

    #[tokio::test]
    async fn test_refresh_picks_up_external_changes() {
        let (store, _, line_id) = setup().await;
        let mut view = CartView::load(&store, UserId::new("ann")).await.unwrap();

        store.set_quantity(line_id, 2).await.unwrap();
        assert_eq!(view.quantity_of(line_id), Some(1));

        view.refresh(&store).await.unwrap();
        assert_eq!(view.quantity_of(line_id), Some(2));
    }
}
