//! Remote storage for cart lines.

use async_trait::async_trait;
use common::{CartLineId, StoreError, UserId};

use crate::models::CartLine;

/// Create/read/update/delete access to cart lines in the remote store.
///
/// Each call is an independent round-trip. The store guarantees
/// last-write-wins per line id and nothing across lines.
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Persists a new line.
    async fn insert_line(&self, line: CartLine) -> Result<CartLine, StoreError>;

    /// Fetches a line. Returns `None` if it does not exist.
    async fn get_line(&self, id: CartLineId) -> Result<Option<CartLine>, StoreError>;

    /// Returns every line owned by `user`, oldest first.
    async fn lines_for_user(&self, user: &UserId) -> Result<Vec<CartLine>, StoreError>;

    /// Overwrites a line's quantity. Returns `None` if the line is gone.
    async fn update_quantity(
        &self,
        id: CartLineId,
        quantity: u32,
    ) -> Result<Option<CartLine>, StoreError>;

    /// Deletes a line, returning it if it existed.
    async fn delete_line(&self, id: CartLineId) -> Result<Option<CartLine>, StoreError>;

    /// Deletes every listed line that exists. Returns how many were deleted.
    async fn delete_lines(&self, ids: &[CartLineId]) -> Result<usize, StoreError>;
}
