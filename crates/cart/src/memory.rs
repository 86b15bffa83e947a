use std::sync::Arc;

use async_trait::async_trait;
use common::{CartLineId, StoreError, UserId};
use tokio::sync::RwLock;

use crate::models::CartLine;
use crate::repository::CartRepository;

#[derive(Debug, Default)]
struct InMemoryCartState {
    lines: Vec<CartLine>,
    fail_reads: bool,
    fail_writes: bool,
}

/// In-memory cart line storage for testing and local runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCartRepository {
    state: Arc<RwLock<InMemoryCartState>>,
}

impl InMemoryCartRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every read fail with [`StoreError::Unavailable`].
    pub async fn set_fail_reads(&self, fail: bool) {
        self.state.write().await.fail_reads = fail;
    }

    /// Makes every write fail with [`StoreError::Unavailable`].
    pub async fn set_fail_writes(&self, fail: bool) {
        self.state.write().await.fail_writes = fail;
    }

    /// Returns the total number of stored lines across all users.
    pub async fn line_count(&self) -> usize {
        self.state.read().await.lines.len()
    }

    /// Stores a line without any validation, as a concurrent writer could.
    pub async fn insert_raw(&self, line: CartLine) {
        self.state.write().await.lines.push(line);
    }
}

fn write_guard(state: &InMemoryCartState) -> Result<(), StoreError> {
    if state.fail_writes {
        return Err(StoreError::unavailable("cart write failed"));
    }
    Ok(())
}

fn read_guard(state: &InMemoryCartState) -> Result<(), StoreError> {
    if state.fail_reads {
        return Err(StoreError::unavailable("cart read failed"));
    }
    Ok(())
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    async fn insert_line(&self, line: CartLine) -> Result<CartLine, StoreError> {
        let mut state = self.state.write().await;
        write_guard(&state)?;

        if state.lines.iter().any(|l| l.id == line.id) {
            return Err(StoreError::Duplicate {
                entity: "cart line",
                key: line.id.to_string(),
            });
        }

        state.lines.push(line.clone());
        Ok(line)
    }

    async fn get_line(&self, id: CartLineId) -> Result<Option<CartLine>, StoreError> {
        let state = self.state.read().await;
        read_guard(&state)?;
        Ok(state.lines.iter().find(|l| l.id == id).cloned())
    }

    async fn lines_for_user(&self, user: &UserId) -> Result<Vec<CartLine>, StoreError> {
        let state = self.state.read().await;
        read_guard(&state)?;
        Ok(state
            .lines
            .iter()
            .filter(|l| &l.user_id == user)
            .cloned()
            .collect())
    }

    async fn update_quantity(
        &self,
        id: CartLineId,
        quantity: u32,
    ) -> Result<Option<CartLine>, StoreError> {
        let mut state = self.state.write().await;
        write_guard(&state)?;

        Ok(state.lines.iter_mut().find(|l| l.id == id).map(|line| {
            line.quantity = quantity;
            line.clone()
        }))
    }

    async fn delete_line(&self, id: CartLineId) -> Result<Option<CartLine>, StoreError> {
        let mut state = self.state.write().await;
        write_guard(&state)?;

        let position = state.lines.iter().position(|l| l.id == id);
        Ok(position.map(|idx| state.lines.remove(idx)))
    }

    async fn delete_lines(&self, ids: &[CartLineId]) -> Result<usize, StoreError> {
        let mut state = self.state.write().await;
        write_guard(&state)?;

        let before = state.lines.len();
        state.lines.retain(|l| !ids.contains(&l.id));
        Ok(before - state.lines.len())
    }
}
