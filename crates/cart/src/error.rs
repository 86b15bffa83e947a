//! Cart error types.

use common::{CartLineId, ProductId, StoreError};
use thiserror::Error;

/// Errors that can occur during cart operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The product does not exist or is not available for purchase.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// The cart line does not exist.
    #[error("Cart line not found: {0}")]
    LineNotFound(CartLineId),

    /// Quantity below one.
    #[error("Invalid quantity: {quantity} (must be at least 1)")]
    InvalidQuantity { quantity: u32 },

    /// The requested total for a product would exceed its stock count.
    #[error("Only {available} of {product_name} available ({requested} requested)")]
    InsufficientStock {
        product_id: ProductId,
        product_name: String,
        requested: u64,
        available: u32,
    },

    /// The remote store failed.
    #[error("Data store error: {0}")]
    Store(#[from] StoreError),
}

impl CartError {
    /// Returns true for the not-found family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ProductNotFound(_) | Self::LineNotFound(_))
    }
}

/// Convenience type alias for cart results.
pub type Result<T> = std::result::Result<T, CartError>;
