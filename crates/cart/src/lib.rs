//! Cart store for the marketplace.
//!
//! This crate owns a shopper's cart lines and keeps them consistent with
//! live product stock:
//! - [`CartStore`] with stock-aware add, quantity update, removal and listing
//! - [`CartRepository`] trait for the remote line storage, with an in-memory implementation
//! - [`CartChange`] notifications delivered through [`CartStore::subscribe`]
//! - [`CartView`] for optimistic client-side edits with rollback on failure

pub mod changes;
pub mod error;
pub mod memory;
pub mod models;
pub mod repository;
pub mod store;
pub mod view;

pub use changes::{CartChange, CartChangeKind, CartChangeStream};
pub use error::{CartError, Result};
pub use memory::InMemoryCartRepository;
pub use models::{CartLine, ResolvedLine};
pub use repository::CartRepository;
pub use store::CartStore;
pub use view::{CartMutation, CartView};
