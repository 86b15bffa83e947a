//! Shared types for the cart and checkout core.
//!
//! - Typed identifiers for users, products, stores, coupons and cart lines
//! - [`Money`] amounts in integer cents
//! - [`StoreError`] for failures of the remote data store

pub mod error;
pub mod money;
pub mod types;

pub use error::StoreError;
pub use money::Money;
pub use types::{CartLineId, CouponId, ProductId, StoreId, UserId};
