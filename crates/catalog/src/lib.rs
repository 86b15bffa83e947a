//! Catalog access for the cart and checkout core.
//!
//! This crate provides the read side of the remote catalog:
//! - [`CatalogReader`] for products and stores
//! - [`CouponReader`] for active coupons looked up by code
//! - [`CouponLedger`] for the single coupon write checkout performs
//! - [`InMemoryCatalog`] implementing all three for tests and local runs

pub mod memory;
pub mod models;
pub mod reader;

pub use memory::InMemoryCatalog;
pub use models::{Coupon, Discount, Product, Store};
pub use reader::{CatalogReader, CouponLedger, CouponReader};
