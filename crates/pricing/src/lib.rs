//! Pricing engine for carts.
//!
//! Computes the subtotal of a resolved cart from live catalog prices,
//! validates coupons, and derives discount and total:
//! - [`PricingEngine`] for coupon lookup and validation
//! - [`compute_subtotal`], [`compute_discount`], [`compute_total`] as pure functions
//! - [`PriceQuote`] for the apply/remove coupon round-trip

pub mod engine;
pub mod error;
pub mod quote;

pub use engine::{PricingEngine, compute_discount, compute_subtotal, compute_total};
pub use error::{PricingError, Result};
pub use quote::PriceQuote;
