//! Pricing error types.

use chrono::{DateTime, Utc};
use common::{Money, StoreError};
use thiserror::Error;

/// Errors that can occur while validating a coupon.
///
/// Each variant names the constraint the shopper has to correct.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    /// No active coupon matches the code.
    #[error("Coupon code '{code}' is not valid")]
    CouponNotFound { code: String },

    /// The subtotal is below the coupon's minimum purchase.
    #[error("Minimum purchase of {minimum} required for this coupon")]
    MinimumPurchaseNotMet { minimum: Money, subtotal: Money },

    /// The coupon has been used as many times as allowed.
    #[error("Coupon has reached its usage limit of {limit}")]
    UsageLimitReached { limit: u32 },

    /// The coupon's expiry is in the past.
    #[error("Coupon has expired")]
    CouponExpired { expired_at: DateTime<Utc> },

    /// The coupon lookup failed.
    #[error("Data store error: {0}")]
    Store(#[from] StoreError),
}

impl PricingError {
    /// Returns true for validation failures the shopper can act on.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Store(_))
    }
}

/// Convenience type alias for pricing results.
pub type Result<T> = std::result::Result<T, PricingError>;
