//! Checkout error types.

use cart::CartError;
use pricing::PricingError;
use thiserror::Error;

use crate::follow_up::FollowUp;
use crate::order::OrderNumber;

/// Errors that stop a checkout before an order exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// A required shipping field is blank.
    #[error("Shipping {field} is required")]
    InvalidShippingInfo { field: &'static str },

    /// No payment method label was given.
    #[error("Payment method is required")]
    MissingPaymentMethod,

    /// None of the submitted lines resolved to a purchasable product.
    #[error("Cart has no purchasable items")]
    EmptyCart,

    /// Resolving the cart failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// The coupon no longer validates against the fresh subtotal.
    #[error("{0}")]
    Pricing(#[from] PricingError),

    /// The order could not be written. Nothing else was changed.
    #[error("Order could not be created: {reason}")]
    OrderCreationFailed { reason: String },
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;

/// A follow-up that still failed after its retries.
///
/// The order it belongs to exists; the shopper is told the checkout
/// succeeded and this is reconciled out of band.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Order {order_number} placed but {follow_up} failed after {attempts} attempt(s): {reason}")]
pub struct PartialCommitWarning {
    pub order_number: OrderNumber,
    pub follow_up: FollowUp,
    pub attempts: u32,
    pub reason: String,
}
