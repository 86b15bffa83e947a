//! Price quote shown on the cart and checkout pages.

use cart::ResolvedLine;
use catalog::Coupon;
use common::Money;
use serde::{Deserialize, Serialize};

use crate::engine::{compute_discount, compute_subtotal, compute_total};

/// Subtotal, optional coupon, discount and total for one cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub subtotal: Money,
    pub coupon: Option<Coupon>,
    pub discount: Money,
    pub total: Money,
}

impl PriceQuote {
    /// Quote with no coupon.
    pub fn for_subtotal(subtotal: Money) -> Self {
        Self {
            subtotal,
            coupon: None,
            discount: Money::zero(),
            total: compute_total(subtotal, Money::zero()),
        }
    }

    /// Quote for the given resolved lines with no coupon.
    pub fn for_lines(lines: &[ResolvedLine]) -> Self {
        Self::for_subtotal(compute_subtotal(lines))
    }

    /// Returns this quote with an already-validated coupon applied.
    pub fn with_coupon(self, coupon: Coupon) -> Self {
        let discount = compute_discount(Some(&coupon), self.subtotal);
        Self {
            subtotal: self.subtotal,
            total: compute_total(self.subtotal, discount),
            discount,
            coupon: Some(coupon),
        }
    }

    /// Returns this quote with any coupon removed. Needs no catalog access.
    pub fn without_coupon(self) -> Self {
        Self::for_subtotal(self.subtotal)
    }

    pub fn coupon_code(&self) -> Option<&str> {
        self.coupon.as_ref().map(|c| c.code.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::Discount;

    #[test]
    fn test_apply_then_remove_restores_pricing() {
        let original = PriceQuote::for_subtotal(Money::from_dollars(50));
        let coupon = Coupon::new("c1", "TEN", Discount::Percentage { percent: 10 });

        let discounted = original.clone().with_coupon(coupon);
        assert_eq!(discounted.discount, Money::from_dollars(5));
        assert_eq!(discounted.total, Money::from_dollars(45));
        assert_eq!(discounted.coupon_code(), Some("TEN"));

        let restored = discounted.without_coupon();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_fixed_coupon_larger_than_subtotal() {
        let coupon = Coupon::new(
            "c2",
            "THIRTY",
            Discount::FixedAmount {
                amount: Money::from_dollars(30),
            },
        );
        let quote = PriceQuote::for_subtotal(Money::from_dollars(20)).with_coupon(coupon);
        assert_eq!(quote.discount, Money::from_dollars(20));
        assert_eq!(quote.total, Money::zero());
    }

    #[test]
    fn test_empty_cart_quote() {
        let quote = PriceQuote::for_lines(&[]);
        assert_eq!(quote.subtotal, Money::zero());
        assert_eq!(quote.total, Money::zero());
        assert!(quote.coupon.is_none());
    }
}
