//! Coupon validation and total computation.

use cart::ResolvedLine;
use catalog::{Coupon, CouponReader, Discount};
use chrono::{DateTime, Utc};
use common::Money;

use crate::error::{PricingError, Result};

/// Sum of current catalog price times quantity over resolved lines.
///
/// Takes the same resolved set the cart displays, so lines that no longer
/// resolve contribute nothing and are never counted twice.
pub fn compute_subtotal(lines: &[ResolvedLine]) -> Money {
    lines.iter().map(ResolvedLine::line_total).sum()
}

/// Discount a coupon grants on `subtotal`. Never exceeds the subtotal.
pub fn compute_discount(coupon: Option<&Coupon>, subtotal: Money) -> Money {
    let Some(coupon) = coupon else {
        return Money::zero();
    };

    let discount = match coupon.discount {
        Discount::Percentage { percent } => subtotal.percent(percent),
        Discount::FixedAmount { amount } => amount,
    };

    discount.max(Money::zero()).min(subtotal.max(Money::zero()))
}

/// `max(0, subtotal - discount)`.
pub fn compute_total(subtotal: Money, discount: Money) -> Money {
    subtotal.saturating_sub(discount)
}

/// Looks up and validates coupons against a subtotal.
#[derive(Debug, Clone)]
pub struct PricingEngine<R: CouponReader> {
    coupons: R,
}

impl<R: CouponReader> PricingEngine<R> {
    /// Creates a new pricing engine over the given coupon reader.
    pub fn new(coupons: R) -> Self {
        Self { coupons }
    }

    /// Validates `code` for `subtotal` as of now.
    pub async fn apply_coupon(&self, code: &str, subtotal: Money) -> Result<Coupon> {
        self.apply_coupon_at(code, subtotal, Utc::now()).await
    }

    /// Validates `code` for `subtotal` as of `now`.
    ///
    /// Does not touch the usage counter; that only moves when an order is placed.
    #[tracing::instrument(skip(self))]
    pub async fn apply_coupon_at(
        &self,
        code: &str,
        subtotal: Money,
        now: DateTime<Utc>,
    ) -> Result<Coupon> {
        let result = self.validate(code, subtotal, now).await;

        match &result {
            Ok(coupon) => tracing::debug!(coupon = %coupon.code, "coupon accepted"),
            Err(err) if err.is_validation() => {
                metrics::counter!("pricing_coupon_rejections_total").increment(1);
                tracing::info!(error = %err, "coupon rejected");
            }
            Err(_) => {}
        }

        result
    }

    async fn validate(&self, code: &str, subtotal: Money, now: DateTime<Utc>) -> Result<Coupon> {
        let coupon = self
            .coupons
            .find_active_coupon_by_code(code)
            .await?
            .filter(|c| c.is_active)
            .ok_or_else(|| PricingError::CouponNotFound {
                code: code.trim().to_string(),
            })?;

        if let Some(expired_at) = coupon.expires_at.filter(|_| coupon.is_expired_at(now)) {
            return Err(PricingError::CouponExpired { expired_at });
        }

        if let Some(limit) = coupon.usage_limit.filter(|_| coupon.is_exhausted()) {
            return Err(PricingError::UsageLimitReached { limit });
        }

        if let Some(minimum) = coupon.minimum_purchase
            && subtotal < minimum
        {
            return Err(PricingError::MinimumPurchaseNotMet { minimum, subtotal });
        }

        Ok(coupon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{InMemoryCatalog, Product, Store};
    use chrono::Duration;
    use common::UserId;

    fn percent(p: u32) -> Coupon {
        Coupon::new("c-pct", "TENOFF", Discount::Percentage { percent: p })
    }

    fn fixed(cents: i64) -> Coupon {
        Coupon::new(
            "c-fixed",
            "FLAT",
            Discount::FixedAmount {
                amount: Money::from_cents(cents),
            },
        )
    }

    async fn engine_with(coupon: Coupon) -> PricingEngine<InMemoryCatalog> {
        let catalog = InMemoryCatalog::new();
        catalog.upsert_coupon(coupon).await;
        PricingEngine::new(catalog)
    }

    fn resolved(price_cents: i64, quantity: u32) -> ResolvedLine {
        let product = Product::new("p", "Thing", Money::from_cents(price_cents), "s");
        let mut line = cart::CartLine::new(UserId::new("u"), &product);
        line.quantity = quantity;
        ResolvedLine {
            line,
            product,
            store: Store::new("s", "Shop"),
        }
    }

    #[test]
    fn test_subtotal_sums_price_times_quantity() {
        let lines = vec![resolved(1000, 2), resolved(250, 3)];
        assert_eq!(compute_subtotal(&lines), Money::from_cents(2750));
        assert_eq!(compute_subtotal(&[]), Money::zero());
    }

    #[test]
    fn test_percentage_discount() {
        let subtotal = Money::from_dollars(50);
        let discount = compute_discount(Some(&percent(10)), subtotal);
        assert_eq!(discount, Money::from_dollars(5));
        assert_eq!(compute_total(subtotal, discount), Money::from_dollars(45));
    }

    #[test]
    fn test_fixed_discount_clamped_to_subtotal() {
        let subtotal = Money::from_dollars(20);
        let discount = compute_discount(Some(&fixed(3000)), subtotal);
        assert_eq!(discount, Money::from_dollars(20));
        assert_eq!(compute_total(subtotal, discount), Money::zero());
    }

    #[test]
    fn test_no_coupon_no_discount() {
        assert_eq!(compute_discount(None, Money::from_dollars(20)), Money::zero());
    }

    #[test]
    fn test_total_never_negative() {
        for subtotal in [0, 1, 99, 5000] {
            for discount in [0, 1, 100, 10_000] {
                let total = compute_total(Money::from_cents(subtotal), Money::from_cents(discount));
                assert!(!total.is_negative());
            }
        }
    }

    #[tokio::test]
    async fn test_apply_coupon_case_insensitive() {
        let engine = engine_with(percent(10)).await;
        let coupon = engine
            .apply_coupon("tenoff", Money::from_dollars(10))
            .await
            .unwrap();
        assert_eq!(coupon.code, "TENOFF");
    }

    #[tokio::test]
    async fn test_apply_unknown_coupon() {
        let engine = engine_with(percent(10)).await;
        let result = engine.apply_coupon("BOGUS", Money::from_dollars(10)).await;
        assert_eq!(
            result,
            Err(PricingError::CouponNotFound {
                code: "BOGUS".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_apply_inactive_coupon() {
        let mut coupon = percent(10);
        coupon.is_active = false;
        let engine = engine_with(coupon).await;
        let result = engine.apply_coupon("TENOFF", Money::from_dollars(10)).await;
        assert!(matches!(result, Err(PricingError::CouponNotFound { .. })));
    }

    #[tokio::test]
    async fn test_minimum_purchase() {
        let engine =
            engine_with(percent(10).with_minimum_purchase(Money::from_dollars(25))).await;

        let err = engine
            .apply_coupon("TENOFF", Money::from_dollars(24))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Minimum purchase of $25.00 required for this coupon"
        );

        assert!(
            engine
                .apply_coupon("TENOFF", Money::from_dollars(25))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_usage_limit_reached_regardless_of_subtotal() {
        let engine = engine_with(
            percent(10)
                .with_usage_limit(100, 100)
                .with_minimum_purchase(Money::from_dollars(1_000)),
        )
        .await;

        for subtotal in [0, 1, 100_000_000] {
            let result = engine
                .apply_coupon("TENOFF", Money::from_cents(subtotal))
                .await;
            assert_eq!(result, Err(PricingError::UsageLimitReached { limit: 100 }));
        }
    }

    #[tokio::test]
    async fn test_expired_coupon() {
        let now = Utc::now();
        let engine = engine_with(percent(10).with_expiry(now - Duration::minutes(1))).await;
        let result = engine
            .apply_coupon_at("TENOFF", Money::from_dollars(10), now)
            .await;
        assert!(matches!(result, Err(PricingError::CouponExpired { .. })));

        let engine = engine_with(percent(10).with_expiry(now)).await;
        assert!(
            engine
                .apply_coupon_at("TENOFF", Money::from_dollars(10), now)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_apply_does_not_increment_usage() {
        let catalog = InMemoryCatalog::new();
        catalog.upsert_coupon(percent(10).with_usage_limit(5, 2)).await;
        let engine = PricingEngine::new(catalog.clone());

        engine
            .apply_coupon("TENOFF", Money::from_dollars(10))
            .await
            .unwrap();
        let stored = catalog.coupon(&"c-pct".into()).await.unwrap();
        assert_eq!(stored.times_used, 2);
    }

    #[tokio::test]
    async fn test_lookup_failure_is_not_validation() {
        let catalog = InMemoryCatalog::new();
        catalog.set_fail_reads(true).await;
        let engine = PricingEngine::new(catalog);
        let err = engine
            .apply_coupon("TENOFF", Money::from_dollars(10))
            .await
            .unwrap_err();
        assert!(!err.is_validation());
    }
}
