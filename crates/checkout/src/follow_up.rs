//! Post-commit follow-up actions and their retry queue.

use async_trait::async_trait;
use common::{CartLineId, CouponId, StoreError, UserId};
use serde::{Deserialize, Serialize};

use crate::config::CheckoutConfig;
use crate::error::PartialCommitWarning;
use crate::order::OrderNumber;

/// Work that must follow a persisted order. Each is safe to repeat after a
/// failed attempt: the coupon increment is keyed by order number and line
/// deletion ignores lines already gone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FollowUp {
    IncrementCouponUsage {
        coupon_id: CouponId,
        coupon_code: String,
        order_number: OrderNumber,
    },
    ClearCartLines {
        user_id: UserId,
        line_ids: Vec<CartLineId>,
    },
}

impl FollowUp {
    pub fn name(&self) -> &'static str {
        match self {
            Self::IncrementCouponUsage { .. } => "increment_coupon_usage",
            Self::ClearCartLines { .. } => "clear_cart_lines",
        }
    }
}

impl std::fmt::Display for FollowUp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IncrementCouponUsage { coupon_code, .. } => {
                write!(f, "coupon usage increment for {coupon_code}")
            }
            Self::ClearCartLines { line_ids, .. } => {
                write!(f, "removal of {} cart line(s)", line_ids.len())
            }
        }
    }
}

/// Performs a single attempt of a follow-up.
#[async_trait]
pub trait FollowUpExecutor: Send + Sync {
    async fn perform(&self, follow_up: &FollowUp) -> Result<(), StoreError>;
}

/// Runs follow-ups in order with bounded retries and linear backoff.
///
/// Only transient store failures are retried. A follow-up that still fails
/// becomes a [`PartialCommitWarning`]; the remaining follow-ups still run.
#[derive(Debug, Clone)]
pub struct FollowUpQueue {
    config: CheckoutConfig,
}

impl FollowUpQueue {
    pub fn new(config: CheckoutConfig) -> Self {
        Self { config }
    }

    #[tracing::instrument(skip(self, executor, order_number, follow_ups), fields(%order_number))]
    pub async fn drain<E: FollowUpExecutor + ?Sized>(
        &self,
        executor: &E,
        order_number: &OrderNumber,
        follow_ups: Vec<FollowUp>,
    ) -> Vec<PartialCommitWarning> {
        let mut warnings = Vec::new();

        for follow_up in follow_ups {
            if let Err(warning) = self.run_one(executor, order_number, follow_up).await {
                metrics::counter!("checkout_partial_commits_total").increment(1);
                tracing::warn!(
                    order_number = %warning.order_number,
                    follow_up = warning.follow_up.name(),
                    attempts = warning.attempts,
                    reason = %warning.reason,
                    "follow-up abandoned; needs reconciliation"
                );
                warnings.push(warning);
            }
        }

        warnings
    }

    async fn run_one<E: FollowUpExecutor + ?Sized>(
        &self,
        executor: &E,
        order_number: &OrderNumber,
        follow_up: FollowUp,
    ) -> Result<(), PartialCommitWarning> {
        let max_attempts = self.config.max_follow_up_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match executor.perform(&follow_up).await {
                Ok(()) => {
                    tracing::debug!(follow_up = follow_up.name(), attempt, "follow-up done");
                    return Ok(());
                }
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    tracing::warn!(
                        follow_up = follow_up.name(),
                        attempt,
                        error = %err,
                        "follow-up failed, retrying"
                    );
                    tokio::time::sleep(self.config.follow_up_backoff * attempt).await;
                }
                Err(err) => {
                    return Err(PartialCommitWarning {
                        order_number: order_number.clone(),
                        follow_up,
                        attempts: attempt,
                        reason: err.to_string(),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Fails the first `failures` attempts with the given error.
    struct FlakyExecutor {
        failures: Mutex<u32>,
        error: StoreError,
        calls: Mutex<Vec<&'static str>>,
    }

    impl FlakyExecutor {
        fn new(failures: u32, error: StoreError) -> Self {
            Self {
                failures: Mutex::new(failures),
                error,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FollowUpExecutor for FlakyExecutor {
        async fn perform(&self, follow_up: &FollowUp) -> Result<(), StoreError> {
            self.calls.lock().unwrap().push(follow_up.name());
            let mut failures = self.failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(self.error.clone());
            }
            Ok(())
        }
    }

    fn queue(attempts: u32) -> FollowUpQueue {
        FollowUpQueue::new(CheckoutConfig::new(attempts, Duration::from_millis(1)))
    }

    fn coupon_follow_up() -> FollowUp {
        FollowUp::IncrementCouponUsage {
            coupon_id: CouponId::new("c1"),
            coupon_code: "TEN".to_string(),
            order_number: OrderNumber::new("ORD-1"),
        }
    }

    fn clear_follow_up() -> FollowUp {
        FollowUp::ClearCartLines {
            user_id: UserId::new("ann"),
            line_ids: vec![CartLineId::new()],
        }
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let executor = FlakyExecutor::new(2, StoreError::unavailable("timeout"));
        let warnings = queue(3)
            .drain(&executor, &OrderNumber::new("ORD-1"), vec![coupon_follow_up()])
            .await;

        assert!(warnings.is_empty());
        assert_eq!(executor.calls().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_grows_linearly() {
        let executor = FlakyExecutor::new(2, StoreError::unavailable("timeout"));
        let queue = FollowUpQueue::new(CheckoutConfig::new(3, Duration::from_millis(100)));
        let started = tokio::time::Instant::now();

        let warnings = queue
            .drain(&executor, &OrderNumber::new("ORD-1"), vec![clear_follow_up()])
            .await;

        // 100ms after the first failure, 200ms after the second
        assert!(warnings.is_empty());
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(300), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(400), "{elapsed:?}");
    }

    #[tokio::test]
    async fn test_exhausted_retries_become_warning() {
        let executor = FlakyExecutor::new(10, StoreError::unavailable("down"));
        let warnings = queue(2)
            .drain(&executor, &OrderNumber::new("ORD-1"), vec![clear_follow_up()])
            .await;

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].attempts, 2);
        assert_eq!(warnings[0].follow_up.name(), "clear_cart_lines");
        assert!(warnings[0].to_string().contains("ORD-1"));
    }

    #[tokio::test]
    async fn test_conflict_is_not_retried() {
        let executor = FlakyExecutor::new(1, StoreError::Conflict("limit".to_string()));
        let warnings = queue(5)
            .drain(&executor, &OrderNumber::new("ORD-1"), vec![coupon_follow_up()])
            .await;

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].attempts, 1);
        assert_eq!(executor.calls(), vec!["increment_coupon_usage"]);
    }

    #[tokio::test]
    async fn test_later_follow_ups_run_after_failure() {
        let executor = FlakyExecutor::new(1, StoreError::Conflict("limit".to_string()));
        let warnings = queue(1)
            .drain(
                &executor,
                &OrderNumber::new("ORD-1"),
                vec![coupon_follow_up(), clear_follow_up()],
            )
            .await;

        assert_eq!(warnings.len(), 1);
        assert_eq!(
            executor.calls(),
            vec!["increment_coupon_usage", "clear_cart_lines"]
        );
    }
}
