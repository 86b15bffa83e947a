//! Checkout tuning.

use std::time::Duration;

/// Retry policy for post-commit follow-ups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutConfig {
    /// Attempts per follow-up, including the first. At least 1.
    pub max_follow_up_attempts: u32,
    /// Delay before retry `n` is `n * follow_up_backoff`.
    pub follow_up_backoff: Duration,
}

impl CheckoutConfig {
    pub fn new(max_follow_up_attempts: u32, follow_up_backoff: Duration) -> Self {
        Self {
            max_follow_up_attempts: max_follow_up_attempts.max(1),
            follow_up_backoff,
        }
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            max_follow_up_attempts: 3,
            follow_up_backoff: Duration::from_millis(50),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = CheckoutConfig::default();
        assert_eq!(config.max_follow_up_attempts, 3);
        assert_eq!(config.follow_up_backoff, Duration::from_millis(50));
    }

    #[test]
    fn test_attempts_floor_at_one() {
        let config = CheckoutConfig::new(0, Duration::ZERO);
        assert_eq!(config.max_follow_up_attempts, 1);
    }
}
