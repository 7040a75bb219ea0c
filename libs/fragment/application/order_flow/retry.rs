use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::infrastructure::config::{BackoffKind, RetryConfig};

/// Trait for defining retry strategies
///
/// Attempts are 1-indexed: `next_delay(1)` is asked after the first attempt
/// failed.
pub trait RetryStrategy: Send + Sync + fmt::Debug {
    /// Get the delay before the next attempt
    ///
    /// # Returns
    /// * `Some(duration)` - Wait this long, then try again
    /// * `None` - Attempt budget exhausted
    fn next_delay(&self, attempt: u32) -> Option<Duration>;

    /// Total number of attempts allowed
    fn max_attempts(&self) -> u32;

    fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts()
    }
}

/// Linear backoff: `base_delay * attempt`
#[derive(Debug, Clone)]
pub struct LinearBackoff {
    base_delay: Duration,
    max_attempts: u32,
}

impl LinearBackoff {
    pub fn new(base_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base_delay,
            max_attempts,
        }
    }
}

impl RetryStrategy for LinearBackoff {
    fn next_delay(&self, attempt: u32) -> Option<Duration> {
        if !self.should_retry(attempt) {
            return None;
        }
        Some(self.base_delay.saturating_mul(attempt))
    }

    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

/// Fixed delay between attempts
#[derive(Debug, Clone)]
pub struct FixedDelay {
    delay: Duration,
    max_attempts: u32,
}

impl FixedDelay {
    pub fn new(delay: Duration, max_attempts: u32) -> Self {
        Self {
            delay,
            max_attempts,
        }
    }
}

impl RetryStrategy for FixedDelay {
    fn next_delay(&self, attempt: u32) -> Option<Duration> {
        if !self.should_retry(attempt) {
            return None;
        }
        Some(self.delay)
    }

    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

/// Build the strategy described by a config section
pub fn strategy_from_config(config: &RetryConfig) -> Arc<dyn RetryStrategy> {
    match config.backoff {
        BackoffKind::Linear => Arc::new(LinearBackoff::new(config.base_delay(), config.max_attempts)),
        BackoffKind::Fixed => Arc::new(FixedDelay::new(config.base_delay(), config.max_attempts)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_backoff() {
        let strategy = LinearBackoff::new(Duration::from_millis(1000), 5);

        assert_eq!(strategy.next_delay(1), Some(Duration::from_millis(1000)));
        assert_eq!(strategy.next_delay(2), Some(Duration::from_millis(2000)));
        assert_eq!(strategy.next_delay(4), Some(Duration::from_millis(4000)));
        assert_eq!(strategy.next_delay(5), None);
    }

    #[test]
    fn test_fixed_delay() {
        let strategy = FixedDelay::new(Duration::from_millis(250), 3);

        assert_eq!(strategy.next_delay(1), Some(Duration::from_millis(250)));
        assert_eq!(strategy.next_delay(2), Some(Duration::from_millis(250)));
        assert_eq!(strategy.next_delay(3), None);
    }

    #[test]
    fn test_strategy_from_config() {
        let mut config = RetryConfig::pay_default();
        let linear = strategy_from_config(&config);
        assert_eq!(linear.next_delay(2), Some(Duration::from_millis(2000)));

        config.backoff = BackoffKind::Fixed;
        let fixed = strategy_from_config(&config);
        assert_eq!(fixed.next_delay(2), Some(Duration::from_millis(1000)));
        assert_eq!(fixed.max_attempts(), 5);
    }
}
