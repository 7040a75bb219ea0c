use std::sync::Arc;
use std::time::Duration;

use super::reconciliation::ReconcilePolicy;
use super::retry::{strategy_from_config, LinearBackoff, RetryStrategy};
use crate::infrastructure::config::ClientConfig;

/// Retry and reconciliation behaviour shared by every purchase
#[derive(Debug, Clone)]
pub struct FlowSettings {
    pub create: Arc<dyn RetryStrategy>,
    pub pay: Arc<dyn RetryStrategy>,
    pub auth: Arc<dyn RetryStrategy>,
    pub reconciliation: ReconcilePolicy,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            create: Arc::new(LinearBackoff::new(Duration::from_millis(1000), 5)),
            pay: Arc::new(LinearBackoff::new(Duration::from_millis(1000), 5)),
            auth: Arc::new(LinearBackoff::new(Duration::from_millis(500), 3)),
            reconciliation: ReconcilePolicy::default(),
        }
    }
}

impl FlowSettings {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            create: strategy_from_config(&config.create),
            pay: strategy_from_config(&config.pay),
            auth: strategy_from_config(&config.auth),
            reconciliation: ReconcilePolicy::from(&config.reconciliation),
        }
    }

    pub fn with_create(mut self, strategy: impl RetryStrategy + 'static) -> Self {
        self.create = Arc::new(strategy);
        self
    }

    pub fn with_pay(mut self, strategy: impl RetryStrategy + 'static) -> Self {
        self.pay = Arc::new(strategy);
        self
    }

    pub fn with_auth(mut self, strategy: impl RetryStrategy + 'static) -> Self {
        self.auth = Arc::new(strategy);
        self
    }

    pub fn with_reconciliation(mut self, policy: ReconcilePolicy) -> Self {
        self.reconciliation = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::BackoffKind;

    #[test]
    fn test_from_config_matches_defaults() {
        let settings = FlowSettings::from_config(&ClientConfig::default());
        let defaults = FlowSettings::default();

        for attempt in 1..=5 {
            assert_eq!(settings.create.next_delay(attempt), defaults.create.next_delay(attempt));
            assert_eq!(settings.pay.next_delay(attempt), defaults.pay.next_delay(attempt));
            assert_eq!(settings.auth.next_delay(attempt), defaults.auth.next_delay(attempt));
        }
        assert_eq!(settings.reconciliation, defaults.reconciliation);
    }

    #[test]
    fn test_fixed_pay_backoff_from_config() {
        let mut config = ClientConfig::default();
        config.pay.backoff = BackoffKind::Fixed;
        config.pay.base_delay_ms = 300;

        let settings = FlowSettings::from_config(&config);
        assert_eq!(settings.pay.next_delay(3), Some(Duration::from_millis(300)));
    }
}
