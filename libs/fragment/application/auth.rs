//! Auth key issuance with bounded retry

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::order_flow::RetryStrategy;
use crate::domain::{AuthKey, ErrorPolicy, FailureReason};
use crate::error::{FragmentError, Result};
use crate::infrastructure::client::{RestClient, Transport};
use crate::utils::cancellable_sleep;

pub struct AuthKeyIssuer<'a, T: Transport> {
    rest: &'a RestClient<T>,
    strategy: &'a dyn RetryStrategy,
    policy: ErrorPolicy,
}

impl<'a, T: Transport> AuthKeyIssuer<'a, T> {
    pub fn new(rest: &'a RestClient<T>, strategy: &'a dyn RetryStrategy) -> Self {
        Self {
            rest,
            strategy,
            policy: ErrorPolicy::auth_default(),
        }
    }

    /// Exchange cookies and seed for an auth key
    ///
    /// Lost responses and 5xx are retried; 4xx and responses without a key
    /// are fatal.
    pub async fn issue(
        &self,
        cookies: Option<&str>,
        seed: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<AuthKey> {
        let body = self.rest.auth_body(cookies, seed)?;
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let reason = match self.rest.submit_auth(&body).await {
                Ok(response) if response.success != Some(false) => match response.auth_key {
                    Some(key) if !key.as_str().is_empty() => {
                        info!("[Auth] Auth key issued on attempt {}", attempt);
                        return Ok(key);
                    }
                    _ => FailureReason::Codeless {
                        message: response
                            .message
                            .or_else(|| Some("response did not contain an auth key".to_string())),
                    },
                },
                Ok(response) => match response.error_code {
                    Some(code) => FailureReason::Remote {
                        code,
                        message: response.message,
                    },
                    None => FailureReason::Codeless {
                        message: response.message,
                    },
                },
                Err(e) => e.failure_reason(),
            };

            if !self.policy.classify(&reason).is_retryable() {
                warn!("[Auth] Auth key request failed on attempt {}: {}", attempt, reason);
                return Err(FragmentError::AuthFailed {
                    reason,
                    attempts: attempt,
                });
            }

            let Some(delay) = self.strategy.next_delay(attempt) else {
                warn!("[Auth] Auth key request gave up after {} attempt(s): {}", attempt, reason);
                return Err(FragmentError::AuthFailed {
                    reason,
                    attempts: attempt,
                });
            };

            warn!(
                "[Auth] Attempt {}/{} failed: {}; retrying in {:?}",
                attempt,
                self.strategy.max_attempts(),
                reason,
                delay
            );
            if !cancellable_sleep(delay, cancel).await {
                return Err(FragmentError::Cancelled { order_id: None });
            }
        }
    }
}
