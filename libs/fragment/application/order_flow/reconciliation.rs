//! Reconciliation
//!
//! Runs only after every pay attempt failed without a diagnosis. The order
//! may or may not have been paid; the check endpoint is the source of truth.
//! Payment is never re-attempted from here.

use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::{
    ErrorCode, FailureReason, LifecycleState, Order, RemoteOutcome,
};
use crate::error::{FragmentError, Result};
use crate::infrastructure::client::{RestClient, Transport};
use crate::infrastructure::config::{ReconciliationConfig, ReconciliationPolicyKind};
use crate::utils::cancellable_sleep;

// =============================================================================
// Policy
// =============================================================================

/// How long to keep polling an order with an unknown outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilePolicy {
    /// Up to `attempts` polls; the first `success: true` wins, otherwise the
    /// last pay failure is re-surfaced
    FixedAttempts { attempts: u32, interval: Duration },
    /// Poll every `interval` until `window` elapses, at least once; running
    /// out of time yields a timeout outcome
    TimeBounded { window: Duration, interval: Duration },
}

impl Default for ReconcilePolicy {
    fn default() -> Self {
        ReconcilePolicy::TimeBounded {
            window: Duration::from_secs(120),
            interval: Duration::from_secs(15),
        }
    }
}

impl From<&ReconciliationConfig> for ReconcilePolicy {
    fn from(config: &ReconciliationConfig) -> Self {
        match config.policy {
            ReconciliationPolicyKind::FixedAttempts => ReconcilePolicy::FixedAttempts {
                attempts: config.attempts,
                interval: config.interval(),
            },
            ReconciliationPolicyKind::TimeBounded => ReconcilePolicy::TimeBounded {
                window: config.window(),
                interval: config.interval(),
            },
        }
    }
}

// =============================================================================
// Reconciler
// =============================================================================

/// What the pay phase left behind
#[derive(Debug, Clone)]
pub struct UnresolvedPayment {
    pub last_failure: FailureReason,
    pub attempts: u32,
}

pub(crate) struct Reconciler<'a, T: Transport> {
    rest: &'a RestClient<T>,
    check_path: &'a str,
    policy: ReconcilePolicy,
}

impl<'a, T: Transport> Reconciler<'a, T> {
    pub(crate) fn new(rest: &'a RestClient<T>, check_path: &'a str, policy: ReconcilePolicy) -> Self {
        Self {
            rest,
            check_path,
            policy,
        }
    }

    pub(crate) async fn reconcile(
        &self,
        order: &mut Order,
        unresolved: UnresolvedPayment,
        cancel: &CancellationToken,
    ) -> Result<RemoteOutcome> {
        info!(
            "[Reconciliation] Order {} outcome unknown after {} pay attempt(s), polling ({:?})",
            order.id, unresolved.attempts, self.policy
        );

        match self.policy {
            ReconcilePolicy::FixedAttempts { attempts, interval } => {
                self.poll_fixed(order, unresolved, attempts, interval, cancel)
                    .await
            }
            ReconcilePolicy::TimeBounded { window, interval } => {
                self.poll_time_bounded(order, window, interval, cancel).await
            }
        }
    }

    async fn poll_fixed(
        &self,
        order: &mut Order,
        unresolved: UnresolvedPayment,
        attempts: u32,
        interval: Duration,
        cancel: &CancellationToken,
    ) -> Result<RemoteOutcome> {
        for poll in 1..=attempts {
            self.wait(interval, order, cancel).await?;

            match self.rest.fetch_order_status(self.check_path, &order.id).await {
                Ok(outcome) if outcome.success => {
                    info!("[Reconciliation] Order {} resolved on poll {}", order.id, poll);
                    settle(order, &outcome)?;
                    return Ok(outcome);
                }
                Ok(outcome) => {
                    debug!(
                        "[Reconciliation] Poll {}/{} for {}: {:?} {:?}",
                        poll, attempts, order.id, outcome.error_code, outcome.status
                    );
                }
                Err(e) => {
                    debug!("[Reconciliation] Poll {}/{} for {} failed: {}", poll, attempts, order.id, e);
                }
            }
        }

        warn!(
            "[Reconciliation] Order {} unresolved after {} poll(s), reporting last pay error",
            order.id, attempts
        );
        Err(FragmentError::PayFailed {
            order_id: order.id.clone(),
            reason: unresolved.last_failure,
            attempts: unresolved.attempts,
        })
    }

    async fn poll_time_bounded(
        &self,
        order: &mut Order,
        window: Duration,
        interval: Duration,
        cancel: &CancellationToken,
    ) -> Result<RemoteOutcome> {
        let started = Instant::now();
        let deadline = started + window;
        let mut polls = 0u32;

        // At least one poll; the last wait is cut short at the deadline
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if polls > 0 && remaining.is_zero() {
                break;
            }
            self.wait(interval.min(remaining), order, cancel).await?;
            polls += 1;

            match self.rest.fetch_order_status(self.check_path, &order.id).await {
                Ok(outcome) => {
                    if is_terminal(&outcome) {
                        info!(
                            "[Reconciliation] Order {} terminal after {} poll(s): {:?}",
                            order.id, polls, outcome.status
                        );
                        settle(order, &outcome)?;
                        return Ok(outcome);
                    }
                    debug!(
                        "[Reconciliation] Order {} still processing (poll {})",
                        order.id, polls
                    );
                }
                Err(e) => {
                    debug!("[Reconciliation] Poll {} for {} failed: {}", polls, order.id, e);
                }
            }
        }

        let waited = started.elapsed();
        warn!(
            "[Reconciliation] Order {} still processing after {:?} ({} poll(s))",
            order.id, waited, polls
        );
        Ok(RemoteOutcome::reconciliation_timeout(&order.id, waited))
    }

    async fn wait(&self, interval: Duration, order: &Order, cancel: &CancellationToken) -> Result<()> {
        if cancellable_sleep(interval, cancel).await {
            Ok(())
        } else {
            warn!("[Reconciliation] Cancelled while polling order {}", order.id);
            Err(FragmentError::Cancelled {
                order_id: Some(order.id.clone()),
            })
        }
    }
}

/// A check response that ends time-bounded polling
///
/// Settled orders (success or failed) and any error code other than
/// "still processing" are final. Codeless failures are not.
fn is_terminal(outcome: &RemoteOutcome) -> bool {
    if outcome.reported_settlement().is_some() {
        return true;
    }
    matches!(
        &outcome.error_code,
        Some(code) if *code != ErrorCode::OrderAlreadyProcessing
    )
}

/// Record a definitive settlement on the order, if the outcome carries one
fn settle(order: &mut Order, outcome: &RemoteOutcome) -> Result<()> {
    if let Some(settlement) = outcome.reported_settlement() {
        order.advance(LifecycleState::Settled(settlement))?;
    }
    Ok(())
}
