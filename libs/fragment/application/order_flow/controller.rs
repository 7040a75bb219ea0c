//! Order Flow Controller
//!
//! Drives one purchase through create, pay and (when the pay outcome is
//! unknown) reconciliation. One instance serves every product; the
//! per-product differences come from [`FlowSpec`].

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::flow::FlowSpec;
use super::reconciliation::{Reconciler, UnresolvedPayment};
use super::settings::FlowSettings;
use crate::domain::{
    ErrorCode, FailureReason, LifecycleState, Order, PurchaseRequest, RemoteOutcome,
};
use crate::error::{FragmentError, Result};
use crate::infrastructure::client::{RestClient, Transport};
use crate::utils::cancellable_sleep;

enum PayResolution {
    Settled(RemoteOutcome),
    Unresolved(UnresolvedPayment),
}

pub struct OrderFlowController<'a, T: Transport> {
    rest: &'a RestClient<T>,
    settings: &'a FlowSettings,
}

impl<'a, T: Transport> OrderFlowController<'a, T> {
    pub fn new(rest: &'a RestClient<T>, settings: &'a FlowSettings) -> Self {
        Self { rest, settings }
    }

    /// Run a purchase with the standard flow for its product
    pub async fn purchase(
        &self,
        request: &PurchaseRequest,
        cancel: &CancellationToken,
    ) -> Result<RemoteOutcome> {
        self.run(&FlowSpec::for_product(request.product), request, cancel)
            .await
    }

    /// Run a purchase with an explicit flow description
    pub async fn run(
        &self,
        spec: &FlowSpec,
        request: &PurchaseRequest,
        cancel: &CancellationToken,
    ) -> Result<RemoteOutcome> {
        if request.recipient.trim().is_empty() {
            return Err(FragmentError::InvalidRequest(
                "recipient username cannot be empty".to_string(),
            ));
        }
        let quantity = request
            .quantity
            .or(spec.default_quantity)
            .ok_or_else(|| {
                FragmentError::InvalidRequest(format!(
                    "{} requires a {}",
                    spec.product, spec.quantity_field
                ))
            })?;

        // Validate every credential up front so nothing is sent on bad input
        let create_fields = self
            .rest
            .create_credential_fields(spec.product, &request.credential)?;
        let pay_fields = self
            .rest
            .pay_credential_fields(spec.product, &request.credential)?;

        if cancel.is_cancelled() {
            return Err(FragmentError::Cancelled { order_id: None });
        }

        info!(
            "[OrderFlow] {} x{} for {}",
            spec.product, quantity, request.recipient
        );

        let create_body = self
            .rest
            .create_body(request, spec.quantity_field, quantity, &create_fields);
        let mut order = self.create(spec, &create_body, cancel).await?;
        info!("[OrderFlow] Order {} created (cost {})", order.id, order.cost);

        order.advance(LifecycleState::Paying)?;
        let pay_body = self
            .rest
            .pay_body(&order.id, &order.cost, request.wallet_type, &pay_fields);

        match self.pay(spec, &mut order, &pay_body, cancel).await? {
            PayResolution::Settled(outcome) => Ok(outcome),
            PayResolution::Unresolved(unresolved) => {
                order.advance(LifecycleState::Unknown)?;
                Reconciler::new(self.rest, &spec.check_path, self.settings.reconciliation)
                    .reconcile(&mut order, unresolved, cancel)
                    .await
            }
        }
    }

    async fn create(
        &self,
        spec: &FlowSpec,
        body: &serde_json::Value,
        cancel: &CancellationToken,
    ) -> Result<Order> {
        let strategy = &self.settings.create;
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let reason = match self.rest.submit_order_call(&spec.create_path, body).await {
                Ok(outcome) => match outcome.failure_reason() {
                    None => {
                        return Order::from_created(spec.product, &outcome).ok_or_else(|| {
                            error!("[OrderFlow] Create succeeded without order_id or cost");
                            FragmentError::CreateFailed {
                                reason: FailureReason::Codeless {
                                    message: Some(
                                        "create response missing order_id or cost".to_string(),
                                    ),
                                },
                                attempts: attempt,
                            }
                        });
                    }
                    Some(reason) => reason,
                },
                Err(e) => e.failure_reason(),
            };

            if !spec.create_policy.classify(&reason).is_retryable() {
                warn!("[OrderFlow] Create failed on attempt {}: {}", attempt, reason);
                return Err(FragmentError::CreateFailed {
                    reason,
                    attempts: attempt,
                });
            }

            let Some(delay) = strategy.next_delay(attempt) else {
                warn!(
                    "[OrderFlow] Create gave up after {} attempt(s): {}",
                    attempt, reason
                );
                return Err(FragmentError::CreateFailed {
                    reason,
                    attempts: attempt,
                });
            };

            warn!(
                "[OrderFlow] Create attempt {}/{} failed: {}; retrying in {:?}",
                attempt,
                strategy.max_attempts(),
                reason,
                delay
            );
            self.wait(delay, None, cancel).await?;
        }
    }

    async fn pay(
        &self,
        spec: &FlowSpec,
        order: &mut Order,
        body: &serde_json::Value,
        cancel: &CancellationToken,
    ) -> Result<PayResolution> {
        let strategy = &self.settings.pay;
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let reason = match self.rest.submit_order_call(&spec.pay_path, body).await {
                Ok(outcome) => match outcome.failure_reason() {
                    None => {
                        match outcome.reported_settlement() {
                            Some(settlement) => {
                                order.advance(LifecycleState::Settled(settlement))?;
                                info!(
                                    "[OrderFlow] Order {} paid on attempt {}",
                                    order.id, attempt
                                );
                            }
                            None => info!(
                                "[OrderFlow] Order {} accepted on attempt {}, status {:?}",
                                order.id, attempt, outcome.status
                            ),
                        }
                        return Ok(PayResolution::Settled(outcome));
                    }
                    Some(reason) => reason,
                },
                Err(e) => e.failure_reason(),
            };

            // Already being settled: paying again is pointless, go straight to polling
            if reason.code() == Some(&ErrorCode::OrderAlreadyProcessing) {
                info!("[OrderFlow] Order {} is already processing", order.id);
                return Ok(PayResolution::Unresolved(UnresolvedPayment {
                    last_failure: reason,
                    attempts: attempt,
                }));
            }

            if !spec.pay_policy.classify(&reason).is_retryable() {
                warn!(
                    "[OrderFlow] Pay for {} failed on attempt {}: {}",
                    order.id, attempt, reason
                );
                return Err(FragmentError::PayFailed {
                    order_id: order.id.clone(),
                    reason,
                    attempts: attempt,
                });
            }

            let Some(delay) = strategy.next_delay(attempt) else {
                warn!(
                    "[OrderFlow] Pay for {} exhausted after {} attempt(s): {}",
                    order.id, attempt, reason
                );
                return Ok(PayResolution::Unresolved(UnresolvedPayment {
                    last_failure: reason,
                    attempts: attempt,
                }));
            };

            warn!(
                "[OrderFlow] Pay attempt {}/{} for {} failed: {}; retrying in {:?}",
                attempt,
                strategy.max_attempts(),
                order.id,
                reason,
                delay
            );
            self.wait(delay, Some(&order.id), cancel).await?;
        }
    }

    async fn wait(
        &self,
        delay: std::time::Duration,
        order_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        if cancellable_sleep(delay, cancel).await {
            return Ok(());
        }
        warn!("[OrderFlow] Cancelled while waiting to retry");
        Err(FragmentError::Cancelled {
            order_id: order_id.map(str::to_string),
        })
    }
}
