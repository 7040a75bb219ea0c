//! Create → pay → reconcile order flow

mod controller;
mod flow;
mod reconciliation;
mod retry;
mod settings;

pub use controller::OrderFlowController;
pub use flow::FlowSpec;
pub use reconciliation::{ReconcilePolicy, UnresolvedPayment};
pub use retry::{strategy_from_config, FixedDelay, LinearBackoff, RetryStrategy};
pub use settings::FlowSettings;
