//! Application Layer
//!
//! Use cases built on the domain and infrastructure layers: the order flow,
//! auth key issuance and the client facade.

pub mod auth;
pub mod facade;
pub mod order_flow;

pub use auth::AuthKeyIssuer;
pub use facade::FragmentClient;
pub use order_flow::{
    FixedDelay, FlowSettings, FlowSpec, LinearBackoff, OrderFlowController, ReconcilePolicy,
    RetryStrategy,
};
