//! Fragment API client
//!
//! Buys Telegram Stars, Premium and TON through the Fragment v2 API with
//! bounded retries and order reconciliation.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod utils;

// Re-export commonly used items
pub use application::{
    FixedDelay, FlowSettings, FlowSpec, FragmentClient, LinearBackoff, OrderFlowController,
    ReconcilePolicy, RetryStrategy,
};
pub use domain::{
    AuthKey, Balance, ErrorCode, ErrorPolicy, FailureReason, OrderHistory, PayerCredential, Product,
    ProductKind, PurchaseRequest, RemoteOutcome, Retryability, UserInfo, VerificationMode,
    WalletType,
};
pub use error::{FragmentError, Result};
pub use infrastructure::{
    init_tracing, ClientConfig, ConfigError, CredentialEncoding, CredentialError,
    CredentialPreparer, HttpTransport, RestClient, Transport, TransportError,
};
pub use utils::ShutdownManager;
pub use tokio_util::sync::CancellationToken;
