//! Infrastructure Layer
//!
//! HTTP transport, credential handling, REST endpoints, configuration and
//! logging.

pub mod client;
pub mod config;
pub mod logging;

pub use client::{
    CredentialEncoding, CredentialError, CredentialPreparer, HttpTransport, RestClient, Transport,
    TransportError,
};
pub use config::{
    BackoffKind, ClientConfig, ConfigError, ReconciliationConfig, ReconciliationPolicyKind,
    RetryConfig,
};
pub use logging::init_tracing;
