//! REST client for the Fragment v2 API
//!
//! Split into focused modules:
//! - `account`: read-only queries (ping, balance, profile, order history)
//! - `orders`: single-shot create / pay / check calls and request bodies
//! - `auth`: auth key requests
//!
//! Nothing here retries; retry and reconciliation live in the application
//! layer on top of these calls.

mod account;
mod auth;
mod orders;

pub use account::DEFAULT_ORDERS_LIMIT;

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use super::credentials::CredentialPreparer;
use super::helpers::parse_json;
use super::transport::{HttpTransport, Transport, TransportError};

/// Raw endpoint access over an injected transport
pub struct RestClient<T: Transport = HttpTransport> {
    transport: T,
    credentials: CredentialPreparer,
}

impl RestClient<HttpTransport> {
    pub fn new(
        base_url: impl Into<String>,
        credentials: CredentialPreparer,
    ) -> Result<Self, TransportError> {
        Ok(Self::with_transport(HttpTransport::new(base_url)?, credentials))
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
        credentials: CredentialPreparer,
    ) -> Result<Self, TransportError> {
        Ok(Self::with_transport(
            HttpTransport::with_timeout(base_url, timeout)?,
            credentials,
        ))
    }
}

impl<T: Transport> RestClient<T> {
    pub fn with_transport(transport: T, credentials: CredentialPreparer) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn credentials(&self) -> &CredentialPreparer {
        &self.credentials
    }

    pub(crate) async fn get<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<R, TransportError> {
        let value = self.transport.get_json(path, query).await?;
        parse_json(value)
    }

    pub(crate) async fn post<R: DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<R, TransportError> {
        let value = self.transport.post_json(path, body).await?;
        parse_json(value)
    }
}
