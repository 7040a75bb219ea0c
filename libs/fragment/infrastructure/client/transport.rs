//! Transport abstraction over the Fragment HTTP API
//!
//! The order flow only needs "send a GET or a JSON POST, get JSON back or a
//! shaped error". `HttpTransport` is the reqwest implementation; tests plug
//! in scripted transports.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use super::helpers::extract_error_code;
use crate::domain::FailureReason;

pub const DEFAULT_BASE_URL: &str = "https://api.fragment-api.net";

/// Error model for transport operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("HTTP {status} | {body}")]
    Status { status: u16, body: String },

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("deserialization failed: {0}")]
    Decode(String),

    #[error("HTTP client setup failed: {0}")]
    Setup(String),
}

impl TransportError {
    /// Describe this error in order-flow terms
    ///
    /// Anything that is not an HTTP status means the response was lost or
    /// unreadable, so the remote effect is unknown.
    pub fn failure_reason(&self) -> FailureReason {
        match self {
            TransportError::Status { status, body } => FailureReason::Http {
                status: *status,
                code: extract_error_code(body),
                body: body.clone(),
            },
            TransportError::Timeout => FailureReason::Network {
                message: "request timed out".to_string(),
            },
            TransportError::Network(message)
            | TransportError::Decode(message)
            | TransportError::Setup(message) => FailureReason::Network {
                message: message.clone(),
            },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

/// Capability to talk JSON to the Fragment API
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `path` with query parameters, returning the JSON body
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, TransportError>;

    /// POST a JSON body to `path`, returning the JSON body
    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, TransportError> {
        (**self).get_json(path, query).await
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, TransportError> {
        (**self).post_json(path, body).await
    }
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    client: Client,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| TransportError::Setup(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn read_json(response: reqwest::Response) -> Result<Value, TransportError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, TransportError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} ({} params)", url, query.len());

        let response = self.client.get(&url).query(query).send().await?;
        Self::read_json(response).await
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, TransportError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self.client.post(&url).json(body).send().await?;
        Self::read_json(response).await
    }
}
