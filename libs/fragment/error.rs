//! Top-level error type for client operations

use thiserror::Error;

use crate::domain::{ErrorCode, FailureReason, LifecycleError};
use crate::infrastructure::client::{CredentialError, TransportError};
use crate::infrastructure::config::ConfigError;

#[derive(Error, Debug)]
pub enum FragmentError {
    /// Bad seed or cookie format; raised before any network call
    #[error("Validation failed: {0}")]
    Validation(#[from] CredentialError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Order creation failed after {attempts} attempt(s): {reason}")]
    CreateFailed { reason: FailureReason, attempts: u32 },

    #[error("Payment for order {order_id} failed after {attempts} attempt(s): {reason}")]
    PayFailed {
        order_id: String,
        reason: FailureReason,
        attempts: u32,
    },

    #[error("Auth key issuance failed after {attempts} attempt(s): {reason}")]
    AuthFailed { reason: FailureReason, attempts: u32 },

    #[error("Request failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Operation cancelled (order: {})", order_label(.order_id))]
    Cancelled { order_id: Option<String> },

    #[error("Invalid order state: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl FragmentError {
    /// Remote error code behind this failure, if any
    pub fn code(&self) -> Option<&ErrorCode> {
        match self {
            FragmentError::CreateFailed { reason, .. }
            | FragmentError::PayFailed { reason, .. }
            | FragmentError::AuthFailed { reason, .. } => reason.code(),
            _ => None,
        }
    }

    /// Order id known at the time of failure; check it later with `check_order`
    pub fn order_id(&self) -> Option<&str> {
        match self {
            FragmentError::PayFailed { order_id, .. } => Some(order_id),
            FragmentError::Cancelled { order_id } => order_id.as_deref(),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            FragmentError::Validation(_) | FragmentError::InvalidRequest(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FragmentError>;

fn order_label(order_id: &Option<String>) -> &str {
    order_id.as_deref().unwrap_or("none")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pay_failed_exposes_order_and_code() {
        let err = FragmentError::PayFailed {
            order_id: "abc".to_string(),
            reason: FailureReason::Remote {
                code: ErrorCode::InsufficientBalance,
                message: None,
            },
            attempts: 1,
        };
        assert_eq!(err.order_id(), Some("abc"));
        assert_eq!(err.code(), Some(&ErrorCode::InsufficientBalance));
        assert!(err.to_string().contains("INSUFFICIENT_BALANCE"));
    }

    #[test]
    fn test_cancelled_display() {
        let err = FragmentError::Cancelled { order_id: None };
        assert_eq!(err.to_string(), "Operation cancelled (order: none)");
    }
}
