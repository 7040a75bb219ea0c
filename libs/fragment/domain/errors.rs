//! Remote error codes and their retry classification
//!
//! Every failure the order flow can observe is turned into a
//! [`FailureReason`] first, and only then classified. Classification is
//! total: an unknown code is fatal, a failure without any code follows the
//! policy's explicit `codeless` rule.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine-readable error code returned by the Fragment API
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ErrorCode {
    /// Recipient lookup failed on the Fragment side
    SearchFailed,
    CreateOrderFailed,
    InternalError,
    BadRequest,
    BalanceCheckFailed,
    TransferFailed,
    /// Order is still being settled server-side
    OrderAlreadyProcessing,
    /// Synthetic: reconciliation ran out of time while the order was processing
    OrderAlreadyProcessingTimeout,
    InsufficientBalance,
    UserNotFound,
    InvalidAuthKey,
    OrderNotFound,
    Unknown(String),
}

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::SearchFailed => "SEARCH_FAILED",
            ErrorCode::CreateOrderFailed => "CREATE_ORDER_FAILED",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::BalanceCheckFailed => "BALANCE_CHECK_FAILED",
            ErrorCode::TransferFailed => "TRANSFER_FAILED",
            ErrorCode::OrderAlreadyProcessing => "ORDER_ALREADY_PROCESSING",
            ErrorCode::OrderAlreadyProcessingTimeout => "ORDER_ALREADY_PROCESSING_TIMEOUT",
            ErrorCode::InsufficientBalance => "INSUFFICIENT_BALANCE",
            ErrorCode::UserNotFound => "USER_NOT_FOUND",
            ErrorCode::InvalidAuthKey => "INVALID_AUTH_KEY",
            ErrorCode::OrderNotFound => "ORDER_NOT_FOUND",
            ErrorCode::Unknown(code) => code,
        }
    }

    pub fn parse(code: &str) -> Self {
        match code {
            "SEARCH_FAILED" => ErrorCode::SearchFailed,
            "CREATE_ORDER_FAILED" => ErrorCode::CreateOrderFailed,
            "INTERNAL_ERROR" => ErrorCode::InternalError,
            "BAD_REQUEST" => ErrorCode::BadRequest,
            "BALANCE_CHECK_FAILED" => ErrorCode::BalanceCheckFailed,
            "TRANSFER_FAILED" => ErrorCode::TransferFailed,
            "ORDER_ALREADY_PROCESSING" => ErrorCode::OrderAlreadyProcessing,
            "ORDER_ALREADY_PROCESSING_TIMEOUT" => ErrorCode::OrderAlreadyProcessingTimeout,
            "INSUFFICIENT_BALANCE" => ErrorCode::InsufficientBalance,
            "USER_NOT_FOUND" => ErrorCode::UserNotFound,
            "INVALID_AUTH_KEY" => ErrorCode::InvalidAuthKey,
            "ORDER_NOT_FOUND" => ErrorCode::OrderNotFound,
            other => ErrorCode::Unknown(other.to_string()),
        }
    }
}

impl From<String> for ErrorCode {
    fn from(code: String) -> Self {
        ErrorCode::parse(&code)
    }
}

impl From<ErrorCode> for String {
    fn from(code: ErrorCode) -> Self {
        code.as_str().to_string()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a create/pay/check/auth call did not succeed
#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason {
    /// Structured `success: false` response carrying an error code
    Remote {
        code: ErrorCode,
        message: Option<String>,
    },
    /// Structured `success: false` response without an error code
    Codeless { message: Option<String> },
    /// Non-2xx HTTP status
    Http {
        status: u16,
        code: Option<ErrorCode>,
        body: String,
    },
    /// No usable response: connection error, timeout, unreadable body
    Network { message: String },
}

impl FailureReason {
    pub fn code(&self) -> Option<&ErrorCode> {
        match self {
            FailureReason::Remote { code, .. } => Some(code),
            FailureReason::Http { code, .. } => code.as_ref(),
            FailureReason::Codeless { .. } | FailureReason::Network { .. } => None,
        }
    }

    pub fn http_status(&self) -> Option<u16> {
        match self {
            FailureReason::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Remote { code, message } => match message {
                Some(message) => write!(f, "{}: {}", code, message),
                None => write!(f, "{}", code),
            },
            FailureReason::Codeless { message } => {
                write!(f, "{}", message.as_deref().unwrap_or("unsuccessful response"))
            }
            FailureReason::Http { status, body, .. } => write!(f, "HTTP {} | {}", status, body),
            FailureReason::Network { message } => write!(f, "network error: {}", message),
        }
    }
}

/// Outcome of classifying a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Retryability {
    Retryable,
    Fatal,
}

impl Retryability {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Retryability::Retryable)
    }
}

/// Per-phase classification rules
///
/// - listed codes are retryable, every other code is fatal
/// - any 4xx status is fatal
/// - other non-2xx statuses and network failures are retryable
/// - failures without a code follow `codeless`
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorPolicy {
    retryable: Vec<ErrorCode>,
    codeless: Retryability,
}

impl ErrorPolicy {
    pub fn new(retryable: impl IntoIterator<Item = ErrorCode>) -> Self {
        Self {
            retryable: retryable.into_iter().collect(),
            codeless: Retryability::Retryable,
        }
    }

    /// Codes retried while creating an order
    pub fn create_default() -> Self {
        Self::new([
            ErrorCode::SearchFailed,
            ErrorCode::CreateOrderFailed,
            ErrorCode::InternalError,
            ErrorCode::BadRequest,
        ])
    }

    /// Codes retried while paying an order
    pub fn pay_default() -> Self {
        Self::new([
            ErrorCode::BalanceCheckFailed,
            ErrorCode::TransferFailed,
            ErrorCode::InternalError,
        ])
    }

    /// Auth key issuance: only lost responses and 5xx are retried
    pub fn auth_default() -> Self {
        Self::new([]).with_codeless(Retryability::Fatal)
    }

    pub fn with_codeless(mut self, codeless: Retryability) -> Self {
        self.codeless = codeless;
        self
    }

    pub fn retryable_codes(&self) -> &[ErrorCode] {
        &self.retryable
    }

    pub fn classify(&self, reason: &FailureReason) -> Retryability {
        match reason {
            FailureReason::Remote { code, .. } => {
                if self.retryable.contains(code) {
                    Retryability::Retryable
                } else {
                    Retryability::Fatal
                }
            }
            FailureReason::Codeless { .. } => self.codeless,
            FailureReason::Http { status, .. } if (400..500).contains(status) => {
                Retryability::Fatal
            }
            FailureReason::Http { .. } => Retryability::Retryable,
            FailureReason::Network { .. } => Retryability::Retryable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(code: ErrorCode) -> FailureReason {
        FailureReason::Remote {
            code,
            message: None,
        }
    }

    #[test]
    fn test_error_code_roundtrip_and_unknown() {
        let code: ErrorCode = serde_json::from_str("\"TRANSFER_FAILED\"").unwrap();
        assert_eq!(code, ErrorCode::TransferFailed);

        let unknown: ErrorCode = serde_json::from_str("\"SOMETHING_NEW\"").unwrap();
        assert_eq!(unknown, ErrorCode::Unknown("SOMETHING_NEW".to_string()));
        assert_eq!(serde_json::to_string(&unknown).unwrap(), "\"SOMETHING_NEW\"");
    }

    #[test]
    fn test_create_policy() {
        let policy = ErrorPolicy::create_default();
        assert_eq!(policy.classify(&remote(ErrorCode::SearchFailed)), Retryability::Retryable);
        assert_eq!(policy.classify(&remote(ErrorCode::BadRequest)), Retryability::Retryable);
        assert_eq!(policy.classify(&remote(ErrorCode::UserNotFound)), Retryability::Fatal);
    }

    #[test]
    fn test_pay_policy() {
        let policy = ErrorPolicy::pay_default();
        assert!(policy.classify(&remote(ErrorCode::BalanceCheckFailed)).is_retryable());
        assert!(policy.classify(&remote(ErrorCode::TransferFailed)).is_retryable());
        assert!(!policy.classify(&remote(ErrorCode::InsufficientBalance)).is_retryable());
        assert!(!policy.classify(&remote(ErrorCode::SearchFailed)).is_retryable());
    }

    #[test]
    fn test_unknown_codes_are_fatal() {
        for policy in [ErrorPolicy::create_default(), ErrorPolicy::pay_default()] {
            let reason = remote(ErrorCode::Unknown("NEW_FAILURE_MODE".to_string()));
            assert_eq!(policy.classify(&reason), Retryability::Fatal);
        }
    }

    #[test]
    fn test_http_status_classification() {
        let policy = ErrorPolicy::pay_default();
        let client_error = FailureReason::Http {
            status: 400,
            code: Some(ErrorCode::TransferFailed),
            body: String::new(),
        };
        assert_eq!(policy.classify(&client_error), Retryability::Fatal);

        let server_error = FailureReason::Http {
            status: 502,
            code: None,
            body: "bad gateway".to_string(),
        };
        assert_eq!(policy.classify(&server_error), Retryability::Retryable);
    }

    #[test]
    fn test_codeless_rule_is_explicit() {
        let reason = FailureReason::Codeless { message: None };
        assert!(ErrorPolicy::pay_default().classify(&reason).is_retryable());
        assert!(!ErrorPolicy::auth_default().classify(&reason).is_retryable());

        let network = FailureReason::Network {
            message: "connection reset".to_string(),
        };
        assert!(ErrorPolicy::auth_default().classify(&network).is_retryable());
    }

    #[test]
    fn test_failure_reason_display() {
        let reason = FailureReason::Remote {
            code: ErrorCode::TransferFailed,
            message: Some("wallet busy".to_string()),
        };
        assert_eq!(reason.to_string(), "TRANSFER_FAILED: wallet busy");
        assert_eq!(reason.code(), Some(&ErrorCode::TransferFailed));
    }
}
