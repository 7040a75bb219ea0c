//! Purchase requests, orders and the outcomes the API reports for them

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use super::account::AuthKey;
use super::errors::{ErrorCode, FailureReason};
use super::product::{Product, WalletType};

/// Who pays for the order
#[derive(Clone)]
pub enum PayerCredential {
    /// Key issued by `/v2/auth`; replaces raw secrets on every call
    AuthKey(AuthKey),
    /// Raw seed phrase and cookie header; `None` falls back to the client defaults
    Secrets {
        seed: Option<String>,
        cookies: Option<String>,
    },
}

impl Default for PayerCredential {
    fn default() -> Self {
        PayerCredential::Secrets {
            seed: None,
            cookies: None,
        }
    }
}

impl PayerCredential {
    pub fn secrets(seed: impl Into<String>, cookies: impl Into<String>) -> Self {
        PayerCredential::Secrets {
            seed: Some(seed.into()),
            cookies: Some(cookies.into()),
        }
    }
}

impl fmt::Debug for PayerCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayerCredential::AuthKey(_) => f.write_str("PayerCredential::AuthKey(<redacted>)"),
            PayerCredential::Secrets { seed, cookies } => f
                .debug_struct("PayerCredential::Secrets")
                .field("seed", &seed.as_ref().map(|_| "<redacted>"))
                .field("cookies", &cookies.as_ref().map(|_| "<redacted>"))
                .finish(),
        }
    }
}

impl From<AuthKey> for PayerCredential {
    fn from(key: AuthKey) -> Self {
        PayerCredential::AuthKey(key)
    }
}

/// Everything needed to drive one purchase
#[derive(Debug, Clone)]
pub struct PurchaseRequest {
    pub product: Product,
    /// Telegram username of the recipient
    pub recipient: String,
    /// Stars/TON amount or Premium duration in months
    pub quantity: Option<u64>,
    pub credential: PayerCredential,
    pub wallet_type: WalletType,
    pub show_sender: bool,
    /// Opaque caller metadata forwarded with the create call
    pub custom_order: Option<Value>,
}

impl PurchaseRequest {
    pub fn new(product: Product, recipient: impl Into<String>) -> Self {
        Self {
            product,
            recipient: recipient.into(),
            quantity: None,
            credential: PayerCredential::default(),
            wallet_type: WalletType::default(),
            show_sender: false,
            custom_order: None,
        }
    }

    pub fn with_quantity(mut self, quantity: u64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_credential(mut self, credential: impl Into<PayerCredential>) -> Self {
        self.credential = credential.into();
        self
    }

    pub fn with_wallet_type(mut self, wallet_type: WalletType) -> Self {
        self.wallet_type = wallet_type;
        self
    }

    pub fn with_show_sender(mut self, show_sender: bool) -> Self {
        self.show_sender = show_sender;
        self
    }

    pub fn with_custom_order(mut self, custom_order: Value) -> Self {
        self.custom_order = Some(custom_order);
        self
    }

    /// Requested quantity, or the product's default
    pub fn resolved_quantity(&self) -> Option<u64> {
        self.quantity.or_else(|| self.product.kind.default_quantity())
    }
}

/// Settlement status reported by the check endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Success,
    Failed,
    Pending,
    Processing,
    #[serde(other)]
    Unknown,
}

/// Final settlement of a paid order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Success,
    Failed,
}

/// Response of a create, pay or check call
///
/// Fields not modelled here are kept in `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteOutcome {
    #[serde(default)]
    pub success: bool,
    #[serde(default, alias = "order_uuid", skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RemoteOutcome {
    /// Outcome returned when reconciliation gives up while the order is
    /// still processing. The order may settle later.
    pub fn reconciliation_timeout(order_id: &str, waited: Duration) -> Self {
        Self {
            success: false,
            order_id: Some(order_id.to_string()),
            status: Some(OrderStatus::Processing),
            error_code: Some(ErrorCode::OrderAlreadyProcessingTimeout),
            message: Some(format!(
                "Order {} still processing after {}s; check its status later",
                order_id,
                waited.as_secs()
            )),
            ..Default::default()
        }
    }

    pub fn is_reconciliation_timeout(&self) -> bool {
        self.error_code == Some(ErrorCode::OrderAlreadyProcessingTimeout)
    }

    /// Definitive settlement, if this outcome reports one
    pub fn settlement(&self) -> Option<Settlement> {
        if !self.success {
            return None;
        }
        match self.status {
            Some(OrderStatus::Success) => Some(Settlement::Success),
            Some(OrderStatus::Failed) => Some(Settlement::Failed),
            _ => None,
        }
    }

    /// Settlement this outcome actually reports
    ///
    /// Like [`settlement`](Self::settlement), but a success without any
    /// status counts as settled success. Pending or processing statuses
    /// report nothing.
    pub fn reported_settlement(&self) -> Option<Settlement> {
        match self.settlement() {
            Some(settlement) => Some(settlement),
            None if self.success && self.status.is_none() => Some(Settlement::Success),
            None => None,
        }
    }

    /// The order is known to still be processing server-side
    pub fn is_processing(&self) -> bool {
        self.error_code == Some(ErrorCode::OrderAlreadyProcessing)
            || (self.success
                && matches!(
                    self.status,
                    Some(OrderStatus::Pending) | Some(OrderStatus::Processing)
                ))
    }

    /// Failure described by an unsuccessful response
    pub fn failure_reason(&self) -> Option<FailureReason> {
        if self.success {
            return None;
        }
        Some(match &self.error_code {
            Some(code) => FailureReason::Remote {
                code: code.clone(),
                message: self.message.clone(),
            },
            None => FailureReason::Codeless {
                message: self.message.clone(),
            },
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid order state transition: {from:?} -> {to:?}")]
pub struct LifecycleError {
    pub from: LifecycleState,
    pub to: LifecycleState,
}

/// Client-side view of where an order is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Created,
    Paying,
    Settled(Settlement),
    /// Pay attempts failed without a diagnosis; only polling can resolve it
    Unknown,
}

impl LifecycleState {
    pub fn can_transition_to(&self, next: LifecycleState) -> bool {
        matches!(
            (self, next),
            (LifecycleState::Created, LifecycleState::Paying)
                | (LifecycleState::Paying, LifecycleState::Settled(_))
                | (LifecycleState::Paying, LifecycleState::Unknown)
                | (LifecycleState::Unknown, LifecycleState::Settled(_))
        )
    }
}

/// An order accepted by the create endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: String,
    /// Server-assigned cost, sent back verbatim when paying
    pub cost: Number,
    pub product: Product,
    state: LifecycleState,
}

impl Order {
    pub fn new(id: impl Into<String>, cost: Number, product: Product) -> Self {
        Self {
            id: id.into(),
            cost,
            product,
            state: LifecycleState::Created,
        }
    }

    /// Build an order from a successful create response
    pub fn from_created(product: Product, outcome: &RemoteOutcome) -> Option<Self> {
        if !outcome.success {
            return None;
        }
        let id = outcome.order_id.as_ref().filter(|id| !id.is_empty())?;
        let cost = outcome.cost.clone()?;
        Some(Self::new(id.clone(), cost, product))
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn advance(&mut self, next: LifecycleState) -> Result<(), LifecycleError> {
        if !self.state.can_transition_to(next) {
            return Err(LifecycleError {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::ProductKind;
    use serde_json::json;

    #[test]
    fn test_outcome_parsing_keeps_extra_fields() {
        let outcome: RemoteOutcome = serde_json::from_value(json!({
            "success": true,
            "order_id": "abc",
            "cost": 500,
            "tx_hash": "0xdead"
        }))
        .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.order_id.as_deref(), Some("abc"));
        assert_eq!(outcome.cost, Some(Number::from(500)));
        assert_eq!(outcome.extra.get("tx_hash"), Some(&json!("0xdead")));
    }

    #[test]
    fn test_outcome_failure_reason() {
        let outcome: RemoteOutcome = serde_json::from_value(json!({
            "success": false,
            "error_code": "TRANSFER_FAILED",
            "message": "try again"
        }))
        .unwrap();

        assert_eq!(
            outcome.failure_reason(),
            Some(FailureReason::Remote {
                code: ErrorCode::TransferFailed,
                message: Some("try again".to_string()),
            })
        );

        let codeless: RemoteOutcome = serde_json::from_value(json!({"success": false})).unwrap();
        assert!(matches!(codeless.failure_reason(), Some(FailureReason::Codeless { .. })));
    }

    #[test]
    fn test_settlement_and_processing() {
        let failed: RemoteOutcome =
            serde_json::from_value(json!({"success": true, "status": "failed"})).unwrap();
        assert_eq!(failed.settlement(), Some(Settlement::Failed));

        let processing: RemoteOutcome = serde_json::from_value(json!({
            "success": false,
            "error_code": "ORDER_ALREADY_PROCESSING"
        }))
        .unwrap();
        assert!(processing.is_processing());
        assert_eq!(processing.settlement(), None);

        let weird: RemoteOutcome =
            serde_json::from_value(json!({"success": true, "status": "refunded"})).unwrap();
        assert_eq!(weird.status, Some(OrderStatus::Unknown));
    }

    #[test]
    fn test_reported_settlement() {
        let outcome = |value| serde_json::from_value::<RemoteOutcome>(value).unwrap();

        assert_eq!(
            outcome(json!({"success": true, "status": "success"})).reported_settlement(),
            Some(Settlement::Success)
        );
        assert_eq!(
            outcome(json!({"success": true, "status": "failed"})).reported_settlement(),
            Some(Settlement::Failed)
        );
        assert_eq!(
            outcome(json!({"success": true})).reported_settlement(),
            Some(Settlement::Success)
        );
        assert_eq!(
            outcome(json!({"success": true, "status": "pending"})).reported_settlement(),
            None
        );
        assert_eq!(
            outcome(json!({"success": true, "status": "processing"})).reported_settlement(),
            None
        );
        assert_eq!(outcome(json!({"success": false})).reported_settlement(), None);
    }

    #[test]
    fn test_reconciliation_timeout_outcome() {
        let outcome = RemoteOutcome::reconciliation_timeout("abc", Duration::from_secs(120));
        assert!(!outcome.success);
        assert!(outcome.is_reconciliation_timeout());
        assert_eq!(outcome.order_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_order_from_created_requires_id_and_cost() {
        let product = Product::standard(ProductKind::Stars);
        let missing_cost: RemoteOutcome =
            serde_json::from_value(json!({"success": true, "order_id": "abc"})).unwrap();
        assert!(Order::from_created(product, &missing_cost).is_none());

        let ok: RemoteOutcome =
            serde_json::from_value(json!({"success": true, "order_id": "abc", "cost": 1.5}))
                .unwrap();
        let order = Order::from_created(product, &ok).unwrap();
        assert_eq!(order.id, "abc");
        assert_eq!(order.state(), LifecycleState::Created);
    }

    #[test]
    fn test_lifecycle_transitions() {
        let mut order = Order::new("abc", Number::from(1), Product::standard(ProductKind::Ton));
        assert!(order.advance(LifecycleState::Settled(Settlement::Success)).is_err());
        order.advance(LifecycleState::Paying).unwrap();
        order.advance(LifecycleState::Unknown).unwrap();
        order.advance(LifecycleState::Settled(Settlement::Failed)).unwrap();
        assert!(order.advance(LifecycleState::Paying).is_err());
    }

    #[test]
    fn test_request_defaults() {
        let request = PurchaseRequest::new(Product::standard(ProductKind::Premium), "durov");
        assert_eq!(request.resolved_quantity(), Some(3));
        assert_eq!(request.wallet_type, WalletType::V4R2);
        assert!(format!("{:?}", PayerCredential::secrets("s", "c")).contains("redacted"));
    }
}
