//! Account-level payloads: auth keys, balance, profile and order history

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

use super::order::OrderStatus;

/// Short-lived key issued in exchange for cookies + seed
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthKey(String);

impl AuthKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthKey(<redacted>)")
    }
}

/// Response of `/v2/auth`
#[derive(Debug, Clone, Deserialize)]
pub struct AuthKeyResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub auth_key: Option<AuthKey>,
    #[serde(default)]
    pub error_code: Option<super::errors::ErrorCode>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response of `/v2/ping`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Wallet balance as reported by `/v2/getBalance`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<Number>,
    #[serde(default, alias = "address", skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Telegram profile as seen by Fragment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of the order history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    #[serde(default, alias = "uuid", alias = "id", skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A page of `/v2/getOrders`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderHistory {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub orders: Vec<OrderRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
