//! Products sold through the Fragment API
//!
//! A `Product` is a product kind paired with a verification mode. Each of
//! the six combinations maps to one endpoint family (`/v2/buyStars`,
//! `/v2/buyPremiumWithoutKYC`, ...) with identical create/pay/check shape.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What is being bought
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    /// Telegram Stars
    Stars,
    /// Telegram Premium subscription
    Premium,
    /// TON transfer to a Telegram account
    Ton,
}

impl ProductKind {
    /// Name of the quantity field in create requests
    pub fn quantity_field(&self) -> &'static str {
        match self {
            ProductKind::Stars | ProductKind::Ton => "amount",
            ProductKind::Premium => "duration",
        }
    }

    /// Quantity used when the caller does not supply one
    ///
    /// Only Premium has a sensible default (3 months). Stars and TON
    /// amounts must always be chosen by the caller.
    pub fn default_quantity(&self) -> Option<u64> {
        match self {
            ProductKind::Premium => Some(3),
            ProductKind::Stars | ProductKind::Ton => None,
        }
    }

    fn path_stem(&self) -> &'static str {
        match self {
            ProductKind::Stars => "buyStars",
            ProductKind::Premium => "buyPremium",
            ProductKind::Ton => "buyTon",
        }
    }
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductKind::Stars => write!(f, "stars"),
            ProductKind::Premium => write!(f, "premium"),
            ProductKind::Ton => write!(f, "ton"),
        }
    }
}

/// Whether the purchase carries account-bound credentials on create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMode {
    /// Cookies / auth key and `show_sender` are sent with the order
    #[default]
    Standard,
    /// "WithoutKYC" flow: create only needs recipient and quantity
    WithoutKyc,
}

/// Product kind + verification mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Product {
    pub kind: ProductKind,
    pub mode: VerificationMode,
}

impl Product {
    pub const fn new(kind: ProductKind, mode: VerificationMode) -> Self {
        Self { kind, mode }
    }

    pub const fn standard(kind: ProductKind) -> Self {
        Self::new(kind, VerificationMode::Standard)
    }

    pub const fn without_kyc(kind: ProductKind) -> Self {
        Self::new(kind, VerificationMode::WithoutKyc)
    }

    /// Every product the API exposes
    pub fn all() -> [Product; 6] {
        [
            Product::standard(ProductKind::Stars),
            Product::without_kyc(ProductKind::Stars),
            Product::standard(ProductKind::Premium),
            Product::without_kyc(ProductKind::Premium),
            Product::standard(ProductKind::Ton),
            Product::without_kyc(ProductKind::Ton),
        ]
    }

    pub fn requires_verification(&self) -> bool {
        self.mode == VerificationMode::Standard
    }

    /// Endpoint family name, e.g. `buyStarsWithoutKYC`
    pub fn endpoint_name(&self) -> String {
        match self.mode {
            VerificationMode::Standard => self.kind.path_stem().to_string(),
            VerificationMode::WithoutKyc => format!("{}WithoutKYC", self.kind.path_stem()),
        }
    }

    pub fn create_path(&self) -> String {
        format!("/v2/{}/create", self.endpoint_name())
    }

    pub fn pay_path(&self) -> String {
        format!("/v2/{}/pay", self.endpoint_name())
    }

    pub fn check_path(&self) -> String {
        format!("/v2/{}/check", self.endpoint_name())
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.endpoint_name())
    }
}

/// TON wallet contract version used to sign the payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WalletType {
    #[default]
    #[serde(rename = "v4r2")]
    V4R2,
    #[serde(rename = "v5r1")]
    V5R1,
}

impl WalletType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletType::V4R2 => "v4r2",
            WalletType::V5R1 => "v5r1",
        }
    }
}

impl fmt::Display for WalletType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
