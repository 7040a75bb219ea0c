//! Domain Layer
//!
//! Products, orders, outcomes and error classification. Pure data and
//! rules; nothing in here performs I/O.

pub mod account;
pub mod errors;
pub mod order;
pub mod product;

pub use account::{AuthKey, AuthKeyResponse, Balance, OrderHistory, OrderRecord, Ping, UserInfo};
pub use errors::{ErrorCode, ErrorPolicy, FailureReason, Retryability};
pub use order::{
    LifecycleError, LifecycleState, Order, OrderStatus, PayerCredential, PurchaseRequest,
    RemoteOutcome, Settlement,
};
pub use product::{Product, ProductKind, VerificationMode, WalletType};
