//! HTTP access to the Fragment API

pub mod credentials;
pub mod helpers;
pub mod rest;
pub mod transport;

pub use credentials::{CredentialEncoding, CredentialError, CredentialKind, CredentialPreparer};
pub use rest::{RestClient, DEFAULT_ORDERS_LIMIT};
pub use transport::{HttpTransport, Transport, TransportError, DEFAULT_BASE_URL};
