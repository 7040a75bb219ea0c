//! Order endpoints for RestClient: request bodies and single-shot calls

use serde_json::{json, Map, Number, Value};
use tracing::debug;

use super::RestClient;
use crate::domain::{
    PayerCredential, Product, PurchaseRequest, RemoteOutcome, VerificationMode, WalletType,
};
use crate::error::{FragmentError, Result};
use crate::infrastructure::client::credentials::CredentialError;
use crate::infrastructure::client::transport::{Transport, TransportError};

/// Credential fields merged into a request body
pub type CredentialFields = Map<String, Value>;

impl<T: Transport> RestClient<T> {
    /// Credential fields for the create call
    ///
    /// Flows without verification create orders anonymously.
    pub fn create_credential_fields(
        &self,
        product: Product,
        credential: &PayerCredential,
    ) -> std::result::Result<CredentialFields, CredentialError> {
        let mut fields = Map::new();
        if product.mode == VerificationMode::WithoutKyc {
            return Ok(fields);
        }

        match credential {
            PayerCredential::AuthKey(key) => {
                fields.insert("auth_key".into(), Value::String(key.as_str().to_string()));
            }
            PayerCredential::Secrets { cookies, .. } => {
                let cookies = self.credentials.cookies(cookies.as_deref())?;
                fields.insert("fragment_cookies".into(), Value::String(cookies));
            }
        }
        Ok(fields)
    }

    /// Credential fields for the pay call
    pub fn pay_credential_fields(
        &self,
        product: Product,
        credential: &PayerCredential,
    ) -> std::result::Result<CredentialFields, CredentialError> {
        let mut fields = Map::new();

        match credential {
            PayerCredential::AuthKey(key) => {
                fields.insert("auth_key".into(), Value::String(key.as_str().to_string()));
            }
            PayerCredential::Secrets { seed, cookies } => {
                let seed = self.credentials.seed(seed.as_deref())?;
                fields.insert("seed".into(), Value::String(seed));

                if product.requires_verification() {
                    let cookies = self.credentials.cookies(cookies.as_deref())?;
                    fields.insert("fragment_cookies".into(), Value::String(cookies));
                }
            }
        }
        Ok(fields)
    }

    /// Body of `POST /v2/{product}/create`
    pub fn create_body(
        &self,
        request: &PurchaseRequest,
        quantity_field: &str,
        quantity: u64,
        credential_fields: &CredentialFields,
    ) -> Value {
        let product = request.product;
        let mut body = Map::new();
        body.insert("username".into(), Value::String(request.recipient.clone()));
        body.insert(quantity_field.into(), Value::from(quantity));

        if product.requires_verification() {
            body.extend(credential_fields.clone());
            body.insert("show_sender".into(), Value::Bool(request.show_sender));
        }
        if let Some(custom_order) = &request.custom_order {
            body.insert("custom_order".into(), custom_order.clone());
        }

        Value::Object(body)
    }

    /// Body of `POST /v2/{product}/pay`
    pub fn pay_body(
        &self,
        order_id: &str,
        cost: &Number,
        wallet_type: WalletType,
        credential_fields: &CredentialFields,
    ) -> Value {
        let mut body = json!({
            "order_uuid": order_id,
            "cost": cost,
            "wallet_type": wallet_type,
        });
        if let Value::Object(map) = &mut body {
            map.extend(credential_fields.clone());
        }
        body
    }

    /// POST a create or pay body and read the outcome
    pub async fn submit_order_call(
        &self,
        path: &str,
        body: &Value,
    ) -> std::result::Result<RemoteOutcome, TransportError> {
        debug!("POST {}", path);
        self.post(path, body).await
    }

    /// GET the check endpoint for one order
    pub async fn fetch_order_status(
        &self,
        check_path: &str,
        order_id: &str,
    ) -> std::result::Result<RemoteOutcome, TransportError> {
        let query = [("uuid", order_id.to_string())];
        self.get(check_path, &query).await
    }

    /// Create an order without retrying
    ///
    /// The raw outcome is returned, including `success: false` responses.
    pub async fn create_order(&self, request: &PurchaseRequest) -> Result<RemoteOutcome> {
        let quantity = request.resolved_quantity().ok_or_else(|| {
            FragmentError::InvalidRequest(format!(
                "{} requires a {}",
                request.product,
                request.product.kind.quantity_field()
            ))
        })?;
        let fields = self.create_credential_fields(request.product, &request.credential)?;
        let quantity_field = request.product.kind.quantity_field();
        let body = self.create_body(request, quantity_field, quantity, &fields);

        Ok(self.submit_order_call(&request.product.create_path(), &body).await?)
    }

    /// Pay an existing order without retrying
    pub async fn pay_order(
        &self,
        product: Product,
        order_id: &str,
        cost: &Number,
        credential: &PayerCredential,
        wallet_type: WalletType,
    ) -> Result<RemoteOutcome> {
        let fields = self.pay_credential_fields(product, credential)?;
        let body = self.pay_body(order_id, cost, wallet_type, &fields);

        Ok(self.submit_order_call(&product.pay_path(), &body).await?)
    }

    /// Current status of an order
    pub async fn check_order(&self, product: Product, order_id: &str) -> Result<RemoteOutcome> {
        Ok(self.fetch_order_status(&product.check_path(), order_id).await?)
    }
}
