//! Application Facade
//!
//! Public API for binaries and library users: read operations, manual order
//! management, auth key issuance and the retrying purchase flows.

use serde_json::Number;
use tokio_util::sync::CancellationToken;

use super::auth::AuthKeyIssuer;
use super::order_flow::{FlowSettings, FlowSpec, OrderFlowController};
use crate::domain::{
    AuthKey, AuthKeyResponse, Balance, OrderHistory, PayerCredential, Ping, Product, ProductKind,
    PurchaseRequest, RemoteOutcome, UserInfo, WalletType,
};
use crate::error::{FragmentError, Result};
use crate::infrastructure::client::{
    CredentialEncoding, CredentialPreparer, HttpTransport, RestClient, Transport, DEFAULT_BASE_URL,
};
use crate::infrastructure::config::ClientConfig;

/// Fragment API client
///
/// `Send + Sync`; share it behind an `Arc` across tasks. Each purchase owns
/// its own order id and retry counters.
pub struct FragmentClient<T: Transport = HttpTransport> {
    rest: RestClient<T>,
    settings: FlowSettings,
    wallet_type: WalletType,
}

impl FragmentClient<HttpTransport> {
    /// Client against the public API with default settings
    pub fn new(seed: Option<String>, fragment_cookies: Option<String>) -> Result<Self> {
        let credentials = CredentialPreparer::new(CredentialEncoding::default())
            .with_default_seed(seed)
            .with_default_cookies(fragment_cookies);
        let rest = RestClient::new(DEFAULT_BASE_URL, credentials)?;

        Ok(Self::with_rest(rest, FlowSettings::default()))
    }

    /// Client built from a loaded configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let credentials = CredentialPreparer::new(config.credential_encoding)
            .with_default_seed(config.seed.clone())
            .with_default_cookies(config.fragment_cookies.clone());
        let rest =
            RestClient::with_timeout(&config.base_url, config.request_timeout(), credentials)?;

        Ok(Self::with_rest(rest, FlowSettings::from_config(config))
            .with_wallet_type(config.wallet_type))
    }
}

impl<T: Transport> FragmentClient<T> {
    pub fn with_transport(
        transport: T,
        credentials: CredentialPreparer,
        settings: FlowSettings,
    ) -> Self {
        Self::with_rest(RestClient::with_transport(transport, credentials), settings)
    }

    pub fn with_rest(rest: RestClient<T>, settings: FlowSettings) -> Self {
        Self {
            rest,
            settings,
            wallet_type: WalletType::default(),
        }
    }

    /// Wallet used by requests built with [`request`](Self::request)
    pub fn with_wallet_type(mut self, wallet_type: WalletType) -> Self {
        self.wallet_type = wallet_type;
        self
    }

    pub fn wallet_type(&self) -> WalletType {
        self.wallet_type
    }

    /// Purchase request pre-filled with this client's wallet type
    pub fn request(&self, product: Product, recipient: impl Into<String>) -> PurchaseRequest {
        PurchaseRequest::new(product, recipient).with_wallet_type(self.wallet_type)
    }

    pub fn rest(&self) -> &RestClient<T> {
        &self.rest
    }

    pub fn settings(&self) -> &FlowSettings {
        &self.settings
    }

    fn controller(&self) -> OrderFlowController<'_, T> {
        OrderFlowController::new(&self.rest, &self.settings)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub async fn ping(&self) -> Result<Ping> {
        self.rest.ping().await
    }

    pub async fn get_balance(&self, seed: Option<&str>, wallet_type: WalletType) -> Result<Balance> {
        self.rest.get_balance(seed, wallet_type).await
    }

    pub async fn get_balance_with_auth_key(
        &self,
        auth_key: &AuthKey,
        wallet_type: WalletType,
    ) -> Result<Balance> {
        self.rest.get_balance_with_auth_key(auth_key, wallet_type).await
    }

    pub async fn get_user_info(&self, username: &str, cookies: Option<&str>) -> Result<UserInfo> {
        self.rest.get_user_info(username, cookies).await
    }

    pub async fn get_orders(
        &self,
        seed: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<OrderHistory> {
        self.rest.get_orders(seed, limit, offset).await
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Exchange cookies and seed for an auth key, retrying transient failures
    pub async fn create_auth_key(&self, cookies: Option<&str>, seed: Option<&str>) -> Result<AuthKey> {
        self.create_auth_key_with_cancel(cookies, seed, &CancellationToken::new())
            .await
    }

    pub async fn create_auth_key_with_cancel(
        &self,
        cookies: Option<&str>,
        seed: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<AuthKey> {
        AuthKeyIssuer::new(&self.rest, self.settings.auth.as_ref())
            .issue(cookies, seed, cancel)
            .await
    }

    /// Single auth request returning the raw response
    pub async fn request_auth_key(
        &self,
        cookies: Option<&str>,
        seed: Option<&str>,
    ) -> Result<AuthKeyResponse> {
        self.rest.request_auth_key(cookies, seed).await
    }

    // =========================================================================
    // Purchases
    // =========================================================================

    /// Drive a purchase to a terminal outcome
    pub async fn purchase(&self, request: &PurchaseRequest) -> Result<RemoteOutcome> {
        self.purchase_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// Like [`purchase`](Self::purchase), aborting at the next wait once
    /// `cancel` fires
    pub async fn purchase_with_cancel(
        &self,
        request: &PurchaseRequest,
        cancel: &CancellationToken,
    ) -> Result<RemoteOutcome> {
        self.controller().purchase(request, cancel).await
    }

    /// Purchase with a custom flow description
    pub async fn purchase_with_flow(
        &self,
        spec: &FlowSpec,
        request: &PurchaseRequest,
        cancel: &CancellationToken,
    ) -> Result<RemoteOutcome> {
        if spec.product != request.product {
            return Err(FragmentError::InvalidRequest(format!(
                "flow for {} cannot run a {} request",
                spec.product, request.product
            )));
        }
        self.controller().run(spec, request, cancel).await
    }

    pub async fn buy_stars(
        &self,
        username: &str,
        amount: u64,
        credential: impl Into<PayerCredential>,
        wallet_type: WalletType,
        show_sender: bool,
    ) -> Result<RemoteOutcome> {
        let request = PurchaseRequest::new(Product::standard(ProductKind::Stars), username)
            .with_quantity(amount)
            .with_credential(credential)
            .with_wallet_type(wallet_type)
            .with_show_sender(show_sender);
        self.purchase(&request).await
    }

    pub async fn buy_stars_without_kyc(
        &self,
        username: &str,
        amount: u64,
        credential: impl Into<PayerCredential>,
        wallet_type: WalletType,
    ) -> Result<RemoteOutcome> {
        let request = PurchaseRequest::new(Product::without_kyc(ProductKind::Stars), username)
            .with_quantity(amount)
            .with_credential(credential)
            .with_wallet_type(wallet_type);
        self.purchase(&request).await
    }

    /// Telegram Premium; `months` defaults to 3
    pub async fn buy_premium(
        &self,
        username: &str,
        months: Option<u64>,
        credential: impl Into<PayerCredential>,
        wallet_type: WalletType,
        show_sender: bool,
    ) -> Result<RemoteOutcome> {
        let mut request = PurchaseRequest::new(Product::standard(ProductKind::Premium), username)
            .with_credential(credential)
            .with_wallet_type(wallet_type)
            .with_show_sender(show_sender);
        request.quantity = months;
        self.purchase(&request).await
    }

    pub async fn buy_premium_without_kyc(
        &self,
        username: &str,
        months: Option<u64>,
        credential: impl Into<PayerCredential>,
        wallet_type: WalletType,
    ) -> Result<RemoteOutcome> {
        let mut request =
            PurchaseRequest::new(Product::without_kyc(ProductKind::Premium), username)
                .with_credential(credential)
                .with_wallet_type(wallet_type);
        request.quantity = months;
        self.purchase(&request).await
    }

    pub async fn buy_ton(
        &self,
        username: &str,
        amount: u64,
        credential: impl Into<PayerCredential>,
        wallet_type: WalletType,
        show_sender: bool,
    ) -> Result<RemoteOutcome> {
        let request = PurchaseRequest::new(Product::standard(ProductKind::Ton), username)
            .with_quantity(amount)
            .with_credential(credential)
            .with_wallet_type(wallet_type)
            .with_show_sender(show_sender);
        self.purchase(&request).await
    }

    pub async fn buy_ton_without_kyc(
        &self,
        username: &str,
        amount: u64,
        credential: impl Into<PayerCredential>,
        wallet_type: WalletType,
    ) -> Result<RemoteOutcome> {
        let request = PurchaseRequest::new(Product::without_kyc(ProductKind::Ton), username)
            .with_quantity(amount)
            .with_credential(credential)
            .with_wallet_type(wallet_type);
        self.purchase(&request).await
    }

    // =========================================================================
    // Manual order management
    // =========================================================================

    /// Create an order without retry
    pub async fn create_order(&self, request: &PurchaseRequest) -> Result<RemoteOutcome> {
        self.rest.create_order(request).await
    }

    /// Pay an order without retry
    pub async fn pay_order(
        &self,
        product: Product,
        order_id: &str,
        cost: &Number,
        credential: &PayerCredential,
        wallet_type: WalletType,
    ) -> Result<RemoteOutcome> {
        self.rest
            .pay_order(product, order_id, cost, credential, wallet_type)
            .await
    }

    /// Current status of an order
    pub async fn check_order(&self, product: Product, order_id: &str) -> Result<RemoteOutcome> {
        self.rest.check_order(product, order_id).await
    }
}
