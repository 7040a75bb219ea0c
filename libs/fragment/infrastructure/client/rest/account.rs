//! Read-only account queries for RestClient

use tracing::debug;

use super::RestClient;
use crate::domain::{AuthKey, Balance, OrderHistory, Ping, UserInfo, WalletType};
use crate::error::Result;
use crate::infrastructure::client::transport::Transport;

pub const DEFAULT_ORDERS_LIMIT: u32 = 10;

impl<T: Transport> RestClient<T> {
    /// Liveness check
    pub async fn ping(&self) -> Result<Ping> {
        Ok(self.get("/v2/ping", &[]).await?)
    }

    /// Wallet balance for a seed phrase (or the default seed)
    pub async fn get_balance(&self, seed: Option<&str>, wallet_type: WalletType) -> Result<Balance> {
        let seed = self.credentials.seed(seed)?;
        debug!("Fetching {} wallet balance", wallet_type);

        let query = [("seed", seed), ("wallet_type", wallet_type.to_string())];
        Ok(self.get("/v2/getBalance", &query).await?)
    }

    /// Wallet balance for an auth key
    pub async fn get_balance_with_auth_key(
        &self,
        auth_key: &AuthKey,
        wallet_type: WalletType,
    ) -> Result<Balance> {
        let query = [
            ("auth_key", auth_key.as_str().to_string()),
            ("wallet_type", wallet_type.to_string()),
        ];
        Ok(self.get("/v2/getBalance", &query).await?)
    }

    /// Telegram profile lookup, authenticated with Fragment cookies
    pub async fn get_user_info(&self, username: &str, cookies: Option<&str>) -> Result<UserInfo> {
        let cookies = self.credentials.cookies(cookies)?;
        debug!("Fetching user info for {}", username);

        let query = [
            ("username", username.to_string()),
            ("fragment_cookies", cookies),
        ];
        Ok(self.get("/v2/getUserInfo", &query).await?)
    }

    /// Page of the wallet's order history
    pub async fn get_orders(
        &self,
        seed: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<OrderHistory> {
        let seed = self.credentials.seed(seed)?;
        debug!("Fetching orders (limit={}, offset={})", limit, offset);

        let query = [
            ("seed", seed),
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
        ];
        Ok(self.get("/v2/getOrders", &query).await?)
    }

    /// Most recent orders with the default page size
    pub async fn get_recent_orders(&self, seed: Option<&str>) -> Result<OrderHistory> {
        self.get_orders(seed, DEFAULT_ORDERS_LIMIT, 0).await
    }
}
