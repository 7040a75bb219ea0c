use anyhow::Result;
use fragment::infrastructure::client::DEFAULT_ORDERS_LIMIT;
use fragment::{
    init_tracing, AuthKey, ClientConfig, FragmentClient, PayerCredential, Product, ProductKind,
    ShutdownManager,
};
use fragment_api_client::bin_common::{
    load_config_from_env, parse_args, BinaryRunner, ConfigType, DemoArgs, RunConfig,
};
use tracing::{info, warn};

struct DemoRunner {
    run_config: RunConfig,
    app_config: ClientConfig,
    client: FragmentClient,
    shutdown: ShutdownManager,
    recipient: Option<String>,
}

impl DemoRunner {
    async fn reads(&self) -> Result<()> {
        let ping = self.client.ping().await?;
        info!("API ping: {:?}", ping.status);

        let wallet = self.client.wallet_type();
        match self.client.get_balance(None, wallet).await {
            Ok(balance) => info!("Balance ({}): {:?}", wallet, balance.balance),
            Err(e) => warn!("Balance unavailable: {}", e),
        }

        if let Some(recipient) = &self.recipient {
            match self.client.get_user_info(recipient, None).await {
                Ok(user) => info!("User info: {:?} ({:?})", user.name, user.username),
                Err(e) => warn!("User info unavailable: {}", e),
            }
        }

        match self.client.get_orders(None, DEFAULT_ORDERS_LIMIT, 0).await {
            Ok(history) => info!("Orders: {} returned", history.orders.len()),
            Err(e) => warn!("Orders unavailable: {}", e),
        }
        Ok(())
    }

    async fn purchases(&self, recipient: &str) -> Result<()> {
        self.app_config.require_credentials()?;
        let cancel = self.shutdown.token();

        let auth_key: AuthKey = self
            .client
            .create_auth_key_with_cancel(None, None, &cancel)
            .await?;
        info!("Auth key issued");

        let balance = self
            .client
            .get_balance_with_auth_key(&auth_key, self.client.wallet_type())
            .await?;
        info!("Balance via auth key: {:?}", balance.balance);

        let stars = self
            .client
            .request(Product::without_kyc(ProductKind::Stars), recipient)
            .with_quantity(100)
            .with_credential(auth_key.clone());
        let outcome = self.client.purchase_with_cancel(&stars, &cancel).await?;
        info!("Buy stars without KYC: {:?}", outcome);

        let premium = self
            .client
            .request(Product::standard(ProductKind::Premium), recipient)
            .with_credential(auth_key);
        let outcome = self.client.purchase_with_cancel(&premium, &cancel).await?;
        info!("Buy Premium: {:?}", outcome);

        // Manual order management with raw secrets from the environment
        let manual = self
            .client
            .request(Product::standard(ProductKind::Premium), recipient)
            .with_credential(PayerCredential::default());
        let created = self.client.create_order(&manual).await?;
        info!("Created order: {:?}", created);

        if let (true, Some(order_id), Some(cost)) =
            (created.success, created.order_id.as_deref(), created.cost.as_ref())
        {
            let paid = self
                .client
                .pay_order(
                    manual.product,
                    order_id,
                    cost,
                    &manual.credential,
                    manual.wallet_type,
                )
                .await?;
            info!("Pay order result: {:?}", paid);

            let status = self.client.check_order(manual.product, order_id).await?;
            info!("Order status: {:?}", status.status);
        }
        Ok(())
    }
}

impl BinaryRunner for DemoRunner {
    async fn run(&mut self) -> Result<()> {
        self.reads().await?;

        if self.run_config.dry_run {
            return Ok(());
        }
        match self.recipient.clone() {
            Some(recipient) => self.purchases(&recipient).await,
            None => {
                warn!("--buy needs a recipient username");
                Ok(())
            }
        }
    }

    fn config(&self) -> &RunConfig {
        &self.run_config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = DemoArgs::parse(&parse_args());

    let config_path = load_config_from_env(ConfigType::Client);
    let app_config = if config_path.exists() {
        ClientConfig::load(&config_path)?
    } else {
        ClientConfig::from_env()?
    };

    init_tracing(&app_config.log_level);
    app_config.log();

    let shutdown = ShutdownManager::new();
    shutdown.spawn_signal_handler();

    let mut runner = DemoRunner {
        run_config: RunConfig::new("Fragment Demo").with_dry_run(!args.buy),
        client: FragmentClient::from_config(&app_config)?,
        app_config,
        shutdown,
        recipient: args.recipient,
    };

    runner.execute().await
}
