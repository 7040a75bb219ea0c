//! Client configuration
//!
//! Tunables live in YAML; secrets only ever come from the environment
//! (`.env` is honoured).

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::domain::WalletType;
use crate::infrastructure::client::{CredentialEncoding, DEFAULT_BASE_URL};

pub const CONFIG_PATH_ENV: &str = "FRAGMENT_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/fragment.yaml";
pub const SEED_ENV: &str = "FRAGMENT_SEED";
pub const COOKIES_ENV: &str = "FRAGMENT_COOKIES";
pub const API_URL_ENV: &str = "FRAGMENT_API_URL";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Environment variable not found: {0}")]
    EnvVarMissing(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// How the delay between attempts grows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffKind {
    /// `base_delay * attempt`
    #[default]
    Linear,
    /// `base_delay` every time
    Fixed,
}

/// Bounded retry settings for one phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    #[serde(default)]
    pub backoff: BackoffKind,
}

impl RetryConfig {
    pub fn create_default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 1000,
            backoff: BackoffKind::Linear,
        }
    }

    pub fn pay_default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 1000,
            backoff: BackoffKind::Linear,
        }
    }

    pub fn auth_default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            backoff: BackoffKind::Linear,
        }
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    fn validate(&self, phase: &str) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(ConfigError::ValidationError(format!(
                "{}.max_attempts must be greater than 0",
                phase
            )));
        }
        if self.base_delay_ms == 0 {
            return Err(ConfigError::ValidationError(format!(
                "{}.base_delay_ms must be greater than 0",
                phase
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationPolicyKind {
    /// A fixed number of polls
    FixedAttempts,
    /// Poll until a time window elapses
    #[default]
    TimeBounded,
}

/// Polling after payment attempts were exhausted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationConfig {
    #[serde(default)]
    pub policy: ReconciliationPolicyKind,
    /// Number of polls (fixed_attempts)
    #[serde(default = "default_reconcile_attempts")]
    pub attempts: u32,
    /// Delay before each poll; defaults depend on the policy
    #[serde(default)]
    pub interval_ms: Option<u64>,
    /// Polling window (time_bounded)
    #[serde(default = "default_reconcile_window")]
    pub window_secs: u64,
}

fn default_reconcile_attempts() -> u32 {
    5
}

fn default_reconcile_window() -> u64 {
    120
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            policy: ReconciliationPolicyKind::default(),
            attempts: default_reconcile_attempts(),
            interval_ms: None,
            window_secs: default_reconcile_window(),
        }
    }
}

impl ReconciliationConfig {
    pub fn interval(&self) -> Duration {
        let default_ms = match self.policy {
            ReconciliationPolicyKind::FixedAttempts => 1000,
            ReconciliationPolicyKind::TimeBounded => 15_000,
        };
        Duration::from_millis(self.interval_ms.unwrap_or(default_ms))
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.interval_ms == Some(0) {
            return Err(ConfigError::ValidationError(
                "reconciliation.interval_ms must be greater than 0".to_string(),
            ));
        }
        match self.policy {
            ReconciliationPolicyKind::FixedAttempts if self.attempts == 0 => {
                Err(ConfigError::ValidationError(
                    "reconciliation.attempts must be greater than 0".to_string(),
                ))
            }
            ReconciliationPolicyKind::TimeBounded if self.window_secs == 0 => {
                Err(ConfigError::ValidationError(
                    "reconciliation.window_secs must be greater than 0".to_string(),
                ))
            }
            ReconciliationPolicyKind::TimeBounded if self.interval() > self.window() => {
                Err(ConfigError::ValidationError(format!(
                    "reconciliation.interval_ms ({}) must not exceed window_secs ({})",
                    self.interval().as_millis(),
                    self.window_secs
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Fragment API client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub credential_encoding: CredentialEncoding,
    /// Default wallet for requests built by `FragmentClient::request`
    #[serde(default)]
    pub wallet_type: WalletType,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "RetryConfig::create_default")]
    pub create: RetryConfig,
    #[serde(default = "RetryConfig::pay_default")]
    pub pay: RetryConfig,
    #[serde(default = "RetryConfig::auth_default")]
    pub auth: RetryConfig,
    #[serde(default)]
    pub reconciliation: ReconciliationConfig,

    /// Default seed phrase from .env (not in YAML)
    #[serde(skip)]
    pub seed: Option<String>,

    /// Default Fragment cookie header from .env (not in YAML)
    #[serde(skip)]
    pub fragment_cookies: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            credential_encoding: CredentialEncoding::default(),
            wallet_type: WalletType::default(),
            request_timeout_secs: default_request_timeout(),
            log_level: default_log_level(),
            create: RetryConfig::create_default(),
            pay: RetryConfig::pay_default(),
            auth: RetryConfig::auth_default(),
            reconciliation: ReconciliationConfig::default(),
            seed: None,
            fragment_cookies: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from YAML file and .env
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        let yaml_content = std::fs::read_to_string(config_path)?;
        let mut config = Self::from_yaml(&yaml_content)?;

        config.apply_env();
        config.validate()?;

        Ok(config)
    }

    /// Defaults plus .env, for running without a config file
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML without touching the environment
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ClientConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        dotenv::dotenv().ok();

        if let Ok(url) = std::env::var(API_URL_ENV) {
            info!("Overriding base URL from environment variable");
            self.base_url = url;
        }
        if let Ok(seed) = std::env::var(SEED_ENV) {
            self.seed = Some(seed);
        }
        if let Ok(cookies) = std::env::var(COOKIES_ENV) {
            self.fragment_cookies = Some(cookies);
        }
    }

    /// Fail unless default credentials were provided through the environment
    pub fn require_credentials(&self) -> Result<()> {
        if self.seed.as_deref().map_or(true, |s| s.trim().is_empty()) {
            return Err(ConfigError::EnvVarMissing(SEED_ENV.to_string()));
        }
        if self
            .fragment_cookies
            .as_deref()
            .map_or(true, |c| c.trim().is_empty())
        {
            return Err(ConfigError::EnvVarMissing(COOKIES_ENV.to_string()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "base_url cannot be empty".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        self.create.validate("create")?;
        self.pay.validate("pay")?;
        self.auth.validate("auth")?;
        self.reconciliation.validate()?;

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "log_level must be one of: {}",
                valid_levels.join(", ")
            )));
        }

        Ok(())
    }

    /// Log configuration summary
    pub fn log(&self) {
        info!("Configuration loaded:");
        info!("  Base URL: {}", self.base_url);
        info!("  Credential encoding: {:?}", self.credential_encoding);
        info!("  Wallet type: {}", self.wallet_type);
        info!("  Request timeout: {} seconds", self.request_timeout_secs);
        info!(
            "  Create retries: {} x {}ms ({:?})",
            self.create.max_attempts, self.create.base_delay_ms, self.create.backoff
        );
        info!(
            "  Pay retries: {} x {}ms ({:?})",
            self.pay.max_attempts, self.pay.base_delay_ms, self.pay.backoff
        );
        info!("  Reconciliation: {:?}", self.reconciliation.policy);
        info!("  Log level: {}", self.log_level);
        info!(
            "  Default seed: {}",
            if self.seed.is_some() { "set" } else { "not set" }
        );
        info!(
            "  Default cookies: {}",
            if self.fragment_cookies.is_some() { "set" } else { "not set" }
        );
    }
}

/// Config file path from `FRAGMENT_CONFIG_PATH`, or the default location
pub fn config_path_from_env() -> String {
    std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.base_url, "https://api.fragment-api.net");
        assert_eq!(config.create.max_attempts, 5);
        assert_eq!(config.auth.base_delay(), Duration::from_millis(500));
        assert_eq!(config.reconciliation.policy, ReconciliationPolicyKind::TimeBounded);
        assert_eq!(config.reconciliation.interval(), Duration::from_secs(15));
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = ClientConfig::from_yaml(
            r#"
wallet_type: v5r1
pay:
  max_attempts: 3
  base_delay_ms: 250
  backoff: fixed
reconciliation:
  policy: fixed_attempts
"#,
        )
        .unwrap();

        assert_eq!(config.wallet_type, WalletType::V5R1);
        assert_eq!(config.pay.backoff, BackoffKind::Fixed);
        assert_eq!(config.create, RetryConfig::create_default());
        assert_eq!(config.reconciliation.attempts, 5);
        assert_eq!(config.reconciliation.interval(), Duration::from_millis(1000));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = ClientConfig::default();
        config.pay.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.log_level = "verbose".to_string();
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.reconciliation.interval_ms = Some(0);
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.base_url = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_interval_longer_than_window_rejected() {
        let mut config = ClientConfig::default();
        config.reconciliation.window_secs = 10;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(msg)) if msg.contains("interval_ms")
        ));

        config.reconciliation.interval_ms = Some(10_000);
        assert!(config.validate().is_ok());

        // Only the time-bounded policy has a window
        config.reconciliation.policy = ReconciliationPolicyKind::FixedAttempts;
        config.reconciliation.interval_ms = Some(60_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_never_carries_secrets() {
        let config = ClientConfig::from_yaml("seed: \"abandon abandon\"\n").unwrap();
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_require_credentials() {
        let mut config = ClientConfig::default();
        assert!(matches!(
            config.require_credentials(),
            Err(ConfigError::EnvVarMissing(var)) if var == SEED_ENV
        ));

        config.seed = Some("abandon ".repeat(12));
        config.fragment_cookies = Some("stel_ssid=abc".to_string());
        assert!(config.require_credentials().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "request_timeout_secs: 5\nlog_level: debug").unwrap();

        let config = ClientConfig::load(file.path()).unwrap();
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_missing_file() {
        let result = ClientConfig::load("/definitely/not/here.yaml");
        assert!(matches!(result, Err(ConfigError::FileError(_))));
    }
}
