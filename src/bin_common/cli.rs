//! CLI utilities for binaries
//!
//! Handles configuration path lookup and argument parsing for the binaries.

use std::path::PathBuf;

/// Type of configuration to load
#[derive(Debug, Clone)]
pub enum ConfigType {
    /// Client configuration (config/fragment.yaml)
    Client,
    /// Custom path
    Custom(String),
}

impl ConfigType {
    /// Get the default path for this config type
    pub fn default_path(&self) -> &str {
        match self {
            ConfigType::Client => fragment::infrastructure::config::DEFAULT_CONFIG_PATH,
            ConfigType::Custom(path) => path,
        }
    }

    /// Get the environment variable name for this config type
    pub fn env_var_name(&self) -> &str {
        fragment::infrastructure::config::CONFIG_PATH_ENV
    }
}

/// Load configuration path from environment or use default
///
/// A custom path always wins over the environment.
pub fn load_config_from_env(config_type: ConfigType) -> PathBuf {
    if let ConfigType::Custom(path) = &config_type {
        return PathBuf::from(path);
    }
    std::env::var(config_type.env_var_name())
        .unwrap_or_else(|_| config_type.default_path().to_string())
        .into()
}

/// Parse command line arguments for a binary
///
/// Returns a vector of arguments (excluding the program name)
pub fn parse_args() -> Vec<String> {
    std::env::args().skip(1).collect()
}

/// Arguments of the demo binary: `[recipient] [--buy]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemoArgs {
    pub recipient: Option<String>,
    /// Actually place orders; reads only otherwise
    pub buy: bool,
}

impl DemoArgs {
    pub fn parse(args: &[String]) -> Self {
        let mut parsed = DemoArgs::default();
        for arg in args {
            match arg.as_str() {
                "--buy" => parsed.buy = true,
                other if parsed.recipient.is_none() && !other.starts_with("--") => {
                    parsed.recipient = Some(other.trim_start_matches('@').to_string());
                }
                _ => {}
            }
        }
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_type_paths() {
        assert_eq!(ConfigType::Client.default_path(), "config/fragment.yaml");

        let custom = ConfigType::Custom("custom/path.yaml".to_string());
        assert_eq!(custom.default_path(), "custom/path.yaml");
    }

    #[test]
    fn test_demo_args() {
        let args = vec!["@durov".to_string(), "--buy".to_string()];
        assert_eq!(
            DemoArgs::parse(&args),
            DemoArgs {
                recipient: Some("durov".to_string()),
                buy: true,
            }
        );
        assert_eq!(DemoArgs::parse(&[]), DemoArgs::default());
    }
}
