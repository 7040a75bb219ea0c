//! Fragment API Client - Main Library
//!
//! Buys Telegram Stars, Premium and TON through the Fragment API.
//!
//! ## Architecture
//!
//! - **bin_common**: Common utilities for binary executables (CLI, runners)
//! - **fragment**: Core client library (re-exported from workspace)
//!
//! ## Usage in Binaries
//!
//! ```ignore
//! use fragment_api_client::bin_common::{load_config_from_env, ConfigType};
//! use fragment_api_client::fragment::FragmentClient;
//! ```

// Re-export workspace libraries for convenience
pub use fragment;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;
    pub mod runner;

    pub use cli::{load_config_from_env, parse_args, ConfigType, DemoArgs};
    pub use runner::{BinaryRunner, RunConfig};
}
