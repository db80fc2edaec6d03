//! Configuration for the tBTC relay maintainer.

mod config;

pub use config::{
    BitcoindConfig, Config, ConfigError, HostChainConfig, LoggingConfig, RelayConfig,
};
