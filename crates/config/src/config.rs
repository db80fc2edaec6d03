use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default value for `headers_batch_size` in [`RelayConfig`].
const DEFAULT_HEADERS_BATCH_SIZE: usize = 5;

/// Default value for `header_timeout_ms` in [`RelayConfig`].
const DEFAULT_HEADER_TIMEOUT_MS: u64 = 60_000;

/// Default value for `poll_interval_ms` in [`RelayConfig`].
const DEFAULT_POLL_INTERVAL_MS: u64 = 10_000;

/// Default value for `retry_interval_ms` in [`RelayConfig`].
const DEFAULT_RETRY_INTERVAL_MS: u64 = 5_000;

fn default_headers_batch_size() -> usize {
    DEFAULT_HEADERS_BATCH_SIZE
}

fn default_header_timeout_ms() -> u64 {
    DEFAULT_HEADER_TIMEOUT_MS
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_retry_interval_ms() -> u64 {
    DEFAULT_RETRY_INTERVAL_MS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BitcoindConfig {
    pub rpc_url: String,
    pub rpc_user: String,
    pub rpc_password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_count: Option<u8>,
    /// Delay between retries, in ms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_interval: Option<u64>,
}

/// Chain hosting the relay contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostChainConfig {
    pub rpc_url: String,

    /// Address of the deployed relay contract.
    pub relay_address: Address,

    /// File holding the hex-encoded key headers are submitted with.
    pub signer_key: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Number of headers submitted to the relay in one transaction.
    #[serde(default = "default_headers_batch_size")]
    pub headers_batch_size: usize,

    /// How long to wait for a batch to fill before sending what arrived, in
    /// ms.
    #[serde(default = "default_header_timeout_ms")]
    pub header_timeout_ms: u64,

    /// Interval between polls of the Bitcoin tip, in ms.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Delay before a failed submission to the host chain is retried, in ms.
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,
}

impl RelayConfig {
    pub fn header_timeout(&self) -> Duration {
        Duration::from_millis(self.header_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            headers_batch_size: DEFAULT_HEADERS_BATCH_SIZE,
            header_timeout_ms: DEFAULT_HEADER_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            retry_interval_ms: DEFAULT_RETRY_INTERVAL_MS,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Service label to append to the service name (e.g., "mainnet").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_label: Option<String>,

    /// Directory path for file-based logging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Prefix for log file names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file_prefix: Option<String>,

    /// Use JSON format for logs instead of compact format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_format: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub bitcoind: BitcoindConfig,
    pub host_chain: HostChainConfig,

    #[serde(default)]
    pub relay: RelayConfig,

    /// Logging configuration (optional section in TOML).
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config: {0}")]
    Io(#[from] io::Error),

    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("relay.headers_batch_size must be greater than zero")]
    ZeroBatchSize,
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(s)?;
        if config.relay.headers_batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }
}
