use std::{io, result};

use tbtc_common::logging::InitError;
use tbtc_config::ConfigError;
use tbtc_relay::RelayError;
use thiserror::Error;

pub(crate) type Result<T> = result::Result<T, AppError>;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("logging: {0}")]
    Logging(#[from] InitError),

    #[error("build runtime: {0}")]
    Runtime(#[source] io::Error),

    #[error("bitcoin client: {0}")]
    BitcoinClient(String),

    #[error("signer key: {0}")]
    SignerKey(String),

    #[error("host chain url: {0}")]
    HostChainUrl(String),

    #[error("relay: {0}")]
    Relay(#[from] RelayError),

    #[error("tasks: {0}")]
    Tasks(String),
}
