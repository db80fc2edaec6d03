//! tBTC relay maintainer binary.
//!
//! Follows the Bitcoin chain through bitcoind and keeps the relay contract on
//! the host chain supplied with headers.

mod args;
mod errors;
mod host;

use std::{sync::Arc, time::Duration};

use argh::from_env;
use bitcoind_async_client::{Auth, Client};
use strata_tasks::TaskManager;
use tbtc_common::logging::{self, FileLoggingConfig};
use tbtc_config::{BitcoindConfig, Config, LoggingConfig};
use tbtc_relay::{Forwarder, ForwarderConfig, HeaderPuller, RelayError, RemoteBtcChain};
use tokio::{runtime, sync::mpsc};
use tracing::info;

use crate::{
    args::{Args, Command, EnvArgs, StartArgs},
    errors::{AppError, Result},
    host::{EvmHostChain, load_signer},
};

const SHUTDOWN_TIMEOUT_MS: u64 = 5000;

/// Headers buffered between the puller and the forwarder.
const HEADER_QUEUE_CAPACITY: usize = 64;

const SERVICE_NAME: &str = "tbtc-relay";

fn main() -> Result<()> {
    let args: Args = from_env();
    if let Err(e) = main_inner(args) {
        eprintln!("FATAL ERROR: {e}");

        return Err(e);
    }

    Ok(())
}

fn main_inner(args: Args) -> Result<()> {
    match args.cmd {
        Command::Start(start) => start_relay(start),
    }
}

fn start_relay(args: StartArgs) -> Result<()> {
    let config = Config::load(&args.config)?;
    let env_args = EnvArgs::from_env();

    let runtime = runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("tbtc-relay-rt")
        .build()
        .map_err(AppError::Runtime)?;
    let handle = runtime.handle();

    init_logging(&config.logging, &env_args)?;

    let btc_client = create_bitcoin_rpc_client(&config.bitcoind)?;
    let signer = load_signer(&config.host_chain, &env_args)?;
    let host = EvmHostChain::connect(&config.host_chain, signer)?;

    let (btc, puller) = handle.block_on(async {
        let btc = Arc::new(RemoteBtcChain::connect(btc_client).await?);
        let puller =
            HeaderPuller::resume_from_host(btc.clone(), &host, config.relay.poll_interval())
                .await?;
        Ok::<_, RelayError>((btc, puller))
    })?;
    let forwarder = Forwarder::new(
        btc,
        host,
        ForwarderConfig {
            headers_batch_size: config.relay.headers_batch_size,
            header_timeout: config.relay.header_timeout(),
            retry_interval: config.relay.retry_interval(),
        },
    );

    let task_manager = TaskManager::new(handle.clone());
    let executor = task_manager.create_executor();

    let (header_tx, header_rx) = mpsc::channel(HEADER_QUEUE_CAPACITY);
    executor.spawn_critical_async("header-puller", async move {
        puller.run(header_tx).await.map_err(Into::into)
    });
    executor.spawn_critical_async("header-forwarder", async move {
        forwarder.run(header_rx).await.map_err(Into::into)
    });

    info!("relay started");

    task_manager.start_signal_listeners();
    task_manager
        .monitor(Some(Duration::from_millis(SHUTDOWN_TIMEOUT_MS)))
        .map_err(|e| AppError::Tasks(e.to_string()))?;

    Ok(())
}

fn create_bitcoin_rpc_client(config: &BitcoindConfig) -> Result<Arc<Client>> {
    let auth = Auth::UserPass(config.rpc_user.clone(), config.rpc_password.clone());
    let client = Client::new(
        config.rpc_url.clone(),
        auth,
        config.retry_count,
        config.retry_interval,
        None,
    )
    .map_err(|e| AppError::BitcoinClient(e.to_string()))?;
    Ok(Arc::new(client))
}

fn init_logging(config: &LoggingConfig, env_args: &EnvArgs) -> Result<()> {
    let label = env_args
        .service_label
        .as_deref()
        .or(config.service_label.as_deref());
    let service_name = logging::format_service_name(SERVICE_NAME, label);
    let json_format = config.json_format.unwrap_or(false);

    let mut lconfig = logging::LoggerConfig::new(service_name)
        .with_service_version(env!("CARGO_PKG_VERSION").to_owned())
        .with_json_logging(json_format);

    let file_logging_config = config.log_dir.as_ref().map(|dir| {
        let prefix = config
            .log_file_prefix
            .clone()
            .unwrap_or_else(|| SERVICE_NAME.to_owned());
        FileLoggingConfig::new(dir.clone(), prefix).with_json_format(json_format)
    });
    if let Some(file_config) = &file_logging_config {
        lconfig = lconfig.with_file_logging(file_config.clone());
    }

    logging::init(lconfig)?;

    if let Some(file_config) = &file_logging_config {
        info!(
            log_dir = %file_config.directory.display(),
            log_prefix = %file_config.file_name_prefix,
            "file logging enabled"
        );
    }
    Ok(())
}
