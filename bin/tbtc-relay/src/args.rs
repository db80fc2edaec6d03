//! CLI argument parsing and environment variable handling.

use std::{env, path::PathBuf};

use argh::FromArgs;

/// Configs overridable by environment. Mostly for sensitive data.
#[derive(Debug, Clone, Default)]
pub(crate) struct EnvArgs {
    /// Service label to include in service name
    pub service_label: Option<String>,
    /// Hex-encoded signer key, takes precedence over the key file
    pub signer_key: Option<String>,
}

impl EnvArgs {
    pub(crate) fn from_env() -> Self {
        Self {
            service_label: env::var("TBTC_RELAY_SVC_LABEL").ok(),
            signer_key: env::var("TBTC_RELAY_SIGNER_KEY").ok(),
        }
    }
}

#[derive(Debug, FromArgs)]
#[argh(description = "tBTC relay maintainer")]
pub(crate) struct Args {
    #[argh(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, FromArgs)]
#[argh(subcommand)]
pub(crate) enum Command {
    Start(StartArgs),
}

#[derive(Debug, FromArgs)]
#[argh(
    subcommand,
    name = "start",
    description = "starts the relay maintainer in the foreground"
)]
pub(crate) struct StartArgs {
    #[argh(option, short = 'c', description = "path to configuration")]
    pub config: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_start() {
        let args = Args::from_args(&["tbtc-relay"], &["start", "--config", "relay.toml"]).unwrap();
        let Command::Start(start) = args.cmd;
        assert_eq!(start.config, PathBuf::from("relay.toml"));

        let args = Args::from_args(&["tbtc-relay"], &["start", "-c", "/etc/relay.toml"]).unwrap();
        let Command::Start(start) = args.cmd;
        assert_eq!(start.config, PathBuf::from("/etc/relay.toml"));
    }

    #[test]
    fn test_start_requires_config() {
        assert!(Args::from_args(&["tbtc-relay"], &["start"]).is_err());
        assert!(Args::from_args(&["tbtc-relay"], &[]).is_err());
    }
}
