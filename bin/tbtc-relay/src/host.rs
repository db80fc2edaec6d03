//! [`HostChain`] backed by the relay contract on an EVM chain.

use std::{fmt, fs, path::Path};

use alloy::{
    network::{EthereumWallet, ReceiptResponse},
    primitives::U256,
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionReceipt,
    signers::local::PrivateKeySigner,
    sol,
    transports::http::reqwest::Url,
};
use async_trait::async_trait;
use tbtc_config::HostChainConfig;
use tbtc_relay::{Digest, HostChain, RelayError, RelayResult};
use tracing::*;

use crate::{
    args::EnvArgs,
    errors::{AppError, Result},
};

sol! {
    #[sol(rpc)]
    interface IRelay {
        function addHeaders(bytes anchor, bytes headers) external returns (bool);

        function addHeadersWithRetarget(
            bytes oldPeriodStartHeader,
            bytes oldPeriodEndHeader,
            bytes headers
        ) external returns (bool);

        function markNewHeaviest(
            bytes32 ancestor,
            bytes currentBest,
            bytes newBest,
            uint256 limit
        ) external returns (bool);

        function getBestKnownDigest() external view returns (bytes32);
    }
}

pub(crate) struct EvmHostChain {
    relay: IRelay::IRelayInstance<DynProvider>,
}

impl fmt::Debug for EvmHostChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvmHostChain")
            .field("relay", self.relay.address())
            .finish()
    }
}

impl EvmHostChain {
    pub(crate) fn connect(config: &HostChainConfig, signer: PrivateKeySigner) -> Result<Self> {
        let url: Url = config
            .rpc_url
            .parse()
            .map_err(|e| AppError::HostChainUrl(format!("{}: {e}", config.rpc_url)))?;

        info!(
            url = %config.rpc_url,
            relay = %config.relay_address,
            submitter = %signer.address(),
            "connecting host chain"
        );
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url)
            .erased();

        Ok(Self {
            relay: IRelay::new(config.relay_address, provider),
        })
    }
}

/// Reads the submitter key, preferring the one passed through the
/// environment over the configured key file.
pub(crate) fn load_signer(
    config: &HostChainConfig,
    env_args: &EnvArgs,
) -> Result<PrivateKeySigner> {
    match &env_args.signer_key {
        Some(key) => parse_signer(key),
        None => read_signer(&config.signer_key),
    }
}

fn read_signer(path: &Path) -> Result<PrivateKeySigner> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::SignerKey(format!("read {}: {e}", path.display())))?;
    parse_signer(&raw)
}

fn parse_signer(key: &str) -> Result<PrivateKeySigner> {
    key.trim()
        .parse()
        .map_err(|e| AppError::SignerKey(format!("{e}")))
}

fn host_err(err: impl fmt::Display) -> RelayError {
    RelayError::HostChain(err.to_string())
}

fn check_receipt(call: &str, receipt: &TransactionReceipt) -> RelayResult<()> {
    if !receipt.status() {
        return Err(RelayError::HostChain(format!(
            "{call} reverted in {}",
            receipt.transaction_hash()
        )));
    }
    debug!(%call, tx = %receipt.transaction_hash(), "host chain call confirmed");
    Ok(())
}

#[async_trait]
impl HostChain for EvmHostChain {
    async fn add_headers(&self, anchor: Vec<u8>, headers: Vec<u8>) -> RelayResult<()> {
        let receipt = self
            .relay
            .addHeaders(anchor.into(), headers.into())
            .send()
            .await
            .map_err(host_err)?
            .get_receipt()
            .await
            .map_err(host_err)?;
        check_receipt("addHeaders", &receipt)
    }

    async fn add_headers_with_retarget(
        &self,
        old_period_start: Vec<u8>,
        old_period_end: Vec<u8>,
        headers: Vec<u8>,
    ) -> RelayResult<()> {
        let receipt = self
            .relay
            .addHeadersWithRetarget(
                old_period_start.into(),
                old_period_end.into(),
                headers.into(),
            )
            .send()
            .await
            .map_err(host_err)?
            .get_receipt()
            .await
            .map_err(host_err)?;
        check_receipt("addHeadersWithRetarget", &receipt)
    }

    async fn best_known_digest(&self) -> RelayResult<Digest> {
        let digest = self
            .relay
            .getBestKnownDigest()
            .call()
            .await
            .map_err(host_err)?;
        Ok(Digest::from_le_bytes(digest.0))
    }

    async fn mark_new_heaviest(
        &self,
        ancestor: Digest,
        current_best: Vec<u8>,
        new_best: Vec<u8>,
        limit: u64,
    ) -> RelayResult<()> {
        let receipt = self
            .relay
            .markNewHeaviest(
                ancestor.to_le_bytes().into(),
                current_best.into(),
                new_best.into(),
                U256::from(limit),
            )
            .send()
            .await
            .map_err(host_err)?
            .get_receipt()
            .await
            .map_err(host_err)?;
        check_receipt("markNewHeaviest", &receipt)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    // Well-known development key, never holds funds.
    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_parse_signer() {
        let signer = parse_signer(&format!("0x{DEV_KEY}\n")).unwrap();
        assert_eq!(
            signer.address().to_string(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
        assert!(matches!(
            parse_signer("not a key"),
            Err(AppError::SignerKey(_))
        ));
    }

    #[test]
    fn test_env_key_takes_precedence() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"0000").unwrap();

        let config = HostChainConfig {
            rpc_url: "http://localhost:8545".to_owned(),
            relay_address: Default::default(),
            signer_key: file.path().to_path_buf(),
        };

        assert!(load_signer(&config, &EnvArgs::default()).is_err());

        let env_args = EnvArgs {
            signer_key: Some(DEV_KEY.to_owned()),
            ..Default::default()
        };
        assert!(load_signer(&config, &env_args).is_ok());
    }

    #[test]
    fn test_connect_rejects_bad_url() {
        let config = HostChainConfig {
            rpc_url: "not a url".to_owned(),
            relay_address: Default::default(),
            signer_key: "/dev/null".into(),
        };
        let signer = parse_signer(DEV_KEY).unwrap();
        assert!(matches!(
            EvmHostChain::connect(&config, signer),
            Err(AppError::HostChainUrl(_))
        ));
    }
}
