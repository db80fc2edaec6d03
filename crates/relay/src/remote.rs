//! [`BtcChain`] over a bitcoind RPC connection.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use bitcoind_async_client::traits::Reader;
use tokio::time::timeout;
use tracing::*;

use crate::{
    chain::BtcChain,
    digest::Digest,
    errors::{RelayError, RelayResult},
    header::Header,
};

/// How long the node gets to answer the first request.
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug)]
pub struct RemoteBtcChain<R> {
    client: Arc<R>,
}

impl<R: Reader + Send + Sync> RemoteBtcChain<R> {
    pub fn new(client: Arc<R>) -> Self {
        Self { client }
    }

    /// Wraps `client` after checking the node answers.
    pub async fn connect(client: Arc<R>) -> RelayResult<Self> {
        Self::connect_within(client, CONNECTION_TIMEOUT).await
    }

    async fn connect_within(client: Arc<R>, limit: Duration) -> RelayResult<Self> {
        info!("connecting remote Bitcoin chain");
        let chain = Self::new(client);

        let tip = timeout(limit, chain.tip_height())
            .await
            .map_err(|_| RelayError::ConnectionTimeout(limit))??;
        info!(%tip, "connected remote Bitcoin chain");
        Ok(chain)
    }
}

#[async_trait]
impl<R: Reader + Send + Sync> BtcChain for RemoteBtcChain<R> {
    async fn header_by_height(&self, height: u64) -> RelayResult<Header> {
        let hash = self
            .client
            .get_block_hash(height)
            .await
            .map_err(|e| RelayError::BtcRpc(format!("block hash at {height}: {e}")))?;
        let header = self
            .client
            .get_block_header(&hash)
            .await
            .map_err(|e| RelayError::BtcRpc(format!("block header {hash}: {e}")))?;

        trace!(%height, %hash, "fetched header");
        Ok(Header::from_block_header(&header, height))
    }

    async fn header_by_digest(&self, digest: Digest) -> RelayResult<Header> {
        let hash = digest.to_block_hash();
        let header = self
            .client
            .get_block_header(&hash)
            .await
            .map_err(|e| RelayError::BtcRpc(format!("block header {hash}: {e}")))?;
        let height = self
            .client
            .get_block_height(&hash)
            .await
            .map_err(|e| RelayError::BtcRpc(format!("block height {hash}: {e}")))?;

        Ok(Header::from_block_header(&header, height))
    }

    async fn tip_height(&self) -> RelayResult<u64> {
        let info = self
            .client
            .get_blockchain_info()
            .await
            .map_err(|e| RelayError::BtcRpc(format!("blockchain info: {e}")))?;
        Ok(info.blocks.into())
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use bitcoind_async_client::{Auth, Client};
    use tokio::net::TcpListener;

    use super::*;

    fn client_for(addr: SocketAddr) -> Arc<Client> {
        let client = Client::new(
            format!("http://{addr}"),
            Auth::UserPass("user".to_owned(), "pass".to_owned()),
            Some(1),
            Some(10),
            None,
        )
        .unwrap();
        Arc::new(client)
    }

    /// Address nothing listens on.
    async fn closed_addr() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    }

    #[tokio::test]
    async fn test_rpc_failures_map_to_btc_rpc() {
        let chain = RemoteBtcChain::new(client_for(closed_addr().await));

        let digest = Digest::from_le_bytes([7; 32]);
        match chain.header_by_digest(digest).await {
            Err(RelayError::BtcRpc(msg)) => assert!(msg.starts_with("block header")),
            other => panic!("unexpected result: {other:?}"),
        }

        match chain.header_by_height(42).await {
            Err(RelayError::BtcRpc(msg)) => assert!(msg.starts_with("block hash at 42")),
            other => panic!("unexpected result: {other:?}"),
        }

        match chain.tip_height().await {
            Err(RelayError::BtcRpc(msg)) => assert!(msg.starts_with("blockchain info")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_connect_to_unreachable_node_fails() {
        let res = RemoteBtcChain::connect(client_for(closed_addr().await)).await;
        assert!(matches!(res, Err(RelayError::BtcRpc(_))));
    }

    #[tokio::test]
    async fn test_connect_times_out_on_silent_node() {
        // Connections land in the backlog and never get an answer.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let client = client_for(listener.local_addr().unwrap());

        let limit = Duration::from_millis(200);
        let res = RemoteBtcChain::connect_within(client, limit).await;
        assert!(matches!(res, Err(RelayError::ConnectionTimeout(d)) if d == limit));
        drop(listener);
    }
}
