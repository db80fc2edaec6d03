//! In-memory Bitcoin chain for exercising the relay without a node.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Mutex,
};

use async_trait::async_trait;
use bitcoin::block::Header as BlockHeader;

use crate::{
    chain::BtcChain,
    digest::Digest,
    errors::{RelayError, RelayResult},
    header::Header,
};

#[derive(Debug, Default)]
struct MemChainState {
    by_digest: HashMap<Digest, Header>,
    main: BTreeMap<u64, Digest>,
}

impl MemChainState {
    fn insert(&mut self, start_height: u64, headers: &[BlockHeader], main: bool) {
        for (header, height) in headers.iter().zip(start_height..) {
            let header = Header::from_block_header(header, height);
            if main {
                self.main.insert(height, header.hash);
            }
            self.by_digest.insert(header.hash, header);
        }
    }
}

/// [`BtcChain`] over headers held in memory. Side chains are reachable by
/// digest only.
#[derive(Debug, Default)]
pub struct MemBtcChain {
    state: Mutex<MemChainState>,
}

impl MemBtcChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_main_chain(start_height: u64, headers: &[BlockHeader]) -> Self {
        let chain = Self::new();
        chain.extend_main_chain(start_height, headers);
        chain
    }

    /// Adds headers to the main chain, replacing any at the same heights.
    pub fn extend_main_chain(&self, start_height: u64, headers: &[BlockHeader]) {
        self.state
            .lock()
            .expect("test: mem chain lock")
            .insert(start_height, headers, true);
    }

    pub fn add_side_chain(&self, start_height: u64, headers: &[BlockHeader]) {
        self.state
            .lock()
            .expect("test: mem chain lock")
            .insert(start_height, headers, false);
    }

    /// Main-chain header at `height`.
    pub fn header_at(&self, height: u64) -> Option<Header> {
        let state = self.state.lock().expect("test: mem chain lock");
        let digest = state.main.get(&height)?;
        state.by_digest.get(digest).cloned()
    }
}

#[async_trait]
impl BtcChain for MemBtcChain {
    async fn header_by_height(&self, height: u64) -> RelayResult<Header> {
        self.header_at(height)
            .ok_or(RelayError::UnknownHeight(height))
    }

    async fn header_by_digest(&self, digest: Digest) -> RelayResult<Header> {
        self.state
            .lock()
            .expect("test: mem chain lock")
            .by_digest
            .get(&digest)
            .cloned()
            .ok_or(RelayError::UnknownDigest(digest))
    }

    async fn tip_height(&self) -> RelayResult<u64> {
        self.state
            .lock()
            .expect("test: mem chain lock")
            .main
            .last_key_value()
            .map(|(height, _)| *height)
            .ok_or_else(|| RelayError::BtcRpc("empty chain".to_owned()))
    }
}
