//! Fixtures shared by the tBTC test suites.

use bitcoin::{
    block::{Header, Version},
    hashes::Hash,
    BlockHash, CompactTarget, TxMerkleNode,
};

/// Regtest proof-of-work limit, every header built here uses it.
const REGTEST_BITS: u32 = 0x207f_ffff;

/// Timestamp of the first header of a fresh chain.
const BASE_TIME: u32 = 1_600_000_000;

/// Target spacing between blocks.
const BLOCK_SPACING_SECS: u32 = 600;

/// Consecutive block headers starting at a known height.
///
/// Headers carry random merkle roots, so two chains built from the same
/// parent never share a header. Proof of work is not checked.
#[derive(Clone, Debug)]
pub struct HeaderChain {
    start_height: u64,
    headers: Vec<Header>,
}

impl HeaderChain {
    pub fn start_height(&self) -> u64 {
        self.start_height
    }

    /// Height of the last header.
    ///
    /// # Panics
    ///
    /// If the chain is empty.
    pub fn tip_height(&self) -> u64 {
        assert!(!self.headers.is_empty(), "test: empty header chain");
        self.start_height + self.headers.len() as u64 - 1
    }

    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    pub fn header_at(&self, height: u64) -> Option<&Header> {
        let idx = height.checked_sub(self.start_height)?;
        self.headers.get(idx as usize)
    }

    /// Hash of the last header.
    ///
    /// # Panics
    ///
    /// If the chain is empty.
    pub fn tip_hash(&self) -> BlockHash {
        self.headers
            .last()
            .expect("test: empty header chain")
            .block_hash()
    }

    /// Builds `len` headers branching off this chain right after the header
    /// at `height`.
    ///
    /// # Panics
    ///
    /// If there's no header at `height`.
    pub fn fork_at(&self, height: u64, len: usize) -> HeaderChain {
        let parent = self
            .header_at(height)
            .expect("test: fork point outside chain");
        HeaderChainBuilder::from_parent(parent, height)
            .extend(len)
            .build()
    }
}

#[derive(Debug)]
pub struct HeaderChainBuilder {
    start_height: u64,
    prev_hash: BlockHash,
    time: u32,
    headers: Vec<Header>,
}

impl HeaderChainBuilder {
    /// Starts a chain whose first header sits at `start_height` on top of an
    /// all-zero parent hash.
    pub fn new(start_height: u64) -> Self {
        Self {
            start_height,
            prev_hash: BlockHash::all_zeros(),
            time: BASE_TIME,
            headers: Vec::new(),
        }
    }

    /// Starts a chain on top of `parent`, which sits at `parent_height`.
    pub fn from_parent(parent: &Header, parent_height: u64) -> Self {
        Self {
            start_height: parent_height + 1,
            prev_hash: parent.block_hash(),
            time: parent.time + BLOCK_SPACING_SECS,
            headers: Vec::new(),
        }
    }

    /// Appends `count` headers.
    pub fn extend(mut self, count: usize) -> Self {
        for _ in 0..count {
            let header = Header {
                version: Version::TWO,
                prev_blockhash: self.prev_hash,
                merkle_root: TxMerkleNode::from_byte_array(rand::random()),
                time: self.time,
                bits: CompactTarget::from_consensus(REGTEST_BITS),
                nonce: rand::random(),
            };
            self.prev_hash = header.block_hash();
            self.time += BLOCK_SPACING_SECS;
            self.headers.push(header);
        }
        self
    }

    pub fn build(self) -> HeaderChain {
        HeaderChain {
            start_height: self.start_height,
            headers: self.headers,
        }
    }
}
