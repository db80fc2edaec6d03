use std::fmt;

use bitcoin::{block::Header as BlockHeader, consensus::serialize};

use crate::digest::Digest;

/// Length of a serialized Bitcoin block header.
pub const HEADER_LEN: usize = 80;

/// A Bitcoin block header together with its height and wire encoding.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Header {
    pub hash: Digest,
    pub height: u64,
    pub prev_hash: Digest,
    pub merkle_root: Digest,
    /// Consensus encoding of the header, always [`HEADER_LEN`] bytes.
    pub raw: Vec<u8>,
}

impl Header {
    pub fn from_block_header(header: &BlockHeader, height: u64) -> Self {
        Self {
            hash: header.block_hash().into(),
            height,
            prev_hash: header.prev_blockhash.into(),
            merkle_root: header.merkle_root.into(),
            raw: serialize(header),
        }
    }

    /// Checks if this header directly extends `parent`.
    pub fn extends(&self, parent: &Header) -> bool {
        self.prev_hash == parent.hash && self.height == parent.height + 1
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Hash: {}, Height: {}, PrevHash: {}, MerkleRoot: {}, Raw: {}",
            self.hash,
            self.height,
            self.prev_hash,
            self.merkle_root,
            hex::encode(&self.raw)
        )
    }
}

/// Concatenates the raw encodings of `headers`, in order.
pub fn pack_headers(headers: &[Header]) -> Vec<u8> {
    let mut packed = Vec::with_capacity(headers.len() * HEADER_LEN);
    for header in headers {
        packed.extend_from_slice(&header.raw);
    }
    packed
}
