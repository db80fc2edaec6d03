use std::fmt;

use bitcoin::{BlockHash, TxMerkleNode, hashes::Hash};

/// A 32-byte Bitcoin digest, held in little-endian (internal) byte order.
///
/// This is the order the relay contract stores digests in, and the reverse of
/// what block explorers display.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Digest([u8; 32]);

impl Digest {
    pub const fn from_le_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn from_be_bytes(mut bytes: [u8; 32]) -> Self {
        bytes.reverse();
        Self(bytes)
    }

    pub const fn to_le_bytes(&self) -> [u8; 32] {
        self.0
    }

    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut bytes = self.0;
        bytes.reverse();
        bytes
    }

    pub fn to_block_hash(&self) -> BlockHash {
        BlockHash::from_byte_array(self.0)
    }
}

impl From<BlockHash> for Digest {
    fn from(hash: BlockHash) -> Self {
        Self(hash.to_byte_array())
    }
}

impl From<TxMerkleNode> for Digest {
    fn from(node: TxMerkleNode) -> Self {
        Self(node.to_byte_array())
    }
}

/// Hex of the little-endian bytes.
impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting() -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = i as u8;
        }
        bytes
    }

    #[test]
    fn test_endianness() {
        let le = counting();
        let digest = Digest::from_le_bytes(le);
        assert_eq!(digest.to_le_bytes(), le);
        assert_eq!(digest.to_be_bytes()[0], 31);
        assert_eq!(digest.to_be_bytes()[31], 0);
        assert_eq!(Digest::from_be_bytes(digest.to_be_bytes()), digest);
    }

    #[test]
    fn test_display_is_little_endian_hex() {
        let digest = Digest::from_le_bytes(counting());
        let shown = digest.to_string();
        assert!(shown.starts_with("000102"));
        assert!(shown.ends_with("1e1f"));
    }

    #[test]
    fn test_block_hash_display_is_reversed() {
        let hash: BlockHash = "00000000000000000002a7c4c1e48d76c5a37902165a270156b7a8d72728a054"
            .parse()
            .unwrap();
        let digest = Digest::from(hash);

        assert_eq!(digest.to_block_hash(), hash);
        assert_eq!(hex::encode(digest.to_be_bytes()), hash.to_string());
        assert_ne!(digest.to_string(), hash.to_string());
    }
}
