use std::time::Duration;

use thiserror::Error;

use crate::digest::Digest;

pub type RelayResult<T> = Result<T, RelayError>;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("bitcoin rpc: {0}")]
    BtcRpc(String),

    #[error("bitcoin node did not answer within {0:?}")]
    ConnectionTimeout(Duration),

    #[error("no header at height {0}")]
    UnknownHeight(u64),

    #[error("no header with digest {0}")]
    UnknownDigest(Digest),

    #[error("no common ancestor of {new} and {current} within {depth} blocks")]
    NoCommonAncestor {
        new: Digest,
        current: Digest,
        depth: u64,
    },

    #[error("no main chain header below stale {stale} within {depth} blocks")]
    ReorgTooDeep { stale: Digest, depth: u64 },

    #[error("retarget at height {0} has no previous difficulty period")]
    NoPreviousPeriod(u64),

    #[error("host chain: {0}")]
    HostChain(String),
}
