//! Ports to the two chains the relay sits between.

use async_trait::async_trait;

use crate::{digest::Digest, errors::RelayResult, header::Header};

/// Read access to the Bitcoin chain.
#[async_trait]
pub trait BtcChain: Send + Sync {
    /// Returns the main-chain header at `height`.
    async fn header_by_height(&self, height: u64) -> RelayResult<Header>;

    /// Returns the header with the given digest, main chain or not.
    async fn header_by_digest(&self, digest: Digest) -> RelayResult<Header>;

    /// Height of the current main-chain tip.
    async fn tip_height(&self) -> RelayResult<u64>;
}

/// The relay contract on the host chain.
///
/// Header arguments are raw 80-byte encodings, `headers` arguments are
/// several of them concatenated.
#[cfg_attr(any(test, feature = "test_utils"), mockall::automock)]
#[async_trait]
pub trait HostChain: Send + Sync {
    /// Adds `headers` on top of the already known `anchor`. None of the
    /// headers may start a new difficulty period.
    async fn add_headers(&self, anchor: Vec<u8>, headers: Vec<u8>) -> RelayResult<()>;

    /// Adds `headers`, the first of which starts a new difficulty period, on
    /// top of the period spanning `old_period_start..=old_period_end`.
    async fn add_headers_with_retarget(
        &self,
        old_period_start: Vec<u8>,
        old_period_end: Vec<u8>,
        headers: Vec<u8>,
    ) -> RelayResult<()>;

    /// Digest of the heaviest header the relay knows of.
    async fn best_known_digest(&self) -> RelayResult<Digest>;

    /// Marks `new_best` as the heaviest header. `ancestor` is the last common
    /// ancestor of it and `current_best`, and `limit` bounds how far the
    /// contract walks back from `new_best` looking for it.
    async fn mark_new_heaviest(
        &self,
        ancestor: Digest,
        current_best: Vec<u8>,
        new_best: Vec<u8>,
        limit: u64,
    ) -> RelayResult<()>;
}
