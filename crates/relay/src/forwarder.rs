//! Batches headers off the queue and pushes them to the host chain.

use std::{cmp::Ordering, sync::Arc, time::Duration};

use tokio::{
    sync::mpsc,
    time::{sleep, timeout},
};
use tracing::*;

use crate::{
    chain::{BtcChain, HostChain},
    errors::{RelayError, RelayResult},
    header::{Header, pack_headers},
};

/// Number of blocks in a Bitcoin difficulty period.
pub const DIFFICULTY_EPOCH_DURATION: u64 = 2016;

/// Furthest the common ancestor search walks back before giving up.
pub(crate) const MAX_ANCESTOR_SEARCH_DEPTH: u64 = DIFFICULTY_EPOCH_DURATION;

/// Checks if a block at `height` starts a new difficulty period.
pub fn starts_period(height: u64) -> bool {
    height % DIFFICULTY_EPOCH_DURATION == 0
}

#[derive(Copy, Clone, Debug)]
pub struct ForwarderConfig {
    /// Max headers per submission. The best header is updated every time
    /// this many headers have been submitted.
    pub headers_batch_size: usize,

    /// How long to wait for the next header before submitting a partial
    /// batch.
    pub header_timeout: Duration,

    /// Delay before retrying a batch the host chain failed to accept.
    pub retry_interval: Duration,
}

/// A batch pulled off the queue, with how much of it the host chain already
/// accepted.
#[derive(Debug)]
struct PendingBatch {
    headers: Vec<Header>,
    submitted: usize,
    counted: bool,
}

impl PendingBatch {
    fn new(headers: Vec<Header>) -> Self {
        Self {
            headers,
            submitted: 0,
            counted: false,
        }
    }

    /// Next run of headers that doesn't cross a difficulty period boundary.
    fn next_segment(&self) -> Option<&[Header]> {
        self.headers[self.submitted..]
            .chunk_by(|_, next| !starts_period(next.height))
            .next()
    }
}

#[derive(Debug)]
pub struct Forwarder<B, H> {
    btc: Arc<B>,
    host: H,
    config: ForwarderConfig,
    processed_headers: usize,
}

impl<B: BtcChain, H: HostChain> Forwarder<B, H> {
    pub fn new(btc: Arc<B>, host: H, config: ForwarderConfig) -> Self {
        Self {
            btc,
            host,
            config,
            processed_headers: 0,
        }
    }

    /// Forwards headers until the queue is closed and drained.
    ///
    /// A batch the host chain fails to accept is retried after
    /// `retry_interval`, picking up from the first segment not yet accepted.
    pub async fn run(mut self, mut queue: mpsc::Receiver<Header>) -> RelayResult<()> {
        info!(
            batch_size = %self.config.headers_batch_size,
            timeout = ?self.config.header_timeout,
            "started header forwarder"
        );

        loop {
            let headers = self.pull_headers(&mut queue).await;
            if headers.is_empty() {
                info!("header queue closed, stopping forwarder");
                return Ok(());
            }

            let mut batch = PendingBatch::new(headers);
            while let Err(err) = self.push_batch(&mut batch).await {
                warn!(
                    %err,
                    submitted = %batch.submitted,
                    total = %batch.headers.len(),
                    retry_in = ?self.config.retry_interval,
                    "failed to push headers to host chain"
                );
                sleep(self.config.retry_interval).await;
            }
        }
    }

    /// Waits for a full batch of headers, or for the timeout to pass with at
    /// least one header pulled. The timeout restarts with every header.
    ///
    /// Returns an empty batch only once the queue is closed.
    pub async fn pull_headers(&self, queue: &mut mpsc::Receiver<Header>) -> Vec<Header> {
        let mut headers = Vec::with_capacity(self.config.headers_batch_size);

        while headers.len() < self.config.headers_batch_size {
            trace!("waiting for new header on queue");
            match timeout(self.config.header_timeout, queue.recv()).await {
                Ok(Some(header)) => {
                    debug!(height = %header.height, "got header from queue");
                    headers.push(header);
                }
                Ok(None) => break,
                Err(_) if !headers.is_empty() => {
                    debug!(
                        pulled = %headers.len(),
                        "no new header within timeout, returning headers pulled so far"
                    );
                    break;
                }
                Err(_) => trace!("no new header within timeout, none pulled yet"),
            }
        }

        headers
    }

    /// Submits a batch of consecutive headers, splitting it where a new
    /// difficulty period starts.
    pub async fn push_headers(&mut self, headers: &[Header]) -> RelayResult<()> {
        self.push_batch(&mut PendingBatch::new(headers.to_vec())).await
    }

    async fn push_batch(&mut self, batch: &mut PendingBatch) -> RelayResult<()> {
        while let Some(segment) = batch.next_segment() {
            let len = segment.len();
            if starts_period(segment[0].height) {
                info!(
                    height = %segment[0].height,
                    count = %len,
                    "adding headers with difficulty retarget"
                );
                self.add_headers_with_retarget(segment).await?;
            } else {
                info!(height = %segment[0].height, count = %len, "adding headers");
                self.add_headers(segment).await?;
            }
            batch.submitted += len;
        }

        let Some(new_best) = batch.headers.last() else {
            return Ok(());
        };

        if !batch.counted {
            self.processed_headers += batch.headers.len();
            batch.counted = true;
        }
        if self.processed_headers >= self.config.headers_batch_size {
            self.update_best_header(new_best).await?;
            self.processed_headers = 0;
        }

        Ok(())
    }

    async fn add_headers(&self, headers: &[Header]) -> RelayResult<()> {
        let anchor = self.btc.header_by_digest(headers[0].prev_hash).await?;
        self.host
            .add_headers(anchor.raw, pack_headers(headers))
            .await
    }

    async fn add_headers_with_retarget(&self, headers: &[Header]) -> RelayResult<()> {
        let first = &headers[0];
        if first.height < DIFFICULTY_EPOCH_DURATION {
            return Err(RelayError::NoPreviousPeriod(first.height));
        }

        let old_period_start = self
            .btc
            .header_by_height(first.height - DIFFICULTY_EPOCH_DURATION)
            .await?;
        let old_period_end = self.btc.header_by_digest(first.prev_hash).await?;
        self.host
            .add_headers_with_retarget(
                old_period_start.raw,
                old_period_end.raw,
                pack_headers(headers),
            )
            .await
    }

    /// Marks `new_best` as the heaviest header on the host chain, unless it
    /// already is or is an ancestor of the current best.
    pub async fn update_best_header(&self, new_best: &Header) -> RelayResult<()> {
        let current_digest = self.host.best_known_digest().await?;
        if current_digest == new_best.hash {
            debug!(hash = %new_best.hash, "best header already current");
            return Ok(());
        }

        let current_best = self.btc.header_by_digest(current_digest).await?;
        let ancestor = self
            .find_last_common_ancestor(new_best, &current_best)
            .await?;
        if ancestor.hash == new_best.hash {
            debug!(
                new = %new_best.hash,
                current = %current_best.hash,
                "new header is behind the current best"
            );
            return Ok(());
        }

        let limit = new_best.height - ancestor.height + 1;
        info!(
            new = %new_best.height,
            current = %current_best.height,
            ancestor = %ancestor.height,
            %limit,
            "marking new heaviest header"
        );
        self.host
            .mark_new_heaviest(ancestor.hash, current_best.raw, new_best.raw.clone(), limit)
            .await
    }

    /// Walks both headers back through their parents until they meet.
    pub async fn find_last_common_ancestor(
        &self,
        new_best: &Header,
        current_best: &Header,
    ) -> RelayResult<Header> {
        let mut new = new_best.clone();
        let mut current = current_best.clone();
        let mut steps = 0;

        while new.hash != current.hash {
            if steps == MAX_ANCESTOR_SEARCH_DEPTH {
                return Err(RelayError::NoCommonAncestor {
                    new: new_best.hash,
                    current: current_best.hash,
                    depth: MAX_ANCESTOR_SEARCH_DEPTH,
                });
            }

            match new.height.cmp(&current.height) {
                Ordering::Greater => new = self.btc.header_by_digest(new.prev_hash).await?,
                Ordering::Less => current = self.btc.header_by_digest(current.prev_hash).await?,
                Ordering::Equal => {
                    new = self.btc.header_by_digest(new.prev_hash).await?;
                    current = self.btc.header_by_digest(current.prev_hash).await?;
                }
            }
            steps += 1;
        }

        Ok(new)
    }
}
