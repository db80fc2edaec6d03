//! Feeds new Bitcoin headers into the forwarder's queue.

use std::{sync::Arc, time::Duration};

use tokio::{sync::mpsc, time::sleep};
use tracing::*;

use crate::{
    chain::{BtcChain, HostChain},
    errors::{RelayError, RelayResult},
    forwarder::MAX_ANCESTOR_SEARCH_DEPTH,
    header::Header,
};

#[derive(Debug)]
pub struct HeaderPuller<B> {
    btc: Arc<B>,
    poll_interval: Duration,
    next_height: u64,
    /// Last header queued, or the relay's best header right after resuming.
    /// Every header queued next must build on it.
    last_queued: Option<Header>,
}

impl<B: BtcChain> HeaderPuller<B> {
    pub fn new(btc: Arc<B>, poll_interval: Duration, next_height: u64) -> Self {
        Self {
            btc,
            poll_interval,
            next_height,
            last_queued: None,
        }
    }

    /// Creates a puller starting right above the host chain's best known
    /// header. If that header has since left the main chain the first poll
    /// rewinds to where the branches split.
    pub async fn resume_from_host<H: HostChain>(
        btc: Arc<B>,
        host: &H,
        poll_interval: Duration,
    ) -> RelayResult<Self> {
        let best_digest = host.best_known_digest().await?;
        let best = btc.header_by_digest(best_digest).await?;
        info!(best = %best.height, hash = %best.hash, "resuming from relay's best header");

        let mut puller = Self::new(btc, poll_interval, best.height + 1);
        puller.last_queued = Some(best);
        Ok(puller)
    }

    /// Height of the next header to be queued.
    pub fn next_height(&self) -> u64 {
        self.next_height
    }

    /// Queues every header from the next height up to the current tip.
    ///
    /// Returns `false` if the queue was closed.
    pub async fn poll_once(&mut self, queue: &mpsc::Sender<Header>) -> RelayResult<bool> {
        let tip = self.btc.tip_height().await?;
        if self.next_height <= tip {
            debug!(from = %self.next_height, %tip, "pulling new headers");
        }

        while self.next_height <= tip {
            let header = self.btc.header_by_height(self.next_height).await?;

            if let Some(last) = &self.last_queued {
                if header.prev_hash != last.hash {
                    let fork_point = self.find_fork_point(last, tip).await?;
                    warn!(
                        stale = %last.hash,
                        height = %last.height,
                        fork_point = %fork_point.height,
                        "bitcoin chain reorganized, rewinding"
                    );
                    self.next_height = fork_point.height + 1;
                    self.last_queued = Some(fork_point);
                    continue;
                }
            }

            if queue.send(header.clone()).await.is_err() {
                return Ok(false);
            }
            self.next_height += 1;
            self.last_queued = Some(header);
        }

        Ok(true)
    }

    /// Walks back from `stale` until reaching a header that is still on the
    /// main chain.
    async fn find_fork_point(&self, stale: &Header, tip: u64) -> RelayResult<Header> {
        let mut header = stale.clone();

        for _ in 0..MAX_ANCESTOR_SEARCH_DEPTH {
            if header.height <= tip {
                let main = self.btc.header_by_height(header.height).await?;
                if main.hash == header.hash {
                    return Ok(header);
                }
            }
            header = self.btc.header_by_digest(header.prev_hash).await?;
        }

        Err(RelayError::ReorgTooDeep {
            stale: stale.hash,
            depth: MAX_ANCESTOR_SEARCH_DEPTH,
        })
    }

    /// Polls the Bitcoin chain until the queue is closed. Failed polls are
    /// retried on the next interval.
    pub async fn run(mut self, queue: mpsc::Sender<Header>) -> RelayResult<()> {
        info!(next_height = %self.next_height, interval = ?self.poll_interval, "started header puller");

        loop {
            match self.poll_once(&queue).await {
                Ok(true) => {}
                Ok(false) => {
                    info!("header queue closed, stopping puller");
                    return Ok(());
                }
                Err(err) => warn!(%err, "failed to poll Bitcoin chain"),
            }
            sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use tbtc_test_utils::HeaderChainBuilder;

    use super::*;
    use crate::{
        chain::MockHostChain, digest::Digest, errors::RelayError, test_utils::MemBtcChain,
    };

    const INTERVAL: Duration = Duration::from_millis(10);

    #[tokio::test]
    async fn test_poll_once_pulls_up_to_tip() {
        let chain = HeaderChainBuilder::new(100).extend(10).build();
        let btc = Arc::new(MemBtcChain::with_main_chain(100, &chain.headers()[..5]));
        let mut puller = HeaderPuller::new(btc.clone(), INTERVAL, 102);

        let (tx, mut rx) = mpsc::channel(16);
        assert!(puller.poll_once(&tx).await.unwrap());
        assert_eq!(puller.next_height(), 105);

        let heights: Vec<_> = (0..3).map(|_| rx.try_recv().unwrap().height).collect();
        assert_eq!(heights, vec![102, 103, 104]);
        assert!(rx.try_recv().is_err());

        btc.extend_main_chain(105, &chain.headers()[5..]);
        assert!(puller.poll_once(&tx).await.unwrap());
        assert_eq!(puller.next_height(), 110);
        assert_eq!(rx.try_recv().unwrap().height, 105);
    }

    #[tokio::test]
    async fn test_poll_once_at_tip_is_quiet() {
        let chain = HeaderChainBuilder::new(100).extend(3).build();
        let btc = Arc::new(MemBtcChain::with_main_chain(100, chain.headers()));
        let mut puller = HeaderPuller::new(btc, INTERVAL, 103);

        let (tx, mut rx) = mpsc::channel(16);
        assert!(puller.poll_once(&tx).await.unwrap());
        assert!(rx.try_recv().is_err());
        assert_eq!(puller.next_height(), 103);
    }

    #[tokio::test]
    async fn test_resume_from_host() {
        let chain = HeaderChainBuilder::new(100).extend(5).build();
        let btc = Arc::new(MemBtcChain::with_main_chain(100, chain.headers()));
        let best = btc.header_at(102).unwrap().hash;

        let mut host = MockHostChain::new();
        host.expect_best_known_digest()
            .times(1)
            .returning(move || Ok(best));

        let puller = HeaderPuller::resume_from_host(btc, &host, INTERVAL)
            .await
            .unwrap();
        assert_eq!(puller.next_height(), 103);
    }

    #[tokio::test]
    async fn test_resume_from_unknown_digest() {
        let chain = HeaderChainBuilder::new(100).extend(2).build();
        let other = HeaderChainBuilder::new(100).extend(1).build();
        let btc = Arc::new(MemBtcChain::with_main_chain(100, chain.headers()));
        let unknown = Digest::from(other.tip_hash());

        let mut host = MockHostChain::new();
        host.expect_best_known_digest()
            .returning(move || Ok(unknown));

        assert!(matches!(
            HeaderPuller::resume_from_host(btc, &host, INTERVAL).await,
            Err(RelayError::UnknownDigest(_))
        ));
    }

    #[tokio::test]
    async fn test_run_stops_when_queue_closed() {
        let chain = HeaderChainBuilder::new(100).extend(5).build();
        let btc = Arc::new(MemBtcChain::with_main_chain(100, chain.headers()));
        let puller = HeaderPuller::new(btc, INTERVAL, 100);

        let (tx, mut rx) = mpsc::channel(1);
        let task = tokio::spawn(puller.run(tx));

        assert_eq!(rx.recv().await.unwrap().height, 100);
        assert_eq!(rx.recv().await.unwrap().height, 101);
        drop(rx);

        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_poll_once_follows_tip_reorg() {
        let chain = HeaderChainBuilder::new(100).extend(3).build();
        let btc = Arc::new(MemBtcChain::with_main_chain(100, chain.headers()));
        let mut puller = HeaderPuller::new(btc.clone(), INTERVAL, 100);

        let (tx, mut rx) = mpsc::channel(16);
        assert!(puller.poll_once(&tx).await.unwrap());
        let heights: Vec<_> = (0..3).map(|_| rx.try_recv().unwrap().height).collect();
        assert_eq!(heights, vec![100, 101, 102]);

        // 102 is replaced and the new branch grows to 103.
        let fork = chain.fork_at(101, 2);
        btc.extend_main_chain(102, fork.headers());

        assert!(puller.poll_once(&tx).await.unwrap());
        let replaced = rx.try_recv().unwrap();
        let next = rx.try_recv().unwrap();
        assert!(rx.try_recv().is_err());

        assert_eq!(replaced.height, 102);
        assert_eq!(replaced.hash, Digest::from(fork.headers()[0].block_hash()));
        assert_eq!(replaced.prev_hash, btc.header_at(101).unwrap().hash);
        assert_eq!(next.height, 103);
        assert_eq!(next.prev_hash, replaced.hash);
        assert_eq!(puller.next_height(), 104);
    }

    #[tokio::test]
    async fn test_poll_once_follows_deeper_reorg() {
        let chain = HeaderChainBuilder::new(100).extend(6).build();
        let btc = Arc::new(MemBtcChain::with_main_chain(100, chain.headers()));
        let mut puller = HeaderPuller::new(btc.clone(), INTERVAL, 100);

        let (tx, mut rx) = mpsc::channel(16);
        assert!(puller.poll_once(&tx).await.unwrap());
        for _ in 0..6 {
            rx.try_recv().unwrap();
        }

        let fork = chain.fork_at(102, 4);
        btc.extend_main_chain(103, fork.headers());

        assert!(puller.poll_once(&tx).await.unwrap());
        let requeued: Vec<_> = (0..4).map(|_| rx.try_recv().unwrap()).collect();
        assert!(rx.try_recv().is_err());

        let heights: Vec<_> = requeued.iter().map(|h| h.height).collect();
        assert_eq!(heights, vec![103, 104, 105, 106]);
        assert_eq!(requeued[0].prev_hash, btc.header_at(102).unwrap().hash);
        assert_eq!(requeued[3].hash, Digest::from(fork.tip_hash()));
    }

    #[tokio::test]
    async fn test_resume_from_stale_best() {
        let chain = HeaderChainBuilder::new(100).extend(3).build();
        let btc = Arc::new(MemBtcChain::with_main_chain(100, chain.headers()));
        let stale = btc.header_at(102).unwrap().hash;

        let fork = chain.fork_at(101, 2);
        btc.extend_main_chain(102, fork.headers());

        let mut host = MockHostChain::new();
        host.expect_best_known_digest()
            .times(1)
            .returning(move || Ok(stale));

        let mut puller = HeaderPuller::resume_from_host(btc.clone(), &host, INTERVAL)
            .await
            .unwrap();
        assert_eq!(puller.next_height(), 103);

        let (tx, mut rx) = mpsc::channel(16);
        assert!(puller.poll_once(&tx).await.unwrap());

        let first = rx.try_recv().unwrap();
        assert_eq!(first.height, 102);
        assert_eq!(first.prev_hash, btc.header_at(101).unwrap().hash);
        assert_eq!(rx.try_recv().unwrap().height, 103);
        assert!(rx.try_recv().is_err());
    }
}
