//! Relay maintainer: follows the Bitcoin chain and keeps the host chain's
//! relay contract supplied with headers and aware of the heaviest one.
//!
//! A [`HeaderPuller`] walks the Bitcoin chain and queues every new header, a
//! [`Forwarder`] drains the queue in batches and submits them through the
//! [`HostChain`] port.

mod chain;
mod digest;
mod errors;
mod forwarder;
mod header;
mod puller;
mod remote;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

#[cfg(any(test, feature = "test_utils"))]
pub use chain::MockHostChain;
pub use chain::{BtcChain, HostChain};
pub use digest::Digest;
pub use errors::{RelayError, RelayResult};
pub use forwarder::{DIFFICULTY_EPOCH_DURATION, Forwarder, ForwarderConfig, starts_period};
pub use header::{HEADER_LEN, Header, pack_headers};
pub use puller::HeaderPuller;
pub use remote::RemoteBtcChain;
