//! Core of a tBTC deployment: admission of new keep requests, the signer fee
//! and lot size policies, and the one-shot emergency pause of new deposits.
//!
//! The system holds no chain state of its own. Callers pass a [`CallContext`]
//! carrying the caller identity, the value paid and the current time, and
//! supply the external services through the [`AuthorizationOracle`],
//! [`KeepFactory`] and [`EventSink`] traits.

mod admission;
mod context;
mod errors;
mod events;
mod fee;
mod lot_sizes;
mod pause;
mod system;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use admission::KeepRequest;
pub use context::{AuthorizationOracle, CallContext, KeepFactory};
pub use errors::{AuthFailure, ErrorKind, KeepFactoryError, SystemError, SystemResult};
pub use events::{EventSink, SystemEvent};
pub use fee::FeePolicy;
pub use lot_sizes::LotSizePolicy;
pub use pause::PauseState;
pub use system::TbtcSystem;
