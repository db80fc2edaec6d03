//! Primitive types shared across the tBTC system core and the header relay.

pub mod constants;
pub mod lot_size;

pub use alloy_primitives::{Address, U256};
pub use lot_size::{LotSizeSet, LotSizeSetError};

/// Seconds since the UNIX epoch, as reported by the executing environment.
pub type Timestamp = u64;
