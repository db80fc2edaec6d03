//! Per-call environment and the external services the system depends on.

use tbtc_primitives::{Address, Timestamp, U256};

use crate::{admission::KeepRequest, errors::KeepFactoryError};

/// Environment a single call executes in.
///
/// Every mutating operation takes one of these instead of reading the caller
/// or the clock from ambient state.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CallContext {
    caller: Address,
    value: U256,
    timestamp: Timestamp,
}

impl CallContext {
    pub fn new(caller: Address, timestamp: Timestamp) -> Self {
        Self {
            caller,
            value: U256::ZERO,
            timestamp,
        }
    }

    /// Attaches a payment to the call.
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn caller(&self) -> Address {
        self.caller
    }

    /// Value paid with the call. Only keep requests forward it; every other
    /// operation ignores it.
    pub fn value(&self) -> U256 {
        self.value
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

/// Answers whether an identity holds a deposit ownership credential.
pub trait AuthorizationOracle {
    fn has_credential(&self, caller: &Address) -> bool;
}

/// Opens custody keeps on behalf of depositors.
pub trait KeepFactory {
    /// Fee the factory currently expects for opening a keep.
    fn open_keep_fee_estimate(&self) -> U256;

    /// Opens a keep owned by `request.requester()`, taking the full
    /// `request.payment()`, and returns the address of the new keep.
    ///
    /// On error the factory must not have taken any value.
    fn open_keep(&mut self, request: &KeepRequest) -> Result<Address, KeepFactoryError>;
}
