//! In-memory stand-ins for the services the system calls out to.

use std::collections::HashSet;

use tbtc_primitives::{Address, U256};

use crate::{
    admission::KeepRequest,
    context::{AuthorizationOracle, KeepFactory},
    errors::KeepFactoryError,
};

/// Oracle backed by an explicit set of credentialed identities.
#[derive(Clone, Debug, Default)]
pub struct MockAuthorizationOracle {
    holders: HashSet<Address>,
}

impl MockAuthorizationOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&mut self, who: Address) {
        self.holders.insert(who);
    }

    pub fn revoke(&mut self, who: &Address) {
        self.holders.remove(who);
    }
}

impl AuthorizationOracle for MockAuthorizationOracle {
    fn has_credential(&self, caller: &Address) -> bool {
        self.holders.contains(caller)
    }
}

/// Factory that records every request and keeps a running balance of the
/// value it was paid.
#[derive(Clone, Debug)]
pub struct MockKeepFactory {
    fee_estimate: U256,
    keep: Address,
    balance: U256,
    keep_owner: Option<Address>,
    opened: Vec<KeepRequest>,
    rejecting: bool,
}

impl MockKeepFactory {
    /// Creates a factory asking `fee_estimate` per keep and handing out
    /// `keep` as the new keep's address.
    pub fn new(fee_estimate: U256, keep: Address) -> Self {
        Self {
            fee_estimate,
            keep,
            balance: U256::ZERO,
            keep_owner: None,
            opened: Vec::new(),
            rejecting: false,
        }
    }

    /// Makes every following `open_keep` fail.
    pub fn set_rejecting(&mut self, rejecting: bool) {
        self.rejecting = rejecting;
    }

    pub fn balance(&self) -> U256 {
        self.balance
    }

    /// Owner of the most recently opened keep.
    pub fn keep_owner(&self) -> Option<Address> {
        self.keep_owner
    }

    pub fn opened(&self) -> &[KeepRequest] {
        &self.opened
    }
}

impl KeepFactory for MockKeepFactory {
    fn open_keep_fee_estimate(&self) -> U256 {
        self.fee_estimate
    }

    fn open_keep(&mut self, request: &KeepRequest) -> Result<Address, KeepFactoryError> {
        if self.rejecting {
            return Err(KeepFactoryError::Rejected("factory offline".to_owned()));
        }
        if request.payment() < self.fee_estimate {
            return Err(KeepFactoryError::InsufficientFee {
                required: self.fee_estimate,
                paid: request.payment(),
            });
        }

        self.balance += request.payment();
        self.keep_owner = Some(request.requester());
        self.opened.push(request.clone());
        Ok(self.keep)
    }
}
