//! Admission of new keep requests.

use tbtc_primitives::{Address, U256};
use tracing::*;

use crate::{
    context::{AuthorizationOracle, CallContext, KeepFactory},
    errors::{AuthFailure, SystemError, SystemResult},
    events::{EventSink, SystemEvent},
    system::TbtcSystem,
};

/// A request to open a keep, as handed to the [`KeepFactory`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeepRequest {
    signer_count: u64,
    threshold: u64,
    lot_size_index: usize,
    lot_size: u64,
    payment: U256,
    requester: Address,
}

impl KeepRequest {
    pub fn new(
        signer_count: u64,
        threshold: u64,
        lot_size_index: usize,
        lot_size: u64,
        payment: U256,
        requester: Address,
    ) -> Self {
        Self {
            signer_count,
            threshold,
            lot_size_index,
            lot_size,
            payment,
            requester,
        }
    }

    pub fn signer_count(&self) -> u64 {
        self.signer_count
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    pub fn lot_size_index(&self) -> usize {
        self.lot_size_index
    }

    /// Lot size, in satoshis, the index resolved to when the request was made.
    pub fn lot_size(&self) -> u64 {
        self.lot_size
    }

    /// Value forwarded to the factory, exactly as paid by the requester.
    pub fn payment(&self) -> U256 {
        self.payment
    }

    /// The original caller, who becomes the owner of the keep.
    pub fn requester(&self) -> Address {
        self.requester
    }
}

impl<O, F, E> TbtcSystem<O, F, E>
where
    O: AuthorizationOracle,
    F: KeepFactory,
    E: EventSink,
{
    /// Opens a new keep for the caller, forwarding the value paid with the
    /// call to the keep factory, and returns the keep's address.
    ///
    /// The caller must hold a deposit ownership credential and new deposits
    /// must not be paused. Nothing is forwarded if either check fails.
    pub fn request_new_keep(
        &mut self,
        ctx: &CallContext,
        signer_count: u64,
        threshold: u64,
        lot_size_index: usize,
    ) -> SystemResult<Address> {
        let requester = ctx.caller();
        if !self.oracle().has_credential(&requester) {
            warn!(%requester, "keep request without deposit credential");
            return Err(SystemError::Unauthorized(AuthFailure::MissingCredential));
        }

        if !self.allow_new_deposits() {
            return Err(SystemError::DepositsPaused);
        }

        let lot_size = self.lot_size_policy().lookup(lot_size_index)?;
        let request = KeepRequest::new(
            signer_count,
            threshold,
            lot_size_index,
            lot_size,
            ctx.value(),
            requester,
        );

        // Value leaves the system here, nothing may change after this call
        // but the notification.
        let keep = self.factory_mut().open_keep(&request)?;
        debug!(%requester, %keep, %lot_size, payment = %request.payment(), "opened keep");

        self.events_mut().emit(SystemEvent::KeepOpened {
            keep,
            owner: requester,
        });
        Ok(keep)
    }
}
