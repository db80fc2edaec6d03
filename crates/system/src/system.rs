//! The system facade: owner-gated policies and the emergency pause.

use tbtc_params::SystemParams;
use tbtc_primitives::{Address, LotSizeSet, Timestamp, U256};
use tracing::*;

use crate::{
    context::{AuthorizationOracle, CallContext, KeepFactory},
    errors::{AuthFailure, SystemError, SystemResult},
    events::{EventSink, SystemEvent},
    fee::FeePolicy,
    lot_sizes::LotSizePolicy,
    pause::PauseState,
};

/// Deposit admission and policy state of a tBTC deployment.
///
/// Calls are expected to be serialized by the caller, every operation takes
/// `&mut self` and runs to completion. An operation that returns an error has
/// not changed any state, forwarded any value or emitted any event.
#[derive(Debug)]
pub struct TbtcSystem<O, F, E = Vec<SystemEvent>> {
    owner: Address,
    fees: FeePolicy,
    lot_sizes: LotSizePolicy,
    pause: PauseState,
    pause_term: u64,
    oracle: O,
    factory: F,
    events: E,
}

impl<O, F, E> TbtcSystem<O, F, E> {
    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn signer_fee_divisor(&self) -> u64 {
        self.fees.signer_fee_divisor()
    }

    /// Signer fee for a deposit of `lot_size` satoshis under the current
    /// divisor.
    pub fn signer_fee(&self, lot_size: u64) -> u64 {
        self.fees.signer_fee(lot_size)
    }

    pub fn lot_sizes(&self) -> &LotSizeSet {
        self.lot_sizes.sizes()
    }

    pub fn is_allowed_lot_size(&self, lot_size: u64) -> bool {
        self.lot_sizes.sizes().contains_size(lot_size)
    }

    pub fn allow_new_deposits(&self) -> bool {
        self.pause.allow_new_deposits()
    }

    pub fn has_been_paused(&self) -> bool {
        self.pause.has_been_paused()
    }

    pub fn pause_state(&self) -> PauseState {
        self.pause
    }

    /// Full length of an emergency pause, in seconds.
    pub fn pause_term(&self) -> u64 {
        self.pause_term
    }

    /// Seconds left before new deposits can be resumed, zero if they aren't
    /// paused.
    pub fn remaining_pause_term(&self, now: Timestamp) -> u64 {
        self.pause.remaining_term(now, self.pause_term)
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn factory_mut(&mut self) -> &mut F {
        &mut self.factory
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut E {
        &mut self.events
    }

    pub(crate) fn lot_size_policy(&self) -> &LotSizePolicy {
        &self.lot_sizes
    }

    fn ensure_owner(&self, ctx: &CallContext) -> SystemResult<()> {
        if ctx.caller() != self.owner {
            warn!(caller = %ctx.caller(), "owner-only call from non-owner");
            return Err(SystemError::Unauthorized(AuthFailure::NotOwner));
        }
        Ok(())
    }
}

impl<O, F, E> TbtcSystem<O, F, E>
where
    O: AuthorizationOracle,
    F: KeepFactory,
    E: EventSink,
{
    /// Creates a system from validated deployment params. New deposits start
    /// out allowed.
    pub fn new(params: SystemParams, oracle: O, factory: F, events: E) -> SystemResult<Self> {
        params.validate()?;
        let fees = FeePolicy::new(params.signer_fee_divisor)?;
        Ok(Self {
            owner: params.owner,
            fees,
            lot_sizes: LotSizePolicy::new(params.lot_sizes),
            pause: PauseState::default(),
            pause_term: params.pause_term.as_secs(),
            oracle,
            factory,
            events,
        })
    }

    /// Fee the keep factory currently expects with a keep request.
    pub fn open_keep_fee_estimate(&self) -> U256 {
        self.factory.open_keep_fee_estimate()
    }

    pub fn transfer_ownership(&mut self, ctx: &CallContext, new_owner: Address) -> SystemResult<()> {
        self.ensure_owner(ctx)?;
        if new_owner.is_zero() {
            return Err(SystemError::InvalidOwner);
        }

        let previous_owner = self.owner;
        self.owner = new_owner;
        info!(%previous_owner, %new_owner, "ownership transferred");
        self.events.emit(SystemEvent::OwnershipTransferred {
            previous_owner,
            new_owner,
        });
        Ok(())
    }

    pub fn set_signer_fee_divisor(&mut self, ctx: &CallContext, divisor: u64) -> SystemResult<()> {
        self.ensure_owner(ctx)?;
        self.fees.set_signer_fee_divisor(divisor)?;
        debug!(%divisor, "set signer fee divisor");
        self.events.emit(SystemEvent::SignerFeeDivisorUpdated {
            signer_fee_divisor: divisor,
        });
        Ok(())
    }

    /// Replaces the offered lot sizes. The new set must contain the 1 BTC lot.
    pub fn set_lot_sizes(&mut self, ctx: &CallContext, lot_sizes: Vec<u64>) -> SystemResult<()> {
        self.ensure_owner(ctx)?;
        let updated = self.lot_sizes.replace(lot_sizes)?.clone();
        debug!(lot_sizes = ?&*updated, "updated lot sizes");
        self.events.emit(SystemEvent::LotSizesUpdated { lot_sizes: updated });
        Ok(())
    }

    /// Blocks new deposits for the pause term. Usable once, ever.
    pub fn emergency_pause_new_deposits(&mut self, ctx: &CallContext) -> SystemResult<()> {
        self.ensure_owner(ctx)?;
        let now = ctx.timestamp();
        self.pause = self.pause.pause(now)?;
        warn!(paused_at = %now, term = %self.pause_term, "new deposits paused");
        self.events
            .emit(SystemEvent::NewDepositsPaused { paused_at: now });
        Ok(())
    }

    /// Lifts an emergency pause once its term has elapsed. Anyone may call.
    pub fn resume_new_deposits(&mut self, ctx: &CallContext) -> SystemResult<()> {
        let now = ctx.timestamp();
        let next = self.pause.resume(now, self.pause_term)?;
        if next == self.pause {
            return Ok(());
        }

        self.pause = next;
        info!(resumed_at = %now, caller = %ctx.caller(), "new deposits resumed");
        self.events
            .emit(SystemEvent::NewDepositsResumed { resumed_at: now });
        Ok(())
    }
}
