//! Notifications emitted by successful operations.

use serde::{Deserialize, Serialize};
use tbtc_primitives::{Address, LotSizeSet, Timestamp};

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum SystemEvent {
    /// The lot size set was replaced. Lot sizes serialize as decimal strings.
    LotSizesUpdated { lot_sizes: LotSizeSet },

    SignerFeeDivisorUpdated { signer_fee_divisor: u64 },

    NewDepositsPaused { paused_at: Timestamp },

    NewDepositsResumed { resumed_at: Timestamp },

    /// A keep was opened for `owner` through the factory.
    KeepOpened { keep: Address, owner: Address },

    OwnershipTransferred {
        previous_owner: Address,
        new_owner: Address,
    },
}

/// Receives events in the order operations complete.
pub trait EventSink {
    fn emit(&mut self, event: SystemEvent);
}

impl EventSink for Vec<SystemEvent> {
    fn emit(&mut self, event: SystemEvent) {
        self.push(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: SystemEvent) {
        (**self).emit(event);
    }
}
