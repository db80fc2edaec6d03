//! One-shot emergency pause of new deposits.
//!
//! The owner may pause new deposits once over the lifetime of the system.
//! The pause lifts itself: once the term has elapsed anyone can resume, and
//! the system can never be paused again.

use serde::{Deserialize, Serialize};
use tbtc_primitives::Timestamp;

use crate::errors::{SystemError, SystemResult};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum PauseState {
    /// Never paused. New deposits are allowed.
    #[default]
    Unpaused,

    /// Paused at `since`, new deposits are blocked.
    Paused { since: Timestamp },

    /// Paused once and resumed since. New deposits are allowed and the pause
    /// can't be used again.
    Resumed {
        paused_at: Timestamp,
        resumed_at: Timestamp,
    },
}

impl PauseState {
    pub fn allow_new_deposits(&self) -> bool {
        !matches!(self, PauseState::Paused { .. })
    }

    pub fn has_been_paused(&self) -> bool {
        !matches!(self, PauseState::Unpaused)
    }

    pub fn paused_at(&self) -> Option<Timestamp> {
        match self {
            PauseState::Unpaused => None,
            PauseState::Paused { since } => Some(*since),
            PauseState::Resumed { paused_at, .. } => Some(*paused_at),
        }
    }

    /// Seconds left before the pause can be lifted, zero when not paused.
    pub fn remaining_term(&self, now: Timestamp, term: u64) -> u64 {
        match self {
            PauseState::Paused { since } => since.saturating_add(term).saturating_sub(now),
            _ => 0,
        }
    }

    /// Transition taken by an emergency pause at `now`.
    pub fn pause(&self, now: Timestamp) -> SystemResult<PauseState> {
        if self.has_been_paused() {
            return Err(SystemError::AlreadyPaused);
        }
        Ok(PauseState::Paused { since: now })
    }

    /// Transition taken by a resume request at `now`.
    ///
    /// Resuming while not paused is accepted and changes nothing.
    pub fn resume(&self, now: Timestamp, term: u64) -> SystemResult<PauseState> {
        match *self {
            PauseState::Paused { since } => {
                if now.saturating_sub(since) < term {
                    return Err(SystemError::StillPaused);
                }
                Ok(PauseState::Resumed {
                    paused_at: since,
                    resumed_at: now,
                })
            }
            other => Ok(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const TERM: u64 = 864_000;

    #[test]
    fn test_initial_state() {
        let state = PauseState::default();
        assert!(state.allow_new_deposits());
        assert!(!state.has_been_paused());
        assert_eq!(state.paused_at(), None);
        assert_eq!(state.remaining_term(1_000, TERM), 0);
    }

    #[test]
    fn test_pause_blocks_deposits() {
        let state = PauseState::default().pause(1_000).unwrap();
        assert_eq!(state, PauseState::Paused { since: 1_000 });
        assert!(!state.allow_new_deposits());
        assert!(state.has_been_paused());
        assert_eq!(state.remaining_term(1_000, TERM), TERM);
    }

    #[test]
    fn test_resume_before_term() {
        let state = PauseState::Paused { since: 1_000 };
        assert_eq!(
            state.resume(1_000 + TERM - 10, TERM),
            Err(SystemError::StillPaused)
        );
    }

    #[test]
    fn test_resume_at_term() {
        let state = PauseState::Paused { since: 1_000 };
        let resumed = state.resume(1_000 + TERM, TERM).unwrap();
        assert_eq!(
            resumed,
            PauseState::Resumed {
                paused_at: 1_000,
                resumed_at: 1_000 + TERM
            }
        );
        assert!(resumed.allow_new_deposits());
        assert_eq!(resumed.remaining_term(1_000 + TERM, TERM), 0);
    }

    #[test]
    fn test_resume_when_not_paused_is_noop() {
        let state = PauseState::default();
        assert_eq!(state.resume(5, TERM), Ok(state));
    }

    #[test]
    fn test_second_pause_rejected() {
        let paused = PauseState::default().pause(0).unwrap();
        assert_eq!(paused.pause(1), Err(SystemError::AlreadyPaused));

        let resumed = paused.resume(TERM, TERM).unwrap();
        assert_eq!(resumed.pause(TERM * 100), Err(SystemError::AlreadyPaused));
    }

    #[test]
    fn test_clock_before_pause_is_still_paused() {
        let state = PauseState::Paused { since: 1_000 };
        assert_eq!(state.resume(10, TERM), Err(SystemError::StillPaused));
        assert_eq!(state.remaining_term(10, TERM), TERM + 990);
    }

    proptest! {
        #[test]
        fn proptest_remaining_term_decreases(
            since in 0u64..1_000_000_000,
            a in 0u64..2 * TERM,
            b in 0u64..2 * TERM,
        ) {
            let state = PauseState::Paused { since };
            let (early, late) = (since + a.min(b), since + a.max(b));
            prop_assert!(state.remaining_term(late, TERM) <= state.remaining_term(early, TERM));
            prop_assert_eq!(state.remaining_term(since + TERM + a, TERM), 0);
        }

        #[test]
        fn proptest_resume_iff_term_elapsed(since in 0u64..1_000_000_000, elapsed in 0u64..2 * TERM) {
            let state = PauseState::Paused { since };
            let res = state.resume(since + elapsed, TERM);
            prop_assert_eq!(res.is_ok(), elapsed >= TERM);
        }
    }
}
