use tbtc_primitives::LotSizeSet;

use crate::errors::{SystemError, SystemResult};

/// Holds the currently offered lot sizes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LotSizePolicy {
    sizes: LotSizeSet,
}

impl LotSizePolicy {
    pub fn new(sizes: LotSizeSet) -> Self {
        Self { sizes }
    }

    pub fn sizes(&self) -> &LotSizeSet {
        &self.sizes
    }

    /// Replaces the whole set, or leaves the current one in place if the
    /// candidate is invalid.
    pub fn replace(&mut self, candidate: Vec<u64>) -> SystemResult<&LotSizeSet> {
        self.sizes = LotSizeSet::try_from_vec(candidate)?;
        Ok(&self.sizes)
    }

    /// Resolves a lot size index to its size in satoshis.
    pub fn lookup(&self, index: usize) -> SystemResult<u64> {
        self.sizes
            .get(index)
            .copied()
            .ok_or_else(|| SystemError::UnknownLotSize {
                index,
                available: self.sizes.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use tbtc_primitives::{LotSizeSetError, constants::ONE_BTC_LOT_SIZE};

    use super::*;

    #[test]
    fn test_replace_is_atomic() {
        let mut policy = LotSizePolicy::new(LotSizeSet::default());
        let before = policy.sizes().clone();

        assert_eq!(
            policy.replace(vec![1_000_000, 2_000_000]),
            Err(SystemError::InvalidLotSizeSet(LotSizeSetError))
        );
        assert_eq!(policy.sizes(), &before);

        let updated = policy.replace(vec![ONE_BTC_LOT_SIZE]).unwrap();
        assert_eq!(&**updated, &[ONE_BTC_LOT_SIZE]);
    }

    #[test]
    fn test_lookup() {
        let policy = LotSizePolicy::new(
            LotSizeSet::try_from_vec(vec![1_000_000, ONE_BTC_LOT_SIZE]).unwrap(),
        );
        assert_eq!(policy.lookup(1), Ok(ONE_BTC_LOT_SIZE));
        assert_eq!(
            policy.lookup(2),
            Err(SystemError::UnknownLotSize {
                index: 2,
                available: 2
            })
        );
    }
}
