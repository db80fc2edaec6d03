//! The set of deposit denominations the system accepts.

use std::ops::Deref;

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};
use thiserror::Error;

use crate::constants::{DEFAULT_LOT_SIZES, ONE_BTC_LOT_SIZE};

/// Returned when a candidate lot size set is empty or lacks the 1 BTC lot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
#[error("lot size array must always contain 1BTC")]
pub struct LotSizeSetError;

/// Ordered lot sizes, in satoshis.
///
/// Always non-empty and always contains [`ONE_BTC_LOT_SIZE`]. The only way to
/// get one is through [`LotSizeSet::try_from_vec`] (or deserialization, which
/// goes through it), so holders never have to recheck the invariant.
///
/// Lot sizes serialize as decimal strings so consumers never round them
/// through floating point. Both strings and plain integers are accepted when
/// deserializing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLotSizes", into = "RawLotSizes")]
pub struct LotSizeSet(Vec<u64>);

impl LotSizeSet {
    /// Validates and wraps a sequence of lot sizes, preserving its order.
    pub fn try_from_vec(sizes: Vec<u64>) -> Result<Self, LotSizeSetError> {
        if !sizes.contains(&ONE_BTC_LOT_SIZE) {
            return Err(LotSizeSetError);
        }
        Ok(Self(sizes))
    }

    /// Checks if `size` is one of the offered lot sizes.
    pub fn contains_size(&self, size: u64) -> bool {
        self.0.contains(&size)
    }

    pub fn into_vec(self) -> Vec<u64> {
        self.0
    }
}

impl Default for LotSizeSet {
    fn default() -> Self {
        Self(DEFAULT_LOT_SIZES.to_vec())
    }
}

impl Deref for LotSizeSet {
    type Target = [u64];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<Vec<u64>> for LotSizeSet {
    type Error = LotSizeSetError;

    fn try_from(sizes: Vec<u64>) -> Result<Self, Self::Error> {
        Self::try_from_vec(sizes)
    }
}

/// Wire form of [`LotSizeSet`], before validation.
#[serde_as]
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
struct RawLotSizes(#[serde_as(as = "Vec<PickFirst<(DisplayFromStr, _)>>")] Vec<u64>);

impl TryFrom<RawLotSizes> for LotSizeSet {
    type Error = LotSizeSetError;

    fn try_from(raw: RawLotSizes) -> Result<Self, Self::Error> {
        Self::try_from_vec(raw.0)
    }
}

impl From<LotSizeSet> for RawLotSizes {
    fn from(set: LotSizeSet) -> Self {
        Self(set.0)
    }
}
