//! Serde helper modules for parameter types.
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

/// Serialize/deserialize [`Duration`] as whole seconds ([`u64`]).
pub mod serde_duration_secs {
    use super::*;

    pub fn serialize<S: Serializer>(v: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(v.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(d)?;
        Ok(Duration::from_secs(secs))
    }
}
