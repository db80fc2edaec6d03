//! Deployment parameters for the tBTC system core.

use std::{fs, io, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use tbtc_primitives::{
    Address, LotSizeSet,
    constants::{DEFAULT_PAUSE_TERM_SECS, DEFAULT_SIGNER_FEE_DIVISOR},
};
use thiserror::Error;

pub mod serde_helpers;

/// Parameters the system is constructed with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemParams {
    /// Identity allowed to change policies and trigger the emergency pause.
    pub owner: Address,

    /// Divisor applied to a lot size to compute the signer fee.
    #[serde(default = "default_signer_fee_divisor")]
    pub signer_fee_divisor: u64,

    /// Lot sizes offered at deployment.
    #[serde(default)]
    pub lot_sizes: LotSizeSet,

    /// How long an emergency pause blocks new deposits.
    #[serde(
        rename = "pause_term_secs",
        default = "default_pause_term",
        with = "serde_helpers::serde_duration_secs"
    )]
    pub pause_term: Duration,
}

fn default_signer_fee_divisor() -> u64 {
    DEFAULT_SIGNER_FEE_DIVISOR
}

fn default_pause_term() -> Duration {
    Duration::from_secs(DEFAULT_PAUSE_TERM_SECS)
}

/// Parameter sets that can never produce a working system.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum ParamsError {
    #[error("owner must not be the zero address")]
    ZeroOwner,

    #[error("signer fee divisor must be greater than zero")]
    ZeroSignerFeeDivisor,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("read params: {0}")]
    Io(#[from] io::Error),

    #[error("parse params: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid params: {0}")]
    Invalid(#[from] ParamsError),
}

impl SystemParams {
    /// Creates params with the default policies for the given owner.
    pub fn new_with_defaults(owner: Address) -> Self {
        Self {
            owner,
            signer_fee_divisor: DEFAULT_SIGNER_FEE_DIVISOR,
            lot_sizes: LotSizeSet::default(),
            pause_term: default_pause_term(),
        }
    }

    /// Checks the invariants the lot size type can't carry by itself.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.owner.is_zero() {
            return Err(ParamsError::ZeroOwner);
        }
        if self.signer_fee_divisor == 0 {
            return Err(ParamsError::ZeroSignerFeeDivisor);
        }
        Ok(())
    }

    /// Parses and validates params from a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, LoadError> {
        let params: Self = toml::from_str(s)?;
        params.validate()?;
        Ok(params)
    }

    /// Reads, parses and validates params from a TOML file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tbtc_primitives::constants::{DEFAULT_LOT_SIZES, ONE_BTC_LOT_SIZE};

    use super::*;

    const OWNER: &str = "0x00000000000000000000000000000000000000aa";

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let params = SystemParams::from_toml_str(&format!("owner = \"{OWNER}\"")).unwrap();
        assert_eq!(params.signer_fee_divisor, DEFAULT_SIGNER_FEE_DIVISOR);
        assert_eq!(&*params.lot_sizes, &DEFAULT_LOT_SIZES);
        assert_eq!(params.pause_term, Duration::from_secs(864_000));
    }

    #[test]
    fn test_full_toml() {
        let doc = format!(
            r#"
            owner = "{OWNER}"
            signer_fee_divisor = 201
            lot_sizes = ["100000000", "1000000"]
            pause_term_secs = 3600
            "#
        );
        let params = SystemParams::from_toml_str(&doc).unwrap();
        assert_eq!(params.signer_fee_divisor, 201);
        assert_eq!(&*params.lot_sizes, &[ONE_BTC_LOT_SIZE, 1_000_000]);
        assert_eq!(params.pause_term, Duration::from_secs(3600));
    }

    #[test]
    fn test_rejects_lot_sizes_without_one_btc() {
        let doc = format!("owner = \"{OWNER}\"\nlot_sizes = [1000000]");
        let res = SystemParams::from_toml_str(&doc);
        assert!(matches!(res, Err(LoadError::Parse(_))));
    }

    #[test]
    fn test_rejects_zero_divisor() {
        let doc = format!("owner = \"{OWNER}\"\nsigner_fee_divisor = 0");
        let res = SystemParams::from_toml_str(&doc);
        assert!(matches!(
            res,
            Err(LoadError::Invalid(ParamsError::ZeroSignerFeeDivisor))
        ));
    }

    #[test]
    fn test_rejects_zero_owner() {
        let params = SystemParams::new_with_defaults(Address::ZERO);
        assert_eq!(params.validate(), Err(ParamsError::ZeroOwner));
    }

    #[test]
    fn test_json_roundtrip_keeps_string_lot_sizes() {
        let params = SystemParams::new_with_defaults(Address::repeat_byte(0xaa));
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["pause_term_secs"], 864_000);
        assert_eq!(json["lot_sizes"][5], "100000000");

        let back: SystemParams = serde_json::from_value(json).unwrap();
        assert_eq!(back, params);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "owner = \"{OWNER}\"").unwrap();
        let params = SystemParams::load(file.path()).unwrap();
        assert_eq!(params.owner, Address::with_last_byte(0xaa));
    }
}
