//! Protocol-wide constants.

/// Number of satoshis in one bitcoin.
pub const SATS_PER_BTC: u64 = 100_000_000;

/// The canonical lot size every lot size set has to offer.
pub const ONE_BTC_LOT_SIZE: u64 = SATS_PER_BTC;

/// Lot sizes offered right after deployment, in satoshis.
pub const DEFAULT_LOT_SIZES: [u64; 6] = [
    100_000,
    1_000_000,
    10_000_000,
    20_000_000,
    50_000_000,
    ONE_BTC_LOT_SIZE,
];

/// Divisor applied to a lot size to compute the signer fee (0.5%).
pub const DEFAULT_SIGNER_FEE_DIVISOR: u64 = 200;

/// How long an emergency pause of new deposits lasts, in seconds (10 days).
pub const DEFAULT_PAUSE_TERM_SECS: u64 = 10 * 24 * 60 * 60;
