//! Ambient plumbing shared by the tBTC services.

pub mod logging;
