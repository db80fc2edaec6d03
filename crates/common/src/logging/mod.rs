//! Logging subsystem: compact or JSON output to stdout, with an optional
//! rolling log file.

pub mod manager;
pub mod types;


pub use manager::{build_filter, init, InitError};
pub use types::{FileLoggingConfig, LogRotation, LoggerConfig, StdoutConfig};

/// Formats a service name with an optional label suffix.
pub fn format_service_name(base: &str, label: Option<&str>) -> String {
    match label {
        Some(label) => format!("{base}%{label}"),
        None => base.to_owned(),
    }
}
