//! Logging initialization.

use std::env;

use thiserror::Error;
use tracing::*;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::{
    filter::{EnvFilter, ParseError},
    fmt::layer,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    Layer,
};

use super::types::LoggerConfig;

/// Noisy dependencies held at WARN unless `RUST_LOG` says otherwise.
const QUIET_TARGETS: &[&str] = &["hyper=warn", "reqwest=warn", "alloy_transport_http=warn"];

#[derive(Debug, Error)]
pub enum InitError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),

    #[error("install subscriber: {0}")]
    Install(#[from] TryInitError),
}

/// Builds the env filter, starting from `default_directive` (or INFO) and
/// letting `RUST_LOG` override it.
pub fn build_filter(default_directive: Option<&str>) -> Result<EnvFilter, ParseError> {
    let overrides = env::var(EnvFilter::DEFAULT_ENV).ok();
    build_filter_with(default_directive, overrides.as_deref())
}

/// Layers the base directive, then [`QUIET_TARGETS`], then `overrides`. A
/// later directive replaces an earlier one for the same target.
pub(crate) fn build_filter_with(
    default_directive: Option<&str>,
    overrides: Option<&str>,
) -> Result<EnvFilter, ParseError> {
    let mut filt = match default_directive {
        Some(directive) => EnvFilter::builder().parse(directive)?,
        None => EnvFilter::default().add_directive(Level::INFO.into()),
    };

    for target in QUIET_TARGETS {
        filt = filt.add_directive(target.parse()?);
    }

    if let Some(overrides) = overrides {
        for directive in overrides.split(',').filter(|d| !d.trim().is_empty()) {
            filt = filt.add_directive(directive.trim().parse()?);
        }
    }

    Ok(filt)
}

/// Initializes the logging subsystem with the provided config.
///
/// Fails if a global subscriber is already installed.
pub fn init(config: LoggerConfig) -> Result<(), InitError> {
    let filt = build_filter(config.default_directive.as_deref())?;

    let stdout_sub = if config.stdout_config.json_format {
        layer()
            .json()
            .with_span_events(config.stdout_config.fmt_span.clone())
            .with_filter(filt.clone())
            .boxed()
    } else {
        layer()
            .compact()
            .with_span_events(config.stdout_config.fmt_span.clone())
            .with_filter(filt.clone())
            .boxed()
    };

    let file_layer = config.file_logging_config.as_ref().map(|file_config| {
        let file_appender = RollingFileAppender::new(
            file_config.rotation.into(),
            &file_config.directory,
            &file_config.file_name_prefix,
        );

        if file_config.json_format {
            layer()
                .json()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_filter(filt.clone())
                .boxed()
        } else {
            layer()
                .compact()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_filter(filt.clone())
                .boxed()
        }
    });

    tracing_subscriber::registry()
        .with(stdout_sub)
        .with(file_layer)
        .try_init()?;

    info!(
        service_name = %config.service_name,
        service_version = ?config.service_version,
        file_logging = config.file_logging_config.is_some(),
        "logging initialized"
    );
    Ok(())
}
