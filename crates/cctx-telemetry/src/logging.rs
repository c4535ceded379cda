//! Structured logging setup.
//!
//! Installs a global `tracing` subscriber: an `EnvFilter` built from the
//! configured level plus either a JSON or a human-readable fmt layer.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{TelemetryConfig, TelemetryError};

/// Handle returned once the subscriber is installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingHandle {
    /// Service name the subscriber was installed for.
    pub service_name: String,
    /// Whether JSON output is active.
    pub json: bool,
}

/// Build the level filter for `config`.
pub fn build_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(&config.log_level).map_err(|e| TelemetryError::Config(e.to_string()))
}

/// Install the global subscriber.
///
/// Fails with `AlreadyInitialized` if a global subscriber is already set.
pub fn init_logging(config: &TelemetryConfig) -> Result<LoggingHandle, TelemetryError> {
    let env_filter = build_filter(config)?;

    let result = if !config.console_output {
        tracing_subscriber::registry().with(env_filter).try_init()
    } else if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
    };
    result.map_err(|_| TelemetryError::AlreadyInitialized)?;

    tracing::info!(
        service = %config.service_name,
        level = %config.log_level,
        json = config.json_logs,
        "Logging initialized"
    );

    Ok(LoggingHandle {
        service_name: config.service_name.clone(),
        json: config.json_logs,
    })
}

/// Log a CCTX event with the index as a structured field.
#[macro_export]
macro_rules! log_cctx_event {
    ($level:ident, $index:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            cctx_index = %$index,
            $($($field)*,)?
            $msg
        )
    };
}
