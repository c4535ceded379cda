//! # CCTX Telemetry
//!
//! Structured logging for the cross-chain transaction core. Metrics live in
//! `cctx-core` behind its `metrics` feature.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cctx_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     init_logging(&config).expect("Failed to init logging");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CCTX_SERVICE_NAME` | `cctx-core` | Service name in log lines |
//! | `CCTX_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `CCTX_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `CCTX_JSON_LOGS` | `false` | JSON lines output |

#![warn(missing_docs)]

mod config;
mod logging;

pub use config::{TelemetryConfig, DEFAULT_SERVICE_NAME};
pub use logging::{build_filter, init_logging, LoggingHandle};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    /// A global subscriber is already installed.
    #[error("Global subscriber already initialized")]
    AlreadyInitialized,

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}
