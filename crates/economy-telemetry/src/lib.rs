//! # Economy Telemetry
//!
//! Structured logging for the economy subsystems, built on
//! `tracing-subscriber`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use economy_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_telemetry(&TelemetryConfig::from_env())?;
//!     // Events from every subsystem now reach stdout.
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `economy-core` | Service name in logs |
//! | `EC_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `EC_CONSOLE_OUTPUT` | `true` | Write to stdout |
//! | `EC_JSON_LOGS` | `false` (`true` in containers) | JSON lines |

mod config;
mod logging;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use tracing_setup::{env_filter, init_tracing};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(String),
}

/// Initialize logging for the process.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    init_tracing(config)
}

/// Convenience macro for creating a span with subsystem context.
///
/// ```rust,ignore
/// let _span = subsystem_span!("transfer", subsystem = "ec-05", from = %from).entered();
/// ```
#[macro_export]
macro_rules! subsystem_span {
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}
