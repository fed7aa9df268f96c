//! # Task Telemetry
//!
//! Logging bootstrap for processes embedding the game task bridge.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use task_telemetry::{init_logging, TelemetryConfig};
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
//! | `GT_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `GT_JSON_LOGS` | `false` | JSON formatted output |
//! | `GT_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `GT_SERVICE_NAME` | `game-tasks` | Service name attached to startup log |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{init_logging, init_test_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("Failed to install global subscriber: {0}")]
    SubscriberInit(String),
}
