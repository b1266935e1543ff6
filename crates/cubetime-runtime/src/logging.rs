//! Logging setup for binaries and demos. Libraries only emit `tracing`
//! events; installing a subscriber is left to the process.

use cubetime_core::{CubeResult, CubeTimeError};
use tracing_subscriber::EnvFilter;

/// Logging configuration
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "info".to_string(),
            json: false,
        }
    }
}

impl LoggingConfig {
    pub fn verbose() -> Self {
        LoggingConfig {
            filter: "debug".to_string(),
            json: false,
        }
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(config: &LoggingConfig) -> CubeResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| CubeTimeError::Logging(e.to_string()))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| CubeTimeError::Logging(e.to_string()))
}
