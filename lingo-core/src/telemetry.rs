//! Tracing subscriber setup.
//!
//! The library itself only emits `tracing` events; binaries embedding it call
//! [`init_tracing`] once at startup. `RUST_LOG` takes precedence over the
//! configured level.

use tracing_subscriber::EnvFilter;

use crate::config::{GeneralConfig, LogFormat};
use crate::error::{LingoError, Result};

/// Build the filter from `RUST_LOG`, falling back to `config.log_level`.
///
/// # Errors
///
/// Returns [`LingoError::Config`] if the configured level is not a valid
/// filter directive.
pub fn env_filter(config: &GeneralConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.log_level)
        .map_err(|e| LingoError::Config(format!("invalid log level '{}': {e}", config.log_level)))
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns [`LingoError::Config`] if the filter is invalid or a global
/// subscriber is already installed.
pub fn init_tracing(config: &GeneralConfig) -> Result<()> {
    let filter = env_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let installed = match config.log_format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| LingoError::Config(format!("tracing already initialised: {e}")))
}
