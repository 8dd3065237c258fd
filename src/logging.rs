//! Tracing subscriber setup for embedding applications

use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;
use crate::error::PresenceGuardError;

/// Build the filter: `RUST_LOG` wins over the configured level
fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Install a global fmt subscriber in the configured format.
///
/// Fails if a global subscriber is already set.
pub fn init(config: &LoggingConfig) -> crate::Result<()> {
    let filter = env_filter(config);
    let result = match config.format.as_str() {
        "json" => fmt().with_env_filter(filter).json().try_init(),
        "compact" => fmt().with_env_filter(filter).compact().try_init(),
        _ => fmt().with_env_filter(filter).pretty().try_init(),
    };

    result.map_err(|e| PresenceGuardError::config(format!("Failed to initialise logging: {e}")))?;
    tracing::debug!(level = %config.level, format = %config.format, "Logging initialised");
    Ok(())
}
