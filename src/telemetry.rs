//! Tracing setup for hosts embedding the companion

use crate::config::CompanionConfig;
use crate::error::{CompanionError, Result};
use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber at the configured `log_level`
pub fn init_from_config(config: &CompanionConfig) -> Result<()> {
    init_tracing(&config.log_level)
}

/// Install a global fmt subscriber
///
/// `RUST_LOG` takes precedence over `log_level`. Fails if a global
/// subscriber is already installed.
pub fn init_tracing(log_level: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .try_init()
        .map_err(|e| CompanionError::Config(format!("Failed to initialize tracing: {}", e)))
}
