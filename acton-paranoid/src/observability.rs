//! Tracing initialization

use tracing_subscriber::EnvFilter;

use crate::{config::Config, error::Error, error::Result};

/// Initialize a global tracing subscriber from the logging configuration
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    };
    installed.map_err(|e| Error::Tracing(e.to_string()))?;

    tracing::info!(
        paranoia_column = %config.soft_delete.column,
        "Tracing initialized"
    );

    Ok(())
}
