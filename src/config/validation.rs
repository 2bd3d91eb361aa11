//! Configuration validation.
//!
//! Validation is a pure function run before any listener starts.

use thiserror::Error;

use crate::config::schema::DumpConfig;

/// Configuration errors, fatal before any network work happens.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("require at least one address to listen to")]
    NoAddresses,
}

/// Check that the configuration can be started.
pub fn validate_config(config: &DumpConfig) -> Result<(), ConfigError> {
    if config.addresses.is_empty() {
        return Err(ConfigError::NoAddresses);
    }
    Ok(())
}
