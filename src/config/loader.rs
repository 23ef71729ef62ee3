//! Service configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServiceConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ServiceConfig = toml::from_str(&content)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_config(config: &ServiceConfig) -> Result<(), ConfigError> {
    if config.sync.interval_secs == 0 {
        return Err(ConfigError::Validation(
            "sync.interval_secs must be greater than zero".into(),
        ));
    }
    if config.api.bind_address.parse::<std::net::SocketAddr>().is_err() {
        return Err(ConfigError::Validation(format!(
            "api.bind_address is not a valid socket address: {}",
            config.api.bind_address
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: ServiceConfig = toml::from_str("").unwrap();
        assert_eq!(config.sync.interval_secs, 60);
        assert_eq!(config.api.bind_address, "127.0.0.1:9094");
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let config: ServiceConfig = toml::from_str("[sync]\ninterval_secs = 0\n").unwrap();
        assert!(validate_config(&config).is_err());
    }
}
