//! API configuration

use serde::Deserialize;

use core_kernel::CoreError;
use domain_invoicing::DEFAULT_MAX_ATTEMPTS;
use infra_db::DatabaseConfig;

/// API configuration
///
/// Loaded from `API_`-prefixed environment variables; anything unset keeps
/// its default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database URL
    pub database_url: String,
    /// Log level
    pub log_level: String,
    /// Invoice number allocation attempts before reporting a conflict
    pub allocation_max_attempts: u32,
    /// Maximum pooled database connections
    pub db_max_connections: u32,
    /// Minimum pooled database connections
    pub db_min_connections: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "postgres://localhost/invoicing".to_string(),
            log_level: "info".to_string(),
            allocation_max_attempts: DEFAULT_MAX_ATTEMPTS,
            db_max_connections: 10,
            db_min_connections: 2,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Checks values the server cannot start with
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.port == 0 {
            return Err(CoreError::configuration("port must not be 0"));
        }
        if self.database_url.trim().is_empty() {
            return Err(CoreError::configuration("database_url must be set"));
        }
        if self.allocation_max_attempts == 0 {
            return Err(CoreError::configuration("allocation_max_attempts must be at least 1"));
        }
        if self.db_min_connections > self.db_max_connections {
            return Err(CoreError::configuration(format!(
                "db_min_connections ({}) exceeds db_max_connections ({})",
                self.db_min_connections, self.db_max_connections
            )));
        }
        Ok(())
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Pool settings for the configured database
    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::new(self.database_url.clone())
            .max_connections(self.db_max_connections)
            .min_connections(self.db_min_connections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ApiConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert_eq!(config.allocation_max_attempts, DEFAULT_MAX_ATTEMPTS);
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let config = ApiConfig {
            allocation_max_attempts: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::Configuration(_))));
    }

    #[test]
    fn test_pool_bounds_checked() {
        let config = ApiConfig {
            db_min_connections: 20,
            db_max_connections: 5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_database_config_carries_pool_sizes() {
        let config = ApiConfig {
            db_max_connections: 25,
            ..Default::default()
        };
        let db = config.database_config();
        assert_eq!(db.max_connections, 25);
        assert_eq!(db.url, "postgres://localhost/invoicing");
    }
}
