//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;
pub use validation::SSL_MODES;

use crate::error::Result;
use sqlx::mysql::{MySqlConnectOptions, MySqlSslMode};
use std::path::Path;

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }
}

impl SourceConfig {
    /// TLS mode for the sqlx connection. Unknown values fall back to Preferred;
    /// `validate` rejects them before a connection is attempted.
    pub fn ssl_mode(&self) -> MySqlSslMode {
        match self.ssl_mode.to_lowercase().as_str() {
            "disabled" => MySqlSslMode::Disabled,
            "required" => MySqlSslMode::Required,
            _ => MySqlSslMode::Preferred,
        }
    }

    /// Build sqlx connect options.
    pub fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password)
            .ssl_mode(self.ssl_mode())
    }
}
