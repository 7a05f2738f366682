//! Configuration type definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Source database configuration (MySQL/MariaDB).
    pub source: SourceConfig,

    /// Script generation options.
    #[serde(default)]
    pub export: ExportConfig,
}

/// Source database (MySQL/MariaDB) configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Database host.
    pub host: String,

    /// Database port (default: 3306).
    #[serde(default = "default_mysql_port")]
    pub port: u16,

    /// Database name.
    pub database: String,

    /// Username.
    pub user: String,

    /// Password.
    #[serde(default)]
    pub password: String,

    /// TLS mode: disabled, preferred or required (default: preferred).
    #[serde(default = "default_ssl_mode")]
    pub ssl_mode: String,
}

impl fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

/// Script generation options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Double-quote table, column and sequence names in the script (default: false).
    #[serde(default)]
    pub quote_identifiers: bool,

    /// Fetch rows ordered by the primary key (default: true).
    #[serde(default = "default_true")]
    pub order_by_primary_key: bool,

    /// Accept text, numeric and date/time types beyond the core set (default: false).
    #[serde(default)]
    pub extended_types: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            quote_identifiers: false,
            order_by_primary_key: true,
            extended_types: false,
        }
    }
}

fn default_mysql_port() -> u16 {
    3306
}

fn default_ssl_mode() -> String {
    "preferred".to_string()
}

fn default_true() -> bool {
    true
}
