//! Configuration validation.

use super::Config;
use crate::error::{ExportError, Result};

/// Accepted values for `source.ssl_mode`.
pub const SSL_MODES: &[&str] = &["disabled", "preferred", "required"];

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    if config.source.host.is_empty() {
        return Err(ExportError::Config("source.host is required".into()));
    }
    if config.source.database.is_empty() {
        return Err(ExportError::Config("source.database is required".into()));
    }
    if config.source.user.is_empty() {
        return Err(ExportError::Config("source.user is required".into()));
    }
    if config.source.port == 0 {
        return Err(ExportError::Config("source.port must be non-zero".into()));
    }

    let ssl_mode = config.source.ssl_mode.to_lowercase();
    if !SSL_MODES.contains(&ssl_mode.as_str()) {
        return Err(ExportError::Config(format!(
            "source.ssl_mode must be one of {}, got '{}'",
            SSL_MODES.join(", "),
            config.source.ssl_mode
        )));
    }

    Ok(())
}
