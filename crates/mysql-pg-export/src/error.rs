//! Error types for the export library.

use thiserror::Error;

/// Exit code for configuration errors.
pub const EXIT_CONFIG_ERROR: u8 = 1;
/// Exit code for connection and source query errors.
pub const EXIT_CONNECTION_ERROR: u8 = 2;
/// Exit code for schema errors (missing table, unusable primary key).
pub const EXIT_SCHEMA_ERROR: u8 = 3;
/// Exit code for data errors (unsupported types, malformed values).
pub const EXIT_DATA_ERROR: u8 = 4;
/// Exit code for IO errors (config file, output file).
pub const EXIT_IO_ERROR: u8 = 7;

/// Main error type for export operations.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection error with context
    #[error("Connection error: {message}\n  Context: {context}")]
    Connection { message: String, context: String },

    /// Source database query error
    #[error("Source database error: {0}")]
    Source(#[from] sqlx::Error),

    /// Table does not exist or has no columns
    #[error("Table {0} not found in source database")]
    TableNotFound(String),

    /// Table has no primary key column
    #[error("Table {0} has no primary key - a single-column primary key is required")]
    NoPrimaryKey(String),

    /// Table has a primary key spanning several columns
    #[error("Table {table} has a composite primary key ({columns}) - a single-column primary key is required")]
    CompositePrimaryKey { table: String, columns: String },

    /// Column type has no literal mapping
    #[error("Unsupported type '{data_type}' for column {column}")]
    UnsupportedType { column: String, data_type: String },

    /// Value does not match its column's declared type
    #[error("Cannot format value for column {column}: {message}")]
    ValueFormat { column: String, message: String },

    /// Row width differs from the schema width
    #[error("Row {row} has {actual} values but the table has {expected} columns")]
    ColumnCountMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// Primary key value cannot seed an integer sequence
    #[error("Primary key {column} has non-integer value {value} - cannot seed a sequence")]
    NonIntegerKey { column: String, value: String },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ExportError {
    /// Create a Connection error with context about where it occurred
    pub fn connection(message: impl ToString, context: impl Into<String>) -> Self {
        ExportError::Connection {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Create a ValueFormat error
    pub fn value_format(column: impl Into<String>, message: impl Into<String>) -> Self {
        ExportError::ValueFormat {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Process exit code for this error category.
    pub fn exit_code(&self) -> u8 {
        match self {
            ExportError::Config(_) | ExportError::Yaml(_) => EXIT_CONFIG_ERROR,
            ExportError::Connection { .. } | ExportError::Source(_) => EXIT_CONNECTION_ERROR,
            ExportError::TableNotFound(_)
            | ExportError::NoPrimaryKey(_)
            | ExportError::CompositePrimaryKey { .. } => EXIT_SCHEMA_ERROR,
            ExportError::UnsupportedType { .. }
            | ExportError::ValueFormat { .. }
            | ExportError::ColumnCountMismatch { .. }
            | ExportError::NonIntegerKey { .. } => EXIT_DATA_ERROR,
            ExportError::Io(_) | ExportError::Json(_) => EXIT_IO_ERROR,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_category() {
        assert_eq!(ExportError::Config("x".into()).exit_code(), EXIT_CONFIG_ERROR);
        assert_eq!(
            ExportError::connection("refused", "connecting").exit_code(),
            EXIT_CONNECTION_ERROR
        );
        assert_eq!(
            ExportError::NoPrimaryKey("users".into()).exit_code(),
            EXIT_SCHEMA_ERROR
        );
        assert_eq!(
            ExportError::UnsupportedType {
                column: "shape".into(),
                data_type: "geometry".into()
            }
            .exit_code(),
            EXIT_DATA_ERROR
        );
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert_eq!(ExportError::from(io).exit_code(), EXIT_IO_ERROR);
    }

    #[test]
    fn test_format_detailed_includes_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ExportError::from(io);
        let detailed = err.format_detailed();
        assert!(detailed.starts_with("Error: IO error: denied"));
    }

    #[test]
    fn test_unsupported_type_names_column() {
        let err = ExportError::UnsupportedType {
            column: "shape".into(),
            data_type: "geometry".into(),
        };
        assert_eq!(
            err.to_string(),
            "Unsupported type 'geometry' for column shape"
        );
    }
}
