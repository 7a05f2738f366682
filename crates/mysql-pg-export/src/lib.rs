//! # mysql-pg-export
//!
//! Export a MySQL/MariaDB table as a PostgreSQL data script.
//!
//! The generated script drops the primary key sequence, inserts every row
//! with its original key value in one multi-row `INSERT`, then recreates the
//! sequence so it continues after the largest exported key:
//!
//! - **Literal encoding** of MySQL values by declared column type
//! - **Sequence reset** derived from the running maximum of the key
//! - **Atomic output**: a failed export never leaves a partial script
//!
//! ## Example
//!
//! ```rust,no_run
//! use mysql_pg_export::{Config, Exporter, FileSink};
//!
//! #[tokio::main]
//! async fn main() -> mysql_pg_export::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let exporter = Exporter::new(config);
//!     let mut sink = FileSink::new("users.sql");
//!     let result = exporter.run("users", &mut sink).await?;
//!     println!("Exported {} rows", result.rows_exported);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod dialect;
pub mod drivers;
pub mod error;
pub mod orchestrator;
pub mod script;
pub mod sink;

// Re-exports for convenient access
pub use config::{Config, ExportConfig, SourceConfig};
pub use crate::core::{ColumnDescriptor, KeyRole, Row, ScriptSink, SqlValue, TableSource};
pub use dialect::{LiteralEncoder, RowSerializer};
pub use drivers::{MysqlSource, PostgresDialect};
pub use error::{ExportError, Result};
pub use orchestrator::{export_table, ExportResult, Exporter, HealthCheckResult};
pub use script::{assemble, Script};
pub use sink::{FileSink, MemorySink, StdoutSink};
