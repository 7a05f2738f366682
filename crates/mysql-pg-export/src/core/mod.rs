//! Core abstractions shared by the export pipeline.
//!
//! - [`schema`]: column metadata and primary key discovery
//! - [`value`]: values decoded from source rows
//! - [`traits`]: source and sink seams
//! - [`identifier`]: identifier validation and quoting

pub mod identifier;
pub mod schema;
pub mod traits;
pub mod value;

pub use schema::{locate_primary_key, ColumnDescriptor, KeyRole, PrimaryKey};
pub use traits::{ScriptSink, TableSource};
pub use value::{Row, SqlValue};
