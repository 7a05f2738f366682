//! Seams between the export core and its collaborators.
//!
//! - [`TableSource`]: describes and reads one source table
//! - [`ScriptSink`]: persists the generated script lines

use async_trait::async_trait;

use crate::error::Result;

use super::schema::ColumnDescriptor;
use super::value::Row;

/// Read schema and data from a source database.
///
/// The export driver owns a source for the duration of one run and calls
/// [`close`](TableSource::close) exactly once when it is done, whether the
/// run succeeded or not.
#[async_trait]
pub trait TableSource: Send + Sync {
    /// Describe the columns of a table in physical order.
    ///
    /// Returns [`ExportError::TableNotFound`](crate::ExportError::TableNotFound)
    /// when the table does not exist.
    async fn describe_table(&self, table: &str) -> Result<Vec<ColumnDescriptor>>;

    /// Fetch every row of a table, values aligned to `columns`.
    ///
    /// When `order_by` names a column, rows are returned in ascending order of it.
    async fn fetch_rows(
        &self,
        table: &str,
        columns: &[ColumnDescriptor],
        order_by: Option<&str>,
    ) -> Result<Vec<Row>>;

    /// Name of the source database, used in the script header.
    fn database(&self) -> Option<&str> {
        None
    }

    /// Release the underlying connection.
    async fn close(&self);
}

/// Persist an assembled script.
pub trait ScriptSink {
    /// Write all lines, in order, one line per entry.
    fn write_script(&mut self, lines: &[String]) -> Result<()>;

    /// Human-readable destination (file path, `stdout`, ...).
    fn location(&self) -> String;
}
