//! Row → value tuple serialization.

use crate::core::schema::ColumnDescriptor;
use crate::core::value::SqlValue;
use crate::error::{ExportError, Result};

use super::literal::{LiteralEncoder, LiteralError};

/// Serializes rows into comma-joined literal lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowSerializer {
    encoder: LiteralEncoder,
}

impl RowSerializer {
    pub fn new(encoder: LiteralEncoder) -> Self {
        Self { encoder }
    }

    /// Encode every value of a row with its column's declared type and join
    /// the literals with `", "`.
    ///
    /// `row_number` is only used in error messages.
    pub fn serialize(
        &self,
        row_number: usize,
        row: &[SqlValue],
        columns: &[ColumnDescriptor],
    ) -> Result<String> {
        if row.len() != columns.len() {
            return Err(ExportError::ColumnCountMismatch {
                row: row_number,
                expected: columns.len(),
                actual: row.len(),
            });
        }

        let literals = row
            .iter()
            .zip(columns)
            .map(|(value, col)| {
                self.encoder
                    .encode(value, &col.declared_type)
                    .map_err(|e| lift(e, col))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(literals.join(", "))
    }
}

/// Serialize one row with the core type set.
pub fn serialize_row(row: &[SqlValue], columns: &[ColumnDescriptor]) -> Result<String> {
    RowSerializer::default().serialize(0, row, columns)
}

fn lift(err: LiteralError, col: &ColumnDescriptor) -> ExportError {
    match err {
        LiteralError::UnsupportedType(data_type) => ExportError::UnsupportedType {
            column: col.name.clone(),
            data_type,
        },
        other => ExportError::value_format(&col.name, other.to_string()),
    }
}
