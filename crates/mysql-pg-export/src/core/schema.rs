//! Column metadata and primary key discovery.

use serde::{Deserialize, Serialize};

use crate::error::{ExportError, Result};

/// Key membership reported by MySQL's `COLUMN_KEY` (the `Key` column of `DESCRIBE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KeyRole {
    /// Part of the primary key (`PRI`).
    Primary,
    /// First column of a unique index (`UNI`).
    Unique,
    /// First column of a non-unique index (`MUL`).
    Multiple,
    /// Not indexed.
    #[default]
    None,
}

impl KeyRole {
    /// Parse a `COLUMN_KEY` value. Unknown markers are treated as no key.
    pub fn from_mysql(key: &str) -> Self {
        match key.trim().to_uppercase().as_str() {
            "PRI" => KeyRole::Primary,
            "UNI" => KeyRole::Unique,
            "MUL" => KeyRole::Multiple,
            _ => KeyRole::None,
        }
    }
}

/// Column metadata, one per column in physical order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name.
    pub name: String,

    /// Full declared type as reported by the source (e.g. `int(11)`, `varchar(255)`).
    pub declared_type: String,

    /// Key membership.
    pub key_role: KeyRole,

    /// Whether the column accepts NULL.
    pub is_nullable: bool,

    /// MySQL `EXTRA` attributes (e.g. `auto_increment`).
    pub extra: String,
}

impl ColumnDescriptor {
    /// Create a nullable, non-key column.
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            key_role: KeyRole::None,
            is_nullable: true,
            extra: String::new(),
        }
    }

    /// Create a primary key column.
    pub fn primary(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            key_role: KeyRole::Primary,
            is_nullable: false,
            ..Self::new(name, declared_type)
        }
    }

    /// Check if the column is flagged as primary key.
    pub fn is_primary_key(&self) -> bool {
        self.key_role == KeyRole::Primary
    }

    /// Check if MySQL generates values for this column.
    pub fn is_auto_increment(&self) -> bool {
        self.extra.to_lowercase().contains("auto_increment")
    }
}

/// The resolved primary key column and its position in the row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryKey {
    pub column: ColumnDescriptor,
    pub index: usize,
}

/// Find the single primary key column of a table.
///
/// Fails when no column is flagged as primary key, and when more than one is:
/// a sequence can only continue a single integer key.
pub fn locate_primary_key(table: &str, columns: &[ColumnDescriptor]) -> Result<PrimaryKey> {
    let mut keys = columns
        .iter()
        .enumerate()
        .filter(|(_, col)| col.is_primary_key());

    let (index, column) = keys
        .next()
        .ok_or_else(|| ExportError::NoPrimaryKey(table.to_string()))?;

    if keys.next().is_some() {
        let names = columns
            .iter()
            .filter(|c| c.is_primary_key())
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(ExportError::CompositePrimaryKey {
            table: table.to_string(),
            columns: names,
        });
    }

    Ok(PrimaryKey {
        column: column.clone(),
        index,
    })
}
