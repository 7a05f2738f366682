//! PostgreSQL statement syntax for the generated script.
//!
//! Builds the sequence and insert statements the script assembler emits.
//! Identifiers are rendered bare by default (`users`, `id_seq`) or
//! double-quoted when `quote_identifiers` is set.

use crate::core::identifier::render_pg;
use crate::error::Result;

/// Suffix appended to the key column name to form its sequence name.
pub const SEQUENCE_SUFFIX: &str = "_seq";

/// PostgreSQL dialect implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect {
    quote_identifiers: bool,
}

impl PostgresDialect {
    /// Create a new PostgreSQL dialect instance.
    pub fn new(quote_identifiers: bool) -> Self {
        Self { quote_identifiers }
    }

    /// Render a table, column or sequence name.
    pub fn ident(&self, name: &str) -> Result<String> {
        render_pg(name, self.quote_identifiers)
    }

    /// Sequence name backing a key column.
    pub fn sequence_name(&self, pk_col: &str) -> Result<String> {
        self.ident(&format!("{}{}", pk_col, SEQUENCE_SUFFIX))
    }

    pub fn drop_sequence(&self, pk_col: &str) -> Result<String> {
        Ok(format!(
            "DROP SEQUENCE IF EXISTS {};",
            self.sequence_name(pk_col)?
        ))
    }

    pub fn drop_default(&self, table: &str, pk_col: &str) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} ALTER COLUMN {} DROP DEFAULT;",
            self.ident(table)?,
            self.ident(pk_col)?
        ))
    }

    /// Point the key column's default at its sequence.
    ///
    /// The sequence is resolved through a text → regclass cast when the
    /// default is evaluated, so this may run before `CREATE SEQUENCE`.
    pub fn set_default_nextval(&self, table: &str, pk_col: &str) -> Result<String> {
        let seq = self.sequence_name(pk_col)?.replace('\'', "''");
        Ok(format!(
            "ALTER TABLE {} ALTER COLUMN {} SET DEFAULT NEXTVAL(('{}'::text)::REGCLASS);",
            self.ident(table)?,
            self.ident(pk_col)?,
            seq
        ))
    }

    pub fn create_sequence(&self, pk_col: &str, start: i64) -> Result<String> {
        Ok(format!(
            "CREATE SEQUENCE {} INCREMENT 1 START {};",
            self.sequence_name(pk_col)?,
            start
        ))
    }

    /// Header line of a multi-row insert; value tuples follow on their own lines.
    pub fn insert_into<'a, I>(&self, table: &str, columns: I) -> Result<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let cols = columns
            .into_iter()
            .map(|c| self.ident(c))
            .collect::<Result<Vec<_>>>()?
            .join(", ");
        Ok(format!("INSERT INTO {} ({}) VALUES", self.ident(table)?, cols))
    }
}
