//! Script assembly: header, sequence reset around one bulk insert.
//!
//! The assembler runs four stages in a fixed order:
//!
//! 1. header comments naming the tool and the table
//! 2. drop the key sequence and the key column's default
//! 3. one `INSERT` with a value tuple per row, tracking the largest key
//! 4. restore the default and recreate the sequence after the largest key
//!
//! Dropping the default first lets the insert carry explicit key values;
//! recreating the sequence afterwards makes later inserts continue from the
//! migrated data.

use tracing::debug;

use crate::core::schema::{ColumnDescriptor, PrimaryKey};
use crate::core::value::SqlValue;
use crate::dialect::RowSerializer;
use crate::drivers::postgres::PostgresDialect;
use crate::error::{ExportError, Result};

/// Name written into the script header.
pub const TOOL_NAME: &str = "mysql-pg-export";

const TUPLE_INDENT: &str = "    ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Start,
    Header,
    SequenceDisabled,
    Inserted,
    SequenceEnabled,
}

/// Transient state of one assembly run.
#[derive(Debug, Default)]
struct MigrationState {
    max_key: Option<i64>,
    rows: usize,
    lines: Vec<String>,
}

impl MigrationState {
    fn observe_key(&mut self, key: i64) {
        self.max_key = Some(self.max_key.map_or(key, |current| current.max(key)));
    }
}

/// A finished script and what went into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    /// Script lines in output order.
    pub lines: Vec<String>,
    /// Number of value tuples in the insert.
    pub rows: usize,
    /// Primary key column name.
    pub primary_key: String,
    /// Largest key value seen, if any rows were exported.
    pub max_key: Option<i64>,
    /// First value the recreated sequence will hand out.
    pub next_sequence_value: i64,
}

/// Builds the PostgreSQL script for one table.
///
/// Stage methods must be called in order; outside the crate only
/// [`assemble`] drives them.
pub(crate) struct ScriptAssembler<'a> {
    table: &'a str,
    columns: &'a [ColumnDescriptor],
    pk: &'a PrimaryKey,
    dialect: PostgresDialect,
    serializer: RowSerializer,
    stage: Stage,
    state: MigrationState,
}

impl<'a> ScriptAssembler<'a> {
    pub(crate) fn new(
        table: &'a str,
        columns: &'a [ColumnDescriptor],
        pk: &'a PrimaryKey,
        dialect: PostgresDialect,
        serializer: RowSerializer,
    ) -> Self {
        Self {
            table,
            columns,
            pk,
            dialect,
            serializer,
            stage: Stage::Start,
            state: MigrationState::default(),
        }
    }

    fn advance(&mut self, from: Stage, to: Stage) {
        debug_assert_eq!(self.stage, from, "script stages must run in order");
        self.stage = to;
    }

    /// Stage 1: comment lines naming the tool, the table and, when known,
    /// the source database.
    pub(crate) fn push_header(&mut self, source_database: Option<&str>) {
        self.advance(Stage::Start, Stage::Header);

        let lines = &mut self.state.lines;
        lines.push(format!("-- Generated by {} data migration tool", TOOL_NAME));
        lines.push(format!("-- Table: {}", self.table));
        if let Some(db) = source_database {
            lines.push(format!("-- Source database: {}", db));
        }
        lines.push(String::new());
    }

    /// Stage 2: drop the key sequence and the column default bound to it.
    pub(crate) fn push_sequence_disable(&mut self) -> Result<()> {
        self.advance(Stage::Header, Stage::SequenceDisabled);

        let pk = &self.pk.column.name;
        let drop_seq = self.dialect.drop_sequence(pk)?;
        let drop_default = self.dialect.drop_default(self.table, pk)?;

        debug!("Disabling sequence for {}.{}", self.table, pk);
        self.state.lines.push(drop_seq);
        self.state.lines.push(drop_default);
        self.state.lines.push(String::new());
        Ok(())
    }

    /// Stage 3: one insert statement with a value tuple per row.
    ///
    /// Tuples are comma separated; the last one ends the statement. A table
    /// with no rows gets a comment instead, since an insert needs at least
    /// one tuple.
    pub(crate) fn push_rows<R>(&mut self, rows: &[R]) -> Result<()>
    where
        R: AsRef<[SqlValue]>,
    {
        self.advance(Stage::SequenceDisabled, Stage::Inserted);

        if rows.is_empty() {
            self.state.lines.push("-- No rows exported".to_string());
            return Ok(());
        }

        let header = self
            .dialect
            .insert_into(self.table, self.columns.iter().map(|c| c.name.as_str()))?;
        self.state.lines.push(header);

        let last = rows.len() - 1;
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let tuple = self.serializer.serialize(i + 1, row, self.columns)?;
            let key = self.key_of(&row[self.pk.index])?;
            self.state.observe_key(key);
            self.state.rows += 1;

            let terminator = if i == last { ";" } else { "," };
            self.state
                .lines
                .push(format!("{}({}){}", TUPLE_INDENT, tuple, terminator));
        }

        debug!(
            "Serialized {} rows for {}, max {} = {:?}",
            self.state.rows, self.table, self.pk.column.name, self.state.max_key
        );
        Ok(())
    }

    /// Stage 4: restore the column default and recreate the sequence
    /// starting after the largest key.
    pub(crate) fn push_sequence_enable(&mut self) -> Result<()> {
        self.advance(Stage::Inserted, Stage::SequenceEnabled);

        let pk = &self.pk.column.name;
        let start = self.next_sequence_value()?;
        let set_default = self.dialect.set_default_nextval(self.table, pk)?;
        let create_seq = self.dialect.create_sequence(pk, start)?;

        debug!("Recreating sequence for {}.{} at {}", self.table, pk, start);
        self.state.lines.push(String::new());
        self.state.lines.push(set_default);
        self.state.lines.push(create_seq);
        Ok(())
    }

    /// Finish the run and hand out the script.
    pub(crate) fn finish(self) -> Result<Script> {
        debug_assert_eq!(self.stage, Stage::SequenceEnabled, "script is incomplete");
        let next_sequence_value = self.next_sequence_value()?;
        Ok(Script {
            lines: self.state.lines,
            rows: self.state.rows,
            primary_key: self.pk.column.name.clone(),
            max_key: self.state.max_key,
            next_sequence_value,
        })
    }

    fn next_sequence_value(&self) -> Result<i64> {
        self.state
            .max_key
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| {
                ExportError::value_format(
                    &self.pk.column.name,
                    "largest key leaves no room for a following sequence value",
                )
            })
    }

    fn key_of(&self, value: &SqlValue) -> Result<i64> {
        match value {
            SqlValue::U64(v) if i64::try_from(*v).is_err() => Err(ExportError::value_format(
                &self.pk.column.name,
                format!("key {} does not fit a PostgreSQL bigint sequence", v),
            )),
            _ => value.as_i64().ok_or_else(|| ExportError::NonIntegerKey {
                column: self.pk.column.name.clone(),
                value: value.to_string(),
            }),
        }
    }
}

/// Assemble a complete script in one call.
pub fn assemble<R>(
    table: &str,
    columns: &[ColumnDescriptor],
    pk: &PrimaryKey,
    rows: &[R],
    dialect: PostgresDialect,
    serializer: RowSerializer,
) -> Result<Script>
where
    R: AsRef<[SqlValue]>,
{
    let mut assembler = ScriptAssembler::new(table, columns, pk, dialect, serializer);
    assembler.push_header(None);
    assembler.push_sequence_disable()?;
    assembler.push_rows(rows)?;
    assembler.push_sequence_enable()?;
    assembler.finish()
}
