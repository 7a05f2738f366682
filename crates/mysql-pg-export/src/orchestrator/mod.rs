//! Export orchestrator - main workflow coordinator.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{Config, ExportConfig};
use crate::core::identifier::validate_identifier;
use crate::core::schema::{locate_primary_key, ColumnDescriptor};
use crate::core::traits::{ScriptSink, TableSource};
use crate::dialect::{LiteralEncoder, RowSerializer};
use crate::drivers::mysql::MysqlSource;
use crate::drivers::postgres::PostgresDialect;
use crate::error::{ExportError, Result};
use crate::script::ScriptAssembler;

/// Result of an export run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResult {
    /// Exported table.
    pub table: String,

    /// Source database, when the source reports one.
    pub database: Option<String>,

    /// Primary key column.
    pub primary_key: String,

    /// Rows written into the insert statement.
    pub rows_exported: usize,

    /// Largest primary key value exported.
    pub max_key: Option<i64>,

    /// Start value of the recreated sequence.
    pub next_sequence_value: i64,

    /// Where the script was written.
    pub output: String,

    /// When the export started.
    pub started_at: DateTime<Utc>,

    /// When the export completed.
    pub completed_at: DateTime<Utc>,

    /// Total duration in seconds.
    pub duration_seconds: f64,
}

impl ExportResult {
    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Export one table from `source` into `sink`.
///
/// The source is closed exactly once before this returns, on success and on
/// every error path. The sink is only written after the whole script was
/// assembled, so a failed export never produces a partial script.
pub async fn export_table<S, K>(
    source: &S,
    table: &str,
    options: &ExportConfig,
    sink: &mut K,
) -> Result<ExportResult>
where
    S: TableSource + ?Sized,
    K: ScriptSink + ?Sized,
{
    let result = run_export(source, table, options, sink).await;
    source.close().await;
    result
}

async fn run_export<S, K>(
    source: &S,
    table: &str,
    options: &ExportConfig,
    sink: &mut K,
) -> Result<ExportResult>
where
    S: TableSource + ?Sized,
    K: ScriptSink + ?Sized,
{
    let started_at = Utc::now();
    let timer = Instant::now();
    validate_identifier(table)?;

    info!("Describing table {}", table);
    let columns = source.describe_table(table).await?;
    let pk = locate_primary_key(table, &columns)?;
    info!(
        "Table {}: {} columns, primary key {} (position {})",
        table,
        columns.len(),
        pk.column.name,
        pk.index
    );
    if !pk.column.is_auto_increment() {
        warn!(
            "Primary key {}.{} is not auto_increment in the source",
            table, pk.column.name
        );
    }

    let encoder = LiteralEncoder::new().with_extended_types(options.extended_types);
    check_column_types(&encoder, &columns)?;

    let dialect = PostgresDialect::new(options.quote_identifiers);
    let mut assembler =
        ScriptAssembler::new(table, &columns, &pk, dialect, RowSerializer::new(encoder));
    assembler.push_header(source.database());
    assembler.push_sequence_disable()?;

    let order_by = options
        .order_by_primary_key
        .then_some(pk.column.name.as_str());
    let rows = source.fetch_rows(table, &columns, order_by).await?;
    info!("Fetched {} rows from {}", rows.len(), table);

    assembler.push_rows(&rows)?;
    assembler.push_sequence_enable()?;
    let script = assembler.finish()?;

    sink.write_script(&script.lines)?;
    debug!("Script delivered to {}", sink.location());

    let completed_at = Utc::now();
    let result = ExportResult {
        table: table.to_string(),
        database: source.database().map(str::to_string),
        primary_key: script.primary_key,
        rows_exported: script.rows,
        max_key: script.max_key,
        next_sequence_value: script.next_sequence_value,
        output: sink.location(),
        started_at,
        completed_at,
        duration_seconds: timer.elapsed().as_secs_f64(),
    };

    info!(
        "Exported {} rows from {} to {} (sequence restarts at {})",
        result.rows_exported, table, result.output, result.next_sequence_value
    );
    Ok(result)
}

/// Reject unsupported column types before any rows are read.
fn check_column_types(encoder: &LiteralEncoder, columns: &[ColumnDescriptor]) -> Result<()> {
    for col in columns {
        if encoder.category(&col.declared_type).is_err() {
            return Err(ExportError::UnsupportedType {
                column: col.name.clone(),
                data_type: col.declared_type.clone(),
            });
        }
    }
    Ok(())
}

/// Health check result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    /// Source connection successful.
    pub source_connected: bool,

    /// Source connection latency in milliseconds.
    pub source_latency_ms: u64,

    /// Source server version.
    pub server_version: Option<String>,

    /// Source error message if connection failed.
    pub source_error: Option<String>,

    /// Overall health status.
    pub healthy: bool,
}

/// Runs exports against the configured MySQL source.
pub struct Exporter {
    config: Config,
}

impl Exporter {
    /// Create an exporter from a validated configuration.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Connect to the source and export one table into `sink`.
    pub async fn run<K>(&self, table: &str, sink: &mut K) -> Result<ExportResult>
    where
        K: ScriptSink + ?Sized,
    {
        validate_identifier(table)?;
        info!("Starting export of table {}", table);
        let source = MysqlSource::connect(&self.config.source).await?;
        export_table(&source, table, &self.config.export, sink).await
    }

    /// Test the source connection.
    pub async fn health_check(&self) -> Result<HealthCheckResult> {
        let start = Instant::now();
        let source = match MysqlSource::connect(&self.config.source).await {
            Ok(source) => source,
            Err(e) => {
                return Ok(HealthCheckResult {
                    source_connected: false,
                    source_latency_ms: start.elapsed().as_millis() as u64,
                    server_version: None,
                    source_error: Some(e.to_string()),
                    healthy: false,
                })
            }
        };

        let version = source.server_version().await;
        let latency = start.elapsed().as_millis() as u64;
        source.close().await;

        Ok(match version {
            Ok(v) => HealthCheckResult {
                source_connected: true,
                source_latency_ms: latency,
                server_version: Some(v),
                source_error: None,
                healthy: true,
            },
            Err(e) => HealthCheckResult {
                source_connected: true,
                source_latency_ms: latency,
                server_version: None,
                source_error: Some(e.to_string()),
                healthy: false,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::{Row, SqlValue};
    use crate::sink::{FileSink, MemorySink};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory table source that counts `close` calls.
    struct StaticSource {
        columns: Vec<ColumnDescriptor>,
        rows: Vec<Row>,
        fail_fetch: bool,
        closed: AtomicUsize,
    }

    impl StaticSource {
        fn new(columns: Vec<ColumnDescriptor>, rows: Vec<Row>) -> Self {
            Self {
                columns,
                rows,
                fail_fetch: false,
                closed: AtomicUsize::new(0),
            }
        }

        fn close_count(&self) -> usize {
            self.closed.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TableSource for StaticSource {
        async fn describe_table(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
            if self.columns.is_empty() {
                return Err(ExportError::TableNotFound(table.to_string()));
            }
            Ok(self.columns.clone())
        }

        async fn fetch_rows(
            &self,
            _table: &str,
            _columns: &[ColumnDescriptor],
            order_by: Option<&str>,
        ) -> Result<Vec<Row>> {
            if self.fail_fetch {
                return Err(ExportError::connection("connection reset", "reading rows"));
            }
            let mut rows = self.rows.clone();
            if let Some(col) = order_by {
                let idx = self.columns.iter().position(|c| c.name == col).unwrap();
                rows.sort_by_key(|r| r[idx].as_i64());
            }
            Ok(rows)
        }

        fn database(&self) -> Option<&str> {
            Some("shop")
        }

        async fn close(&self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn unordered() -> ExportConfig {
        ExportConfig {
            order_by_primary_key: false,
            ..ExportConfig::default()
        }
    }

    fn flags_table() -> StaticSource {
        StaticSource::new(
            vec![
                ColumnDescriptor::primary("id", "int"),
                ColumnDescriptor::new("active", "bit(1)"),
            ],
            vec![
                vec![SqlValue::I64(5), SqlValue::I64(1)],
                vec![SqlValue::I64(6), SqlValue::I64(0)],
            ],
        )
    }

    fn position(lines: &[String], pred: impl Fn(&str) -> bool) -> usize {
        lines
            .iter()
            .position(|l| pred(l))
            .expect("expected line not found")
    }

    #[tokio::test]
    async fn test_end_to_end_statement_order() {
        let source = flags_table();
        let mut sink = MemorySink::new();
        let result = export_table(&source, "flags", &unordered(), &mut sink)
            .await
            .unwrap();

        let lines = &sink.lines;
        let header = position(lines, |l| l.starts_with("--") && l.contains("flags"));
        let drop_seq = position(lines, |l| l.starts_with("DROP SEQUENCE"));
        let drop_default =
            position(lines, |l| l.starts_with("ALTER TABLE") && l.ends_with("DROP DEFAULT;"));
        let insert = position(lines, |l| l.starts_with("INSERT INTO"));
        let set_default = position(lines, |l| l.starts_with("ALTER TABLE") && l.contains("SET DEFAULT"));
        let create_seq = position(lines, |l| l.starts_with("CREATE SEQUENCE"));

        assert!(header < drop_seq);
        assert!(drop_seq < drop_default);
        assert!(drop_default < insert);
        assert_eq!(lines[insert + 1], "    (5, True),");
        assert_eq!(lines[insert + 2], "    (6, False);");
        assert!(insert + 2 < set_default);
        assert!(set_default < create_seq);
        assert_eq!(lines[create_seq], "CREATE SEQUENCE id_seq INCREMENT 1 START 7;");

        assert_eq!(result.rows_exported, 2);
        assert_eq!(result.next_sequence_value, 7);
        assert_eq!(result.primary_key, "id");
        assert_eq!(result.database.as_deref(), Some("shop"));
        assert_eq!(result.output, "memory");
        assert_eq!(source.close_count(), 1);
    }

    #[tokio::test]
    async fn test_rows_ordered_by_primary_key() {
        let source = StaticSource::new(
            vec![
                ColumnDescriptor::primary("id", "int(11)"),
                ColumnDescriptor::new("name", "varchar(10)"),
            ],
            vec![
                vec![SqlValue::I64(3), SqlValue::from("c")],
                vec![SqlValue::I64(1), SqlValue::from("a")],
                vec![SqlValue::I64(2), SqlValue::from("b")],
            ],
        );
        let mut sink = MemorySink::new();
        export_table(&source, "users", &ExportConfig::default(), &mut sink)
            .await
            .unwrap();

        let tuples: Vec<&str> = sink
            .lines
            .iter()
            .map(|l| l.trim())
            .filter(|l| l.starts_with('('))
            .collect();
        assert_eq!(tuples, vec!["(1, 'a'),", "(2, 'b'),", "(3, 'c');"]);
    }

    #[tokio::test]
    async fn test_missing_primary_key_closes_source() {
        let source = StaticSource::new(
            vec![
                ColumnDescriptor::new("name", "varchar(10)"),
                ColumnDescriptor::new("email", "varchar(10)"),
            ],
            vec![],
        );
        let mut sink = MemorySink::new();
        let err = export_table(&source, "people", &unordered(), &mut sink)
            .await
            .unwrap_err();

        assert!(matches!(err, ExportError::NoPrimaryKey(ref t) if t == "people"));
        assert!(sink.lines.is_empty());
        assert_eq!(source.close_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_table_closes_source() {
        let source = StaticSource::new(vec![], vec![]);
        let mut sink = MemorySink::new();
        let err = export_table(&source, "ghost", &unordered(), &mut sink)
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::TableNotFound(_)));
        assert_eq!(source.close_count(), 1);
    }

    #[tokio::test]
    async fn test_unsupported_type_rejected_before_fetch() {
        let mut source = StaticSource::new(
            vec![
                ColumnDescriptor::primary("id", "int(11)"),
                ColumnDescriptor::new("shape", "geometry"),
            ],
            vec![],
        );
        source.fail_fetch = true;
        let mut sink = MemorySink::new();
        let err = export_table(&source, "places", &unordered(), &mut sink)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExportError::UnsupportedType { ref column, .. } if column == "shape"
        ));
        assert_eq!(source.close_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_writes_nothing() {
        let mut source = flags_table();
        source.fail_fetch = true;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flags.sql");
        let mut sink = FileSink::new(&path);

        let err = export_table(&source, "flags", &unordered(), &mut sink)
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Connection { .. }));
        assert!(!path.exists());
        assert_eq!(source.close_count(), 1);
    }

    #[tokio::test]
    async fn test_bad_row_writes_nothing() {
        let source = StaticSource::new(
            vec![
                ColumnDescriptor::primary("id", "int(11)"),
                ColumnDescriptor::new("name", "varchar(10)"),
            ],
            vec![
                vec![SqlValue::I64(1), SqlValue::from("a")],
                vec![SqlValue::I64(2)],
            ],
        );
        let mut sink = MemorySink::new();
        let err = export_table(&source, "users", &unordered(), &mut sink)
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::ColumnCountMismatch { .. }));
        assert!(sink.lines.is_empty());
        assert_eq!(source.close_count(), 1);
    }

    #[tokio::test]
    async fn test_reserved_table_name_needs_quoting() {
        let source = flags_table();
        let mut sink = MemorySink::new();
        let err = export_table(&source, "user", &unordered(), &mut sink)
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Config(ref m) if m.contains("quote_identifiers")));
        assert!(sink.lines.is_empty());
        assert_eq!(source.close_count(), 1);

        let source = flags_table();
        let options = ExportConfig {
            quote_identifiers: true,
            ..unordered()
        };
        export_table(&source, "user", &options, &mut sink)
            .await
            .unwrap();
        assert!(sink
            .contents()
            .contains("ALTER TABLE \"user\" ALTER COLUMN \"id\" DROP DEFAULT;"));
    }

    #[tokio::test]
    async fn test_quoted_identifiers() {
        let source = StaticSource::new(
            vec![
                ColumnDescriptor::primary("Id", "int(11)"),
                ColumnDescriptor::new("Full Name", "varchar(64)"),
            ],
            vec![vec![SqlValue::I64(9), SqlValue::from("Ann O'Neil")]],
        );
        let options = ExportConfig {
            quote_identifiers: true,
            ..unordered()
        };
        let mut sink = MemorySink::new();
        export_table(&source, "People", &options, &mut sink)
            .await
            .unwrap();

        let script = sink.contents();
        assert!(script.contains("INSERT INTO \"People\" (\"Id\", \"Full Name\") VALUES\n"));
        assert!(script.contains("    (9, 'Ann O''Neil');\n"));
        assert!(script.contains("CREATE SEQUENCE \"Id_seq\" INCREMENT 1 START 10;"));
    }

    #[tokio::test]
    async fn test_result_serializes_to_json() {
        let source = flags_table();
        let mut sink = MemorySink::new();
        let result = export_table(&source, "flags", &unordered(), &mut sink)
            .await
            .unwrap();
        let json = result.to_json().unwrap();
        assert!(json.contains("\"rows_exported\": 2"));
        assert!(json.contains("\"next_sequence_value\": 7"));
    }
}
