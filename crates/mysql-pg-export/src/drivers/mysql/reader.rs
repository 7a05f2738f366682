//! MySQL/MariaDB source reader implementation.
//!
//! Implements the `TableSource` trait for reading one table from MySQL/MariaDB.
//! Uses SQLx for the connection and query execution.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::{Row, ValueRef};
use tracing::{debug, info};

use crate::config::SourceConfig;
use crate::core::identifier::{qualify_mysql, quote_mysql};
use crate::core::schema::{ColumnDescriptor, KeyRole};
use crate::core::traits::TableSource;
use crate::core::value::{Row as SqlRow, SqlValue};
use crate::error::{ExportError, Result};

/// Connection pool timeout.
const POOL_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// MySQL/MariaDB source reader implementation.
pub struct MysqlSource {
    pool: MySqlPool,
    database: String,
}

impl MysqlSource {
    /// Connect to the source database.
    ///
    /// An export runs strictly sequentially, so the pool holds a single connection.
    pub async fn connect(config: &SourceConfig) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(POOL_CONNECTION_TIMEOUT)
            .connect_with(config.connect_options())
            .await
            .map_err(|e| ExportError::connection(e, "creating MySQL source pool"))?;

        sqlx::query("SELECT 1")
            .fetch_one(&pool)
            .await
            .map_err(|e| ExportError::connection(e, "testing MySQL source connection"))?;

        info!(
            "Connected to MySQL source: {}:{}/{}",
            config.host, config.port, config.database
        );

        Ok(Self {
            pool,
            database: config.database.clone(),
        })
    }

    /// Server version string (e.g. `8.0.36`, `10.11.6-MariaDB`).
    pub async fn server_version(&self) -> Result<String> {
        let row: MySqlRow = sqlx::query("SELECT CAST(VERSION() AS CHAR(255)) AS version")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ExportError::connection(e, "reading MySQL server version"))?;
        Ok(row.try_get("version")?)
    }

    /// Convert a MySQL row to values aligned with `columns`.
    fn row_to_values(row: &MySqlRow, columns: &[ColumnDescriptor]) -> Result<SqlRow> {
        columns
            .iter()
            .enumerate()
            .map(|(i, col)| Self::decode_value(row, i, col))
            .collect()
    }

    /// Decode one column value according to its declared type.
    fn decode_value(row: &MySqlRow, idx: usize, col: &ColumnDescriptor) -> Result<SqlValue> {
        if row.try_get_raw(idx)?.is_null() {
            return Ok(SqlValue::Null);
        }

        let declared = col.declared_type.to_lowercase();
        let unsigned = declared.contains("unsigned");
        let decode_err = |e: sqlx::Error| {
            ExportError::value_format(
                &col.name,
                format!("cannot decode {}: {}", col.declared_type, e),
            )
        };

        let value = match base_type(&declared) {
            "tinyint" | "smallint" | "mediumint" | "int" | "integer" | "bigint" | "year" => {
                if unsigned {
                    row.try_get::<u64, _>(idx).map(SqlValue::U64)
                } else {
                    row.try_get::<i64, _>(idx)
                        .map(SqlValue::I64)
                        .or_else(|_| row.try_get::<bool, _>(idx).map(|b| SqlValue::I64(b as i64)))
                }
            }

            "bit" => row
                .try_get::<bool, _>(idx)
                .map(SqlValue::Bool)
                .or_else(|_| row.try_get::<u64, _>(idx).map(SqlValue::U64))
                .or_else(|_| row.try_get::<Vec<u8>, _>(idx).map(SqlValue::Bytes)),

            "bool" | "boolean" => row.try_get::<bool, _>(idx).map(SqlValue::Bool),

            "float" | "double" | "real" => row
                .try_get::<f64, _>(idx)
                .or_else(|_| row.try_get::<f32, _>(idx).map(f64::from))
                .map(SqlValue::F64),

            "decimal" | "numeric" => row.try_get::<Decimal, _>(idx).map(SqlValue::Decimal),

            "char" | "varchar" | "text" | "tinytext" | "mediumtext" | "longtext" | "enum"
            | "set" | "json" => row.try_get::<String, _>(idx).map(SqlValue::Text),

            "binary" | "varbinary" | "blob" | "tinyblob" | "mediumblob" | "longblob" => {
                row.try_get::<Vec<u8>, _>(idx).map(SqlValue::Bytes)
            }

            "date" => row.try_get::<NaiveDate, _>(idx).map(SqlValue::Date),
            "time" => row.try_get::<NaiveTime, _>(idx).map(SqlValue::Time),
            "datetime" | "timestamp" => row
                .try_get::<NaiveDateTime, _>(idx)
                .map(SqlValue::DateTime),

            // Spatial and vendor types: keep the raw representation; the
            // literal encoder decides whether the declared type is exportable.
            _ => row
                .try_get::<String, _>(idx)
                .map(SqlValue::Text)
                .or_else(|_| row.try_get::<Vec<u8>, _>(idx).map(SqlValue::Bytes)),
        };

        value.map_err(decode_err)
    }
}

/// Base type name of a declared type: `int(11) unsigned` → `int`.
fn base_type(declared: &str) -> &str {
    declared
        .split(|c: char| c == '(' || c.is_whitespace())
        .next()
        .unwrap_or(declared)
}

#[async_trait]
impl TableSource for MysqlSource {
    async fn describe_table(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        // CAST to CHAR to handle collation differences where information_schema
        // may return VARBINARY instead of VARCHAR
        let query = r#"
            SELECT
                CAST(COLUMN_NAME AS CHAR(255)) AS COLUMN_NAME,
                CAST(COLUMN_TYPE AS CHAR(255)) AS COLUMN_TYPE,
                CAST(COLUMN_KEY AS CHAR(3)) AS COLUMN_KEY,
                CAST(IF(IS_NULLABLE = 'YES', 1, 0) AS SIGNED) AS is_nullable,
                CAST(EXTRA AS CHAR(255)) AS EXTRA
            FROM INFORMATION_SCHEMA.COLUMNS
            WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
            ORDER BY ORDINAL_POSITION
        "#;

        let rows: Vec<MySqlRow> = sqlx::query(query)
            .bind(&self.database)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ExportError::connection(e, "describing MySQL table"))?;

        if rows.is_empty() {
            return Err(ExportError::TableNotFound(format!(
                "{}.{}",
                self.database, table
            )));
        }

        let mut columns = Vec::with_capacity(rows.len());
        for row in rows {
            let key: String = row.try_get("COLUMN_KEY")?;
            columns.push(ColumnDescriptor {
                name: row.try_get("COLUMN_NAME")?,
                declared_type: row.try_get("COLUMN_TYPE")?,
                key_role: KeyRole::from_mysql(&key),
                is_nullable: row.try_get::<i64, _>("is_nullable")? == 1,
                extra: row.try_get("EXTRA")?,
            });
        }

        debug!(
            "Described {}.{}: {} columns",
            self.database,
            table,
            columns.len()
        );
        Ok(columns)
    }

    async fn fetch_rows(
        &self,
        table: &str,
        columns: &[ColumnDescriptor],
        order_by: Option<&str>,
    ) -> Result<Vec<SqlRow>> {
        let col_list = columns
            .iter()
            .map(|c| quote_mysql(&c.name))
            .collect::<Result<Vec<_>>>()?
            .join(", ");

        let mut query = format!(
            "SELECT {} FROM {}",
            col_list,
            qualify_mysql(&self.database, table)?
        );
        if let Some(col) = order_by {
            query.push_str(&format!(" ORDER BY {}", quote_mysql(col)?));
        }

        debug!("Fetching rows: {}", query);

        let rows: Vec<MySqlRow> = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ExportError::connection(e, "reading MySQL rows"))?;

        rows.iter()
            .map(|row| Self::row_to_values(row, columns))
            .collect()
    }

    fn database(&self) -> Option<&str> {
        Some(&self.database)
    }

    async fn close(&self) {
        self.pool.close().await;
        debug!("Closed MySQL source connection");
    }
}
