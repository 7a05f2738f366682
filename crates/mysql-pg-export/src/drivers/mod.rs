//! Database driver implementations.
//!
//! - [`mysql`]: MySQL/MariaDB source reader
//! - [`postgres`]: PostgreSQL statement syntax for the generated script

pub mod mysql;
pub mod postgres;

pub use mysql::MysqlSource;
pub use postgres::PostgresDialect;
