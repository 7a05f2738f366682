//! MySQL/MariaDB source driver.
//!
//! - [`MysqlSource`]: reads one table's schema and rows
//!
//! # Supported Versions
//!
//! - MySQL 5.7+, 8.0+
//! - MariaDB 10.2+
//!
//! Connection parameters come from [`SourceConfig`](crate::config::SourceConfig)
//! and are passed to SQLx's MySQL driver.

mod reader;

pub use reader::MysqlSource;
