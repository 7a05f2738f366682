//! PostgreSQL target dialect.
//!
//! - [`PostgresDialect`]: statement syntax for the generated script

mod dialect;

pub use dialect::{PostgresDialect, SEQUENCE_SUFFIX};
