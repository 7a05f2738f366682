//! MySQL → PostgreSQL value translation.
//!
//! - [`literal`]: one value to one PostgreSQL literal, chosen by declared type
//! - [`row`]: one row to one comma-joined value tuple body

pub mod literal;
pub mod row;

pub use literal::{encode, LiteralCategory, LiteralEncoder, LiteralError};
pub use row::{serialize_row, RowSerializer};
