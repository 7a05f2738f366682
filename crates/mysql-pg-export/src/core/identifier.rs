//! Identifier validation and quoting.
//!
//! Table and column names are interpolated into both the MySQL queries that
//! read the source and the PostgreSQL script that is produced. Identifiers
//! cannot be bound as parameters, so every name is validated and then either
//! quoted or checked to be safe as a bare word.

use crate::error::{ExportError, Result};

/// Maximum identifier length (conservative limit across databases).
/// - PostgreSQL: 63 bytes
/// - MySQL: 64 characters
const MAX_IDENTIFIER_LENGTH: usize = 128;

/// PostgreSQL keywords that cannot be used as bare table or column names,
/// including those reserved except as function or type names. Sorted.
const PG_RESERVED_KEYWORDS: &[&str] = &[
    "all",
    "analyse",
    "analyze",
    "and",
    "any",
    "array",
    "as",
    "asc",
    "asymmetric",
    "authorization",
    "binary",
    "both",
    "case",
    "cast",
    "check",
    "collate",
    "collation",
    "column",
    "concurrently",
    "constraint",
    "create",
    "cross",
    "current_catalog",
    "current_date",
    "current_role",
    "current_schema",
    "current_time",
    "current_timestamp",
    "current_user",
    "default",
    "deferrable",
    "desc",
    "distinct",
    "do",
    "else",
    "end",
    "except",
    "false",
    "fetch",
    "for",
    "foreign",
    "freeze",
    "from",
    "full",
    "grant",
    "group",
    "having",
    "ilike",
    "in",
    "initially",
    "inner",
    "intersect",
    "into",
    "is",
    "isnull",
    "join",
    "lateral",
    "leading",
    "left",
    "like",
    "limit",
    "localtime",
    "localtimestamp",
    "natural",
    "not",
    "notnull",
    "null",
    "offset",
    "on",
    "only",
    "or",
    "order",
    "outer",
    "overlaps",
    "placing",
    "primary",
    "references",
    "returning",
    "right",
    "select",
    "session_user",
    "similar",
    "some",
    "symmetric",
    "system_user",
    "table",
    "tablesample",
    "then",
    "to",
    "trailing",
    "true",
    "union",
    "unique",
    "user",
    "using",
    "variadic",
    "verbose",
    "when",
    "where",
    "window",
    "with",
];

/// Validate an identifier for security issues.
///
/// Rejects:
/// - Empty identifiers
/// - Identifiers containing null bytes (injection vector)
/// - Identifiers exceeding maximum length
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ExportError::Config("Identifier cannot be empty".to_string()));
    }

    if name.contains('\0') {
        return Err(ExportError::Config(format!(
            "SECURITY: Identifier contains null byte (possible injection attempt): {:?}",
            name
        )));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ExportError::Config(format!(
            "SECURITY: Identifier exceeds maximum length of {} bytes (got {} bytes): {:?}",
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        )));
    }

    Ok(())
}

/// Check whether a name is a reserved PostgreSQL keyword (case-insensitive).
pub fn is_reserved_keyword(name: &str) -> bool {
    PG_RESERVED_KEYWORDS
        .binary_search(&name.to_ascii_lowercase().as_str())
        .is_ok()
}

/// Check whether a name can appear unquoted in PostgreSQL.
///
/// Letters, digits, `_` and `$`, not starting with a digit or `$`, and not a
/// reserved keyword.
pub fn is_bare_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        && !is_reserved_keyword(name)
}

/// Quote a PostgreSQL identifier.
///
/// Escapes double quotes by doubling them and wraps in double quotes.
pub fn quote_pg(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// Render a PostgreSQL identifier, quoted or bare.
///
/// Bare rendering refuses names PostgreSQL would not parse as a single word,
/// reserved keywords included.
pub fn render_pg(name: &str, quote: bool) -> Result<String> {
    if quote {
        return quote_pg(name);
    }
    validate_identifier(name)?;
    if !is_bare_identifier(name) {
        return Err(ExportError::Config(format!(
            "Identifier {:?} cannot be used unquoted; set export.quote_identifiers: true",
            name
        )));
    }
    Ok(name.to_string())
}

/// Quote a MySQL identifier using backticks.
///
/// Escapes backticks by doubling them and wraps in backticks.
pub fn quote_mysql(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(format!("`{}`", name.replace('`', "``")))
}

/// Qualify a MySQL table name with its database.
pub fn qualify_mysql(database: &str, table: &str) -> Result<String> {
    Ok(format!("{}.{}", quote_mysql(database)?, quote_mysql(table)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_identifier_normal() {
        assert!(validate_identifier("users").is_ok());
        assert!(validate_identifier("my_table").is_ok());
        assert!(validate_identifier("Table123").is_ok());
    }

    #[test]
    fn test_validate_identifier_rejects_empty() {
        assert!(validate_identifier("").is_err());
    }

    #[test]
    fn test_validate_identifier_rejects_null_byte() {
        let err = validate_identifier("users\0; DROP TABLE x").unwrap_err();
        assert!(err.to_string().contains("null byte"));
    }

    #[test]
    fn test_validate_identifier_rejects_too_long() {
        let name = "a".repeat(MAX_IDENTIFIER_LENGTH + 1);
        assert!(validate_identifier(&name).is_err());
        assert!(validate_identifier(&"a".repeat(MAX_IDENTIFIER_LENGTH)).is_ok());
    }

    #[test]
    fn test_is_bare_identifier() {
        assert!(is_bare_identifier("users"));
        assert!(is_bare_identifier("_tmp$1"));
        assert!(!is_bare_identifier("1users"));
        assert!(!is_bare_identifier("user name"));
        assert!(!is_bare_identifier("a\"b"));
    }

    #[test]
    fn test_reserved_keywords_sorted() {
        let mut sorted = PG_RESERVED_KEYWORDS.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted, PG_RESERVED_KEYWORDS);
    }

    #[test]
    fn test_reserved_keywords_are_not_bare() {
        for name in ["user", "order", "group", "table", "USER", "Order"] {
            assert!(is_reserved_keyword(name), "{name}");
            assert!(!is_bare_identifier(name), "{name}");
        }
        assert!(!is_reserved_keyword("users"));
        assert!(!is_reserved_keyword("user_id"));
        assert!(is_bare_identifier("orders"));
    }

    #[test]
    fn test_quote_pg_escapes_double_quote() {
        assert_eq!(quote_pg("users").unwrap(), "\"users\"");
        assert_eq!(quote_pg("table\"name").unwrap(), "\"table\"\"name\"");
    }

    #[test]
    fn test_render_pg() {
        assert_eq!(render_pg("users", false).unwrap(), "users");
        assert_eq!(render_pg("users", true).unwrap(), "\"users\"");
        assert!(render_pg("order items", false).is_err());
        assert_eq!(render_pg("order items", true).unwrap(), "\"order items\"");
    }

    #[test]
    fn test_render_pg_reserved_keyword() {
        let err = render_pg("user", false).unwrap_err();
        assert!(err.to_string().contains("quote_identifiers"));
        assert_eq!(render_pg("user", true).unwrap(), "\"user\"");
    }

    #[test]
    fn test_quote_mysql_escapes_backtick() {
        assert_eq!(quote_mysql("users").unwrap(), "`users`");
        assert_eq!(quote_mysql("table`name").unwrap(), "`table``name`");
    }

    #[test]
    fn test_quote_mysql_sql_injection_safely_quoted() {
        let quoted = quote_mysql("users`; DROP TABLE users; --").unwrap();
        assert_eq!(quoted, "`users``; DROP TABLE users; --`");
    }

    #[test]
    fn test_qualify_mysql() {
        assert_eq!(qualify_mysql("shop", "users").unwrap(), "`shop`.`users`");
        assert!(qualify_mysql("", "users").is_err());
    }
}
