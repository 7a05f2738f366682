//! MySQL value → PostgreSQL literal encoding.
//!
//! The declared MySQL column type (as reported by `DESCRIBE`, e.g. `int(11)`,
//! `varchar(255)`, `bit(1)`) selects a literal category by substring match.
//! The first matching rule wins:
//!
//! | Declared type contains | Literal                    |
//! |------------------------|----------------------------|
//! | `int`                  | `42`                       |
//! | `varchar`              | `'text'` / `E'te\\xt'`     |
//! | `datetime`             | `'2022-06-18 10:53:00'`    |
//! | `bool`                 | `True` / `False`           |
//! | equals `bit(1)`        | `True` / `False`           |
//!
//! With extended types enabled, text, exact/approximate numeric, timestamp,
//! date and time columns are accepted as well. Anything else is rejected.
//! NULL encodes as `NULL` in every accepted category.

use thiserror::Error;

use crate::core::value::SqlValue;

/// Timestamp literal layout.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Why a single value could not be encoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LiteralError {
    /// The declared type matches no literal category.
    #[error("unsupported type '{0}'")]
    UnsupportedType(String),

    /// The value does not fit the category selected by the declared type.
    #[error("expected {expected} value, got {found}")]
    InvalidValue {
        expected: &'static str,
        found: String,
    },

    /// PostgreSQL text cannot hold NUL characters.
    #[error("text contains a NUL character")]
    NulCharacter,
}

/// Literal category selected by a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralCategory {
    Integer,
    String,
    Timestamp,
    Boolean,
    Bit,
    Numeric,
    Date,
    Time,
}

impl LiteralCategory {
    /// Classify a declared type. Returns `None` for unsupported types.
    pub fn classify(declared_type: &str, extended: bool) -> Option<Self> {
        let t = declared_type.trim().to_lowercase();

        if t.contains("int") {
            return Some(LiteralCategory::Integer);
        }
        if t.contains("varchar") {
            return Some(LiteralCategory::String);
        }
        if t.contains("datetime") {
            return Some(LiteralCategory::Timestamp);
        }
        if t.contains("bool") {
            return Some(LiteralCategory::Boolean);
        }
        if t == "bit(1)" {
            return Some(LiteralCategory::Bit);
        }
        if !extended {
            return None;
        }

        if t.contains("char")
            || t.contains("text")
            || t.contains("json")
            || t.starts_with("enum")
            || t.starts_with("set")
        {
            Some(LiteralCategory::String)
        } else if t.contains("decimal")
            || t.contains("numeric")
            || t.contains("float")
            || t.contains("double")
            || t.contains("real")
        {
            Some(LiteralCategory::Numeric)
        } else if t.contains("timestamp") {
            Some(LiteralCategory::Timestamp)
        } else if t.contains("year") {
            Some(LiteralCategory::Integer)
        } else if t.contains("date") {
            Some(LiteralCategory::Date)
        } else if t.contains("time") {
            Some(LiteralCategory::Time)
        } else {
            None
        }
    }

    fn expected(self) -> &'static str {
        match self {
            LiteralCategory::Integer => "integer",
            LiteralCategory::String => "text",
            LiteralCategory::Timestamp => "datetime",
            LiteralCategory::Boolean => "boolean",
            LiteralCategory::Bit => "bit",
            LiteralCategory::Numeric => "numeric",
            LiteralCategory::Date => "date",
            LiteralCategory::Time => "time",
        }
    }
}

/// Encodes source values as PostgreSQL literals.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralEncoder {
    extended_types: bool,
}

impl LiteralEncoder {
    /// Encoder accepting only the core type set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoder accepting the extended type set as well.
    pub fn with_extended_types(mut self, extended: bool) -> Self {
        self.extended_types = extended;
        self
    }

    /// Classify a declared type against this encoder's type set.
    pub fn category(&self, declared_type: &str) -> Result<LiteralCategory, LiteralError> {
        LiteralCategory::classify(declared_type, self.extended_types)
            .ok_or_else(|| LiteralError::UnsupportedType(declared_type.to_string()))
    }

    /// Encode one value of a column with the given declared type.
    pub fn encode(&self, value: &SqlValue, declared_type: &str) -> Result<String, LiteralError> {
        let category = self.category(declared_type)?;
        encode_as(value, category)
    }
}

/// Encode a value with the core type set.
pub fn encode(value: &SqlValue, declared_type: &str) -> Result<String, LiteralError> {
    LiteralEncoder::new().encode(value, declared_type)
}

fn encode_as(value: &SqlValue, category: LiteralCategory) -> Result<String, LiteralError> {
    if value.is_null() {
        return Ok("NULL".to_string());
    }

    let invalid = || LiteralError::InvalidValue {
        expected: category.expected(),
        found: value.kind().to_string(),
    };

    match category {
        LiteralCategory::Integer => match value {
            SqlValue::I64(v) => Ok(v.to_string()),
            SqlValue::U64(v) => Ok(v.to_string()),
            SqlValue::Bool(b) => Ok(if *b { "1" } else { "0" }.to_string()),
            _ => Err(invalid()),
        },
        LiteralCategory::String => match value {
            SqlValue::Text(s) => string_literal(s),
            SqlValue::Bytes(b) => std::str::from_utf8(b)
                .map_err(|_| invalid())
                .and_then(string_literal),
            _ => Err(invalid()),
        },
        LiteralCategory::Timestamp => match value {
            SqlValue::DateTime(dt) => Ok(format!("'{}'", dt.format(TIMESTAMP_FORMAT))),
            _ => Err(invalid()),
        },
        LiteralCategory::Boolean => {
            let b = match value {
                SqlValue::Bool(b) => *b,
                SqlValue::I64(v) => *v != 0,
                SqlValue::U64(v) => *v != 0,
                SqlValue::Text(s) => match s.trim().to_lowercase().as_str() {
                    "true" | "t" | "1" => true,
                    "false" | "f" | "0" => false,
                    _ => return Err(invalid()),
                },
                _ => return Err(invalid()),
            };
            Ok(bool_literal(b))
        }
        LiteralCategory::Bit => {
            let set = match value {
                SqlValue::Bool(b) => *b,
                SqlValue::I64(v) => *v == 1,
                SqlValue::U64(v) => *v == 1,
                SqlValue::Bytes(b) => b.as_slice() == [1u8],
                _ => false,
            };
            Ok(bool_literal(set))
        }
        LiteralCategory::Numeric => match value {
            SqlValue::I64(v) => Ok(v.to_string()),
            SqlValue::U64(v) => Ok(v.to_string()),
            SqlValue::Decimal(d) => Ok(d.to_string()),
            SqlValue::F64(f) if f.is_finite() => Ok(f.to_string()),
            _ => Err(invalid()),
        },
        LiteralCategory::Date => match value {
            SqlValue::Date(d) => Ok(format!("'{}'", d.format(DATE_FORMAT))),
            _ => Err(invalid()),
        },
        LiteralCategory::Time => match value {
            SqlValue::Time(t) => Ok(format!("'{}'", t.format(TIME_FORMAT))),
            _ => Err(invalid()),
        },
    }
}

fn bool_literal(b: bool) -> String {
    let literal = if b { "True" } else { "False" };
    literal.to_string()
}

/// Quote text as a PostgreSQL string literal.
///
/// Single quotes are doubled. Text containing backslashes uses the `E'...'`
/// escape-string form so the result is the same under any
/// `standard_conforming_strings` setting.
pub fn string_literal(s: &str) -> Result<String, LiteralError> {
    if s.contains('\0') {
        return Err(LiteralError::NulCharacter);
    }
    let escaped = s.replace('\'', "''");
    if escaped.contains('\\') {
        Ok(format!("E'{}'", escaped.replace('\\', "\\\\")))
    } else {
        Ok(format!("'{}'", escaped))
    }
}
