//! Scalar column types and the compatibility rule.

use core::fmt;
use core::str::FromStr;

use serde::Serialize;

use crate::tree::LiteralKind;

/// A declared or inferred scalar type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SqlType {
    Int,
    Float,
    Text,
}

impl SqlType {
    /// Returns the canonical type name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Int => "INT",
            Self::Float => "FLOAT",
            Self::Text => "TEXT",
        }
    }

    /// Parses a type name, accepting common synonyms in any case.
    ///
    /// `INTEGER` and `NUMBER` map to INT, `REAL` and `DOUBLE` to FLOAT,
    /// `STRING` and `VARCHAR` to TEXT.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "INT" | "INTEGER" | "NUMBER" => Some(Self::Int),
            "FLOAT" | "REAL" | "DOUBLE" => Some(Self::Float),
            "TEXT" | "STRING" | "VARCHAR" => Some(Self::Text),
            _ => None,
        }
    }

    /// Infers the type of a literal from its lexical form.
    ///
    /// String literals are TEXT. Numeric lexemes with a `.` are FLOAT when
    /// they parse as a decimal; other lexemes are INT when they fit an
    /// `i64`. Anything else is unresolvable.
    #[must_use]
    pub fn infer_literal(kind: LiteralKind, lexeme: &str) -> Option<Self> {
        if kind == LiteralKind::String {
            return Some(Self::Text);
        }
        if lexeme.contains('.') {
            lexeme.parse::<f64>().ok().map(|_| Self::Float)
        } else {
            lexeme.parse::<i64>().ok().map(|_| Self::Int)
        }
    }

    /// Returns true for INT and FLOAT.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Float)
    }

    /// Numeric types accept each other in both directions; TEXT only
    /// accepts TEXT.
    #[must_use]
    pub fn is_compatible_with(self, other: Self) -> bool {
        self == other || (self.is_numeric() && other.is_numeric())
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown type name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown data type '{0}'")]
pub struct UnknownType(pub String);

impl FromStr for SqlType {
    type Err = UnknownType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownType(s.to_owned()))
    }
}

/// Compatibility of two possibly unresolved types. An unresolved type on
/// either side is never compatible.
#[must_use]
pub fn compatible(expected: Option<SqlType>, actual: Option<SqlType>) -> bool {
    match (expected, actual) {
        (Some(expected), Some(actual)) => expected.is_compatible_with(actual),
        _ => false,
    }
}
