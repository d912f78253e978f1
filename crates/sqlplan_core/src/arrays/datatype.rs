use std::fmt;

use serde::{Deserialize, Serialize};

/// Supported data types.
///
/// Deliberately small; the planner only needs enough of a type system to
/// resolve literals, partition keys, and key coercions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Constant null columns, castable to anything.
    Null,
    Boolean,
    Int16,
    Int32,
    Int64,
    Utf8,
}

impl DataType {
    pub const fn is_null(&self) -> bool {
        matches!(self, DataType::Null)
    }

    /// Equality usable in const contexts.
    pub const fn const_eq(self, other: DataType) -> bool {
        self as u8 == other as u8
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "Null"),
            Self::Boolean => write!(f, "Boolean"),
            Self::Int16 => write!(f, "Int16"),
            Self::Int32 => write!(f, "Int32"),
            Self::Int64 => write!(f, "Int64"),
            Self::Utf8 => write!(f, "Utf8"),
        }
    }
}
