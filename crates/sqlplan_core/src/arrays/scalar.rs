use std::fmt;

use serde::{Deserialize, Serialize};
use sqlplan_error::{DbError, Result};

use super::datatype::DataType;

/// A single scalar value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarValue {
    /// Represents `DataType::Null` (castable to/from any other type).
    Null,
    Boolean(bool),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Utf8(String),
}

impl ScalarValue {
    pub fn datatype(&self) -> DataType {
        match self {
            ScalarValue::Null => DataType::Null,
            ScalarValue::Boolean(_) => DataType::Boolean,
            ScalarValue::Int16(_) => DataType::Int16,
            ScalarValue::Int32(_) => DataType::Int32,
            ScalarValue::Int64(_) => DataType::Int64,
            ScalarValue::Utf8(_) => DataType::Utf8,
        }
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    /// Convert this value to `to`.
    ///
    /// Covers the lossless conversions implicit casts allow. Null converts
    /// to any type and stays null.
    pub fn cast_to(self, to: DataType) -> Result<ScalarValue> {
        if self.datatype() == to {
            return Ok(self);
        }

        Ok(match (self, to) {
            (ScalarValue::Null, _) => ScalarValue::Null,
            (ScalarValue::Int16(v), DataType::Int32) => ScalarValue::Int32(v as i32),
            (ScalarValue::Int16(v), DataType::Int64) => ScalarValue::Int64(v as i64),
            (ScalarValue::Int32(v), DataType::Int64) => ScalarValue::Int64(v as i64),
            (value, to) => {
                return Err(DbError::new(format!(
                    "Cannot cast value of type {} to {to}",
                    value.datatype()
                )))
            }
        })
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Utf8(v) => write!(f, "'{v}'"),
        }
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        ScalarValue::Boolean(value)
    }
}

impl From<i16> for ScalarValue {
    fn from(value: i16) -> Self {
        ScalarValue::Int16(value)
    }
}

impl From<i32> for ScalarValue {
    fn from(value: i32) -> Self {
        ScalarValue::Int32(value)
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Int64(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::Utf8(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cast_widens_integers() {
        assert_eq!(
            ScalarValue::Int64(7),
            ScalarValue::Int16(7).cast_to(DataType::Int64).unwrap()
        );
        assert_eq!(
            ScalarValue::Int64(7),
            ScalarValue::Int32(7).cast_to(DataType::Int64).unwrap()
        );
    }

    #[test]
    fn cast_null_stays_null() {
        assert_eq!(
            ScalarValue::Null,
            ScalarValue::Null.cast_to(DataType::Utf8).unwrap()
        );
    }

    #[test]
    fn cast_rejects_narrowing() {
        assert!(ScalarValue::Int64(7).cast_to(DataType::Int16).is_err());
        assert!(ScalarValue::Utf8("x".to_string())
            .cast_to(DataType::Boolean)
            .is_err());
    }
}
