//! Runtime value model shared by expressions, parameters, and result rows.

use crate::error::{Error, Result};
use core::fmt;

/// Semantic type of a field or expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Int,
    Float,
    Text,
    Bool,
}

impl ValueType {
    /// Whether a value of this type can be compared against one of `other`.
    ///
    /// Numeric types compare freely with each other; everything else only
    /// with itself.
    pub fn comparable_with(self, other: ValueType) -> bool {
        self == other || (self.is_numeric() && other.is_numeric())
    }

    /// Whether `<`/`>` style ordering applies to this type.
    pub fn is_orderable(self) -> bool {
        matches!(self, ValueType::Int | ValueType::Float | ValueType::Text)
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, ValueType::Int | ValueType::Float)
    }

    /// Whether a value of type `source` can be assigned into a slot of this
    /// type. Allows widening Int into Float, nothing else.
    pub fn assignable_from(self, source: ValueType) -> bool {
        self == source || (self == ValueType::Float && source == ValueType::Int)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Int => "Int",
            ValueType::Float => "Float",
            ValueType::Text => "Text",
            ValueType::Bool => "Bool",
        };
        f.write_str(name)
    }
}

/// A runtime value: expression literal, bound parameter, or row cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl Value {
    /// The semantic type of this value, `None` for `Null`.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Value::Null => None,
            Value::Int(_) => Some(ValueType::Int),
            Value::Float(_) => Some(ValueType::Float),
            Value::Text(_) => Some(ValueType::Text),
            Value::Bool(_) => Some(ValueType::Bool),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Integer extraction for shape construction.
    pub fn as_int(&self) -> Result<i64> {
        match self {
            Value::Int(v) => Ok(*v),
            Value::Bool(v) => Ok(i64::from(*v)),
            other => Err(Error::ProjectionType(format!("expected Int, got {other:?}"))),
        }
    }

    /// Float extraction; integers widen.
    pub fn as_float(&self) -> Result<f64> {
        match self {
            Value::Float(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            other => Err(Error::ProjectionType(format!(
                "expected Float, got {other:?}"
            ))),
        }
    }

    pub fn as_text(&self) -> Result<&str> {
        match self {
            Value::Text(v) => Ok(v),
            other => Err(Error::ProjectionType(format!("expected Text, got {other:?}"))),
        }
    }

    /// Boolean extraction; integer 0/1 is accepted since stores without a
    /// native boolean type return integers.
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(v) => Ok(*v),
            Value::Int(0) => Ok(false),
            Value::Int(1) => Ok(true),
            other => Err(Error::ProjectionType(format!("expected Bool, got {other:?}"))),
        }
    }

    /// Optional integer: `Null` maps to `None`.
    pub fn as_int_opt(&self) -> Result<Option<i64>> {
        match self {
            Value::Null => Ok(None),
            other => other.as_int().map(Some),
        }
    }

    /// Optional text: `Null` maps to `None`.
    pub fn as_text_opt(&self) -> Result<Option<String>> {
        match self {
            Value::Null => Ok(None),
            other => other.as_text().map(|text| Some(text.to_owned())),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}


#[cfg(feature = "rusqlite")]
impl rusqlite::types::ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        use rusqlite::types::{ToSqlOutput, Value as SqlValue, ValueRef};
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Int(v) => ToSqlOutput::Owned(SqlValue::Integer(*v)),
            Value::Float(v) => ToSqlOutput::Owned(SqlValue::Real(*v)),
            Value::Text(v) => ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())),
            Value::Bool(v) => ToSqlOutput::Owned(SqlValue::Integer(i64::from(*v))),
        })
    }
}

#[cfg(feature = "rusqlite")]
impl TryFrom<rusqlite::types::ValueRef<'_>> for Value {
    type Error = Error;

    fn try_from(value: rusqlite::types::ValueRef<'_>) -> Result<Self> {
        use rusqlite::types::ValueRef;
        match value {
            ValueRef::Null => Ok(Value::Null),
            ValueRef::Integer(v) => Ok(Value::Int(v)),
            ValueRef::Real(v) => Ok(Value::Float(v)),
            ValueRef::Text(bytes) => String::from_utf8(bytes.to_vec())
                .map(Value::Text)
                .map_err(|e| Error::Mapping(format!("invalid utf-8 in text column: {e}"))),
            ValueRef::Blob(_) => Err(Error::Mapping(
                "BLOB columns have no counterpart in the value model".into(),
            )),
        }
    }
}
