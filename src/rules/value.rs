// SPDX-License-Identifier: MIT

//! Runtime values supplied to the engine
//!
//! A `DataValue` pairs a lookup key with an optional `Value`. The value's
//! `ValueType` is what the evaluator registry dispatches on.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::fmt;
use uuid::Uuid;

/// A runtime value of one of the supported kinds
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    String(String),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    /// A byte
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    Uuid(Uuid),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    DateTimeOffset(DateTime<FixedOffset>),
    /// Arbitrary structured data, compared structurally
    Json(serde_json::Value),
}

/// Type tag of a `Value`, used as the evaluator registry key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueType {
    Bool,
    String,
    Char,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Decimal,
    Uuid,
    Date,
    DateTime,
    DateTimeOffset,
    Json,
}

impl ValueType {
    /// Types with a total order across all six comparison operators
    pub const ORDERED: [ValueType; 15] = [
        Self::Char,
        Self::I8,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::U8,
        Self::U16,
        Self::U32,
        Self::U64,
        Self::F32,
        Self::F64,
        Self::Decimal,
        Self::Date,
        Self::DateTime,
        Self::DateTimeOffset,
    ];
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::String => "string",
            Self::Char => "char",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Decimal => "decimal",
            Self::Uuid => "uuid",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::DateTimeOffset => "datetime_offset",
            Self::Json => "json",
        };
        write!(f, "{}", name)
    }
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Bool(_) => ValueType::Bool,
            Value::String(_) => ValueType::String,
            Value::Char(_) => ValueType::Char,
            Value::I8(_) => ValueType::I8,
            Value::I16(_) => ValueType::I16,
            Value::I32(_) => ValueType::I32,
            Value::I64(_) => ValueType::I64,
            Value::U8(_) => ValueType::U8,
            Value::U16(_) => ValueType::U16,
            Value::U32(_) => ValueType::U32,
            Value::U64(_) => ValueType::U64,
            Value::F32(_) => ValueType::F32,
            Value::F64(_) => ValueType::F64,
            Value::Decimal(_) => ValueType::Decimal,
            Value::Uuid(_) => ValueType::Uuid,
            Value::Date(_) => ValueType::Date,
            Value::DateTime(_) => ValueType::DateTime,
            Value::DateTimeOffset(_) => ValueType::DateTimeOffset,
            Value::Json(_) => ValueType::Json,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "'{}'", v),
            Value::Char(v) => write!(f, "'{}'", v),
            Value::I8(v) => write!(f, "{}", v),
            Value::I16(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::U8(v) => write!(f, "{}", v),
            Value::U16(v) => write!(f, "{}", v),
            Value::U32(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{}", v),
            Value::F32(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::Uuid(v) => write!(f, "{}", v),
            Value::Date(v) => write!(f, "{}", v),
            Value::DateTime(v) => write!(f, "{}", v),
            Value::DateTimeOffset(v) => write!(f, "{}", v.to_rfc3339()),
            Value::Json(v) => write!(f, "{}", v),
        }
    }
}

macro_rules! impl_from_for_value {
    ($($source:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$source> for Value {
                fn from(v: $source) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from_for_value! {
    bool => Bool,
    String => String,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    Decimal => Decimal,
    Uuid => Uuid,
    NaiveDate => Date,
    NaiveDateTime => DateTime,
    DateTime<FixedOffset> => DateTimeOffset,
    serde_json::Value => Json,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

/// A keyed, possibly null, input value
#[derive(Debug, Clone)]
pub struct DataValue {
    key: String,
    value: Option<Value>,
}

impl DataValue {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }

    /// A data value with no underlying value
    pub fn null(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }

    pub fn with_value(key: impl Into<String>, value: Option<Value>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// The type of the underlying value, `None` when it is null
    pub fn value_type(&self) -> Option<ValueType> {
        self.value.as_ref().map(Value::value_type)
    }
}

/// Equality looks at the underlying values only, never at the keys
impl PartialEq for DataValue {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(v) => write!(f, "{}={}", self.key, v),
            None => write!(f, "{}=null", self.key),
        }
    }
}

/// Find the first data value registered under `key`
pub fn find_value<'a>(values: &'a [DataValue], key: &str) -> Option<&'a DataValue> {
    values.iter().find(|v| v.key() == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_type_derived_from_value() {
        assert_eq!(DataValue::new("Age", 15).value_type(), Some(ValueType::I32));
        assert_eq!(DataValue::new("Name", "Kimmy").value_type(), Some(ValueType::String));
        assert_eq!(DataValue::new("Byte", 7u8).value_type(), Some(ValueType::U8));
        assert_eq!(
            DataValue::new("Meta", json!({"a": 1})).value_type(),
            Some(ValueType::Json)
        );
        assert_eq!(DataValue::null("Missing").value_type(), None);
    }

    #[test]
    fn test_equality_ignores_keys() {
        assert_eq!(DataValue::new("a", 1), DataValue::new("b", 1));
        assert_ne!(DataValue::new("a", 1), DataValue::new("a", 2));
        assert_eq!(DataValue::null("a"), DataValue::null("b"));
        assert_ne!(DataValue::null("a"), DataValue::new("a", 1));
    }

    #[test]
    fn test_equality_distinguishes_types() {
        assert_ne!(DataValue::new("a", 1i32), DataValue::new("a", 1i64));
        assert_ne!(DataValue::new("a", 1), DataValue::new("a", "1"));
    }

    #[test]
    fn test_find_value_returns_first_match() {
        let values = vec![
            DataValue::new("Name", "John"),
            DataValue::new("Age", 20),
            DataValue::new("Name", "Shadowed"),
        ];

        let found = find_value(&values, "Name").unwrap();
        assert_eq!(found.value(), Some(&Value::from("John")));
        assert!(find_value(&values, "Height").is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(DataValue::new("Name", "Kimmy").to_string(), "Name='Kimmy'");
        assert_eq!(DataValue::new("Age", 15).to_string(), "Age=15");
        assert_eq!(DataValue::null("Age").to_string(), "Age=null");
    }

    #[test]
    fn test_ordered_types_exclude_equality_only_kinds() {
        for ty in [ValueType::Bool, ValueType::String, ValueType::Uuid, ValueType::Json] {
            assert!(!ValueType::ORDERED.contains(&ty), "{ty} should not be ordered");
        }
    }
}
