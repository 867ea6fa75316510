//! Bound parameter and column values.

use crate::error::{Error, Result};

/// A single SQL value, used both for bound parameters and decoded columns.
///
/// Text-protocol result sets deliver every non-NULL column as [`Value::Bytes`];
/// binary-protocol result sets deliver typed variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    UInt(u64),
    Double(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Trait for decoding a [`Value`] into a Rust type.
pub trait FromValue: Sized {
    /// Decode from NULL.
    ///
    /// Default implementation returns an error. Override for types that can
    /// represent NULL (like `Option<T>`).
    fn from_null() -> Result<Self> {
        Err(Error::Decode("unexpected NULL value".into()))
    }

    /// Decode from a non-NULL value.
    fn from_value(value: Value) -> Result<Self>;

    /// Dispatch on NULL.
    fn decode(value: Value) -> Result<Self> {
        match value {
            Value::Null => Self::from_null(),
            value => Self::from_value(value),
        }
    }
}

/// Validate text-protocol bytes as UTF-8.
fn utf8(bytes: &[u8]) -> Result<&str> {
    simdutf8::basic::from_utf8(bytes).map_err(|e| Error::Decode(format!("invalid UTF-8: {}", e)))
}

fn mismatch(expected: &str, value: &Value) -> Error {
    Error::Decode(format!("cannot decode {:?} as {}", value, expected))
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_null() -> Result<Self> {
        Ok(None)
    }

    fn from_value(value: Value) -> Result<Self> {
        T::from_value(value).map(Some)
    }
}

impl FromValue for Value {
    fn from_null() -> Result<Self> {
        Ok(Value::Null)
    }

    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

// === Integer types ===

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Int(v) => Ok(v),
            Value::UInt(v) => {
                i64::try_from(v).map_err(|e| Error::Decode(format!("invalid i64: {}", e)))
            }
            Value::Bytes(ref bytes) => utf8(bytes)?
                .parse()
                .map_err(|e| Error::Decode(format!("invalid i64: {}", e))),
            other => Err(mismatch("i64", &other)),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> Result<Self> {
        let v = i64::from_value(value)?;
        i32::try_from(v).map_err(|e| Error::Decode(format!("invalid i32: {}", e)))
    }
}

impl FromValue for u64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::UInt(v) => Ok(v),
            Value::Int(v) => {
                u64::try_from(v).map_err(|e| Error::Decode(format!("invalid u64: {}", e)))
            }
            Value::Bytes(ref bytes) => utf8(bytes)?
                .parse()
                .map_err(|e| Error::Decode(format!("invalid u64: {}", e))),
            other => Err(mismatch("u64", &other)),
        }
    }
}

// === Floating point ===

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Double(v) => Ok(v),
            Value::Bytes(ref bytes) => utf8(bytes)?
                .parse()
                .map_err(|e| Error::Decode(format!("invalid f64: {}", e))),
            other => Err(mismatch("f64", &other)),
        }
    }
}

// === String and bytes ===

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Text(s) => Ok(s),
            Value::Bytes(ref bytes) => utf8(bytes).map(str::to_owned),
            other => Err(mismatch("String", &other)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bytes(bytes) => Ok(bytes),
            Value::Text(s) => Ok(s.into_bytes()),
            other => Err(mismatch("Vec<u8>", &other)),
        }
    }
}
