//! Typed message and value inputs
//!
//! Everything handed to `add` is coerced to text before it reaches a
//! formatter, so both output formats see identical strings.

use serde::Serialize;
use std::fmt;

/// Value accepted as a log message or as the optional value attached to it
#[derive(Debug, Clone, PartialEq)]
pub enum LogValue {
    Text(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    /// Maps and sequences, written as compact JSON
    Json(serde_json::Value),
    /// Pre-rendered text from a `Display` type, passed through untouched
    Raw(String),
    Null,
}

impl LogValue {
    /// Serialize any `Serialize` type into a composite value.
    pub fn serialized<T: Serialize + ?Sized>(value: &T) -> crate::core::Result<Self> {
        Ok(serde_json::to_value(value)?.into())
    }

    /// Capture a `Display` rendering as-is.
    pub fn display<T: fmt::Display + ?Sized>(value: &T) -> Self {
        LogValue::Raw(value.to_string())
    }

    /// Text form, or `None` for null.
    pub fn to_text(&self) -> Option<String> {
        match self {
            LogValue::Text(s) | LogValue::Raw(s) => Some(s.clone()),
            LogValue::Int(i) => Some(i.to_string()),
            LogValue::UInt(u) => Some(u.to_string()),
            LogValue::Float(f) => Some(f.to_string()),
            LogValue::Bool(b) => Some(b.to_string()),
            LogValue::Json(v) => Some(v.to_string()),
            LogValue::Null => None,
        }
    }

    /// Text used when this is the message: null renders as `null`.
    pub fn into_message(self) -> String {
        self.to_text().unwrap_or_else(|| "null".to_string())
    }

    /// Text used when this is the attached value: null means "no value".
    pub fn into_value(self) -> Option<String> {
        self.to_text()
    }
}

impl fmt::Display for LogValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_text() {
            Some(text) => f.write_str(&text),
            None => f.write_str("null"),
        }
    }
}

impl From<String> for LogValue {
    fn from(s: String) -> Self {
        LogValue::Text(s)
    }
}

impl From<&str> for LogValue {
    fn from(s: &str) -> Self {
        LogValue::Text(s.to_string())
    }
}

impl From<&String> for LogValue {
    fn from(s: &String) -> Self {
        LogValue::Text(s.clone())
    }
}

macro_rules! from_signed {
    ($($ty:ty),*) => {
        $(impl From<$ty> for LogValue {
            fn from(i: $ty) -> Self {
                LogValue::Int(i as i64)
            }
        })*
    };
}

macro_rules! from_unsigned {
    ($($ty:ty),*) => {
        $(impl From<$ty> for LogValue {
            fn from(u: $ty) -> Self {
                LogValue::UInt(u as u64)
            }
        })*
    };
}

from_signed!(i8, i16, i32, i64, isize);
from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for LogValue {
    fn from(f: f32) -> Self {
        LogValue::Float(f as f64)
    }
}

impl From<f64> for LogValue {
    fn from(f: f64) -> Self {
        LogValue::Float(f)
    }
}

impl From<bool> for LogValue {
    fn from(b: bool) -> Self {
        LogValue::Bool(b)
    }
}

impl From<()> for LogValue {
    fn from(_: ()) -> Self {
        LogValue::Null
    }
}

impl<T: Into<LogValue>> From<Option<T>> for LogValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(LogValue::Null, Into::into)
    }
}

impl From<serde_json::Value> for LogValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => LogValue::Null,
            serde_json::Value::Bool(b) => LogValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    LogValue::Int(i)
                } else if let Some(u) = n.as_u64() {
                    LogValue::UInt(u)
                } else {
                    LogValue::Float(n.as_f64().unwrap_or_default())
                }
            }
            serde_json::Value::String(s) => LogValue::Text(s),
            composite => LogValue::Json(composite),
        }
    }
}
