//! Parameter values and their type tags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared kind of a parameter.
///
/// Serialized as the short tags the host UI switches on (`"num"`, `"bool"`,
/// `"str"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamType {
    /// Floating point number.
    #[serde(rename = "num")]
    Num,
    /// Boolean toggle.
    #[serde(rename = "bool")]
    Bool,
    /// Free-form text.
    #[serde(rename = "str")]
    Str,
}

impl ParamType {
    /// The JSON tag for this type.
    pub fn as_str(self) -> &'static str {
        match self {
            ParamType::Num => "num",
            ParamType::Bool => "bool",
            ParamType::Str => "str",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parameter value.
///
/// Untagged on the wire: JSON numbers (integer or float) become [`Value::Num`],
/// booleans [`Value::Bool`], strings [`Value::Str`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Num(f64),
    /// String value.
    Str(String),
}

impl Value {
    /// The type tag matching this value.
    pub fn kind(&self) -> ParamType {
        match self {
            Value::Num(_) => ParamType::Num,
            Value::Bool(_) => ParamType::Bool,
            Value::Str(_) => ParamType::Str,
        }
    }

    /// The number, if this is a [`Value::Num`].
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            _ => None,
        }
    }

    /// The flag, if this is a [`Value::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The text, if this is a [`Value::Str`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric conversion across all variants.
    ///
    /// Booleans map to `0.0`/`1.0`; strings are parsed after trimming.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Str(s) => s.trim().parse().ok(),
        }
    }

    /// Integer conversion, truncating toward zero.
    ///
    /// Returns `None` for non-finite numbers and unparsable strings.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Value::Str(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(truncate))
            }
            other => other.to_f64().and_then(truncate),
        }
    }

    /// Truthiness: non-zero numbers, `true`, and non-empty strings.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Num(n) => *n != 0.0,
            Value::Bool(b) => *b,
            Value::Str(s) => !s.is_empty(),
        }
    }
}

fn truncate(n: f64) -> Option<i64> {
    if n.is_finite() {
        Some(n.trunc() as i64)
    } else {
        None
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Num(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Num(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Num(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Num(n as f64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Num(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}
