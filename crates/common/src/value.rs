//! Runtime value representation for the stackvm machine.
//!
//! Values are what live on the operand stack and in the variable
//! environment.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::instruction::{is_quoted, strip_quotes};

/// Runtime value: one of the three value kinds the machine knows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    /// Signed 64-bit integer.
    Int(i64),
    /// IEEE 754 64-bit float.
    Float(f64),
    /// UTF-8 text.
    Text(String),
}

// Floats compare bitwise here so that Value is Eq and a snapshot round-trip
// can be checked exactly. Numeric comparison for EQ/NEQ lives in the VM.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Value {
    /// Parse a literal token.
    ///
    /// A token delimited by `"` on both ends is text (markers stripped).
    /// Otherwise it is tried as an integer, then as a float. Returns `None`
    /// when none of these apply.
    pub fn parse_literal(token: &str) -> Option<Value> {
        if is_quoted(token) {
            return Some(Value::Text(strip_quotes(token).to_string()));
        }
        if let Ok(i) = token.parse::<i64>() {
            return Some(Value::Int(i));
        }
        token.parse::<f64>().ok().map(Value::Float)
    }

    /// Human-readable name of this value's kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
        }
    }

    /// Numeric view: integers widen to float, text has none.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Text(_) => None,
        }
    }

    /// Whether this value is an integer or a float.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Value::Text(_))
    }

    /// Encode a boolean as the machine does: integer 1 or 0.
    pub fn from_bool(b: bool) -> Value {
        Value::Int(i64::from(b))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            // Debug keeps a trailing ".0" on whole floats.
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}
