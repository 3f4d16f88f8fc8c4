//! Typed parameter and connection values.
//!
//! A [`Value`] is either a single [`Scalar`] or a non-empty homogeneous array
//! of scalars. The declared shape of a parameter slot is a [`ValueType`].

use std::fmt;
use std::str::FromStr;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Primitive kind of a value element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    Boolean,
    Integer,
    Real,
    Complex,
    String,
}

impl DataKind {
    /// The kind's zero value, used when a parameter has no declared default.
    pub fn zero(self) -> Scalar {
        match self {
            DataKind::Boolean => Scalar::Boolean(false),
            DataKind::Integer => Scalar::Integer(0),
            DataKind::Real => Scalar::Real(0.0),
            DataKind::Complex => Scalar::Complex(Complex64::new(0.0, 0.0)),
            DataKind::String => Scalar::String(String::new()),
        }
    }

    /// Lowercase name of the kind.
    pub fn name(self) -> &'static str {
        match self {
            DataKind::Boolean => "boolean",
            DataKind::Integer => "integer",
            DataKind::Real => "real",
            DataKind::Complex => "complex",
            DataKind::String => "string",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared type of a parameter: a kind and an arity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueType {
    pub kind: DataKind,
    #[serde(default)]
    pub is_array: bool,
}

impl ValueType {
    pub const fn scalar(kind: DataKind) -> Self {
        Self {
            kind,
            is_array: false,
        }
    }

    pub const fn array(kind: DataKind) -> Self {
        Self {
            kind,
            is_array: true,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_array {
            write!(f, "{}[]", self.kind)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

impl FromStr for ValueType {
    type Err = Error;

    /// Parse `real`, `integer[]`, `bool`, ... into a declared type.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_lowercase();
        let (name, is_array) = match s.strip_suffix("[]") {
            Some(name) => (name, true),
            None => (s.as_str(), false),
        };
        let kind = match name {
            "boolean" | "bool" => DataKind::Boolean,
            "integer" | "int" => DataKind::Integer,
            "real" => DataKind::Real,
            "complex" => DataKind::Complex,
            "string" => DataKind::String,
            _ => return Err(Error::InvalidValue(format!("unknown value type: {s}"))),
        };
        Ok(Self { kind, is_array })
    }
}

/// A single value element.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Complex(Complex64),
    String(String),
}

impl Scalar {
    /// Get the element's kind.
    pub fn kind(&self) -> DataKind {
        match self {
            Scalar::Boolean(_) => DataKind::Boolean,
            Scalar::Integer(_) => DataKind::Integer,
            Scalar::Real(_) => DataKind::Real,
            Scalar::Complex(_) => DataKind::Complex,
            Scalar::String(_) => DataKind::String,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Scalar::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Scalar::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_complex(&self) -> Option<Complex64> {
        match self {
            Scalar::Complex(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Check if a string must be quoted to come back as one string token.
///
/// A string holding a `"` cannot be quoted, and is written bare.
fn needs_quotes(s: &str) -> bool {
    const SEPARATORS: &[char] = &['=', '(', ')', ',', '<', '>', '[', ']', '~', '%'];
    if s.contains('"') {
        return false;
    }
    s.is_empty()
        || s == "null"
        || s.chars().any(|c| c.is_whitespace() || SEPARATORS.contains(&c))
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Boolean(b) => f.write_str(if *b { "true" } else { "false" }),
            Scalar::Integer(i) => write!(f, "{i}"),
            Scalar::Real(r) => write!(f, "{r}"),
            Scalar::Complex(c) => write!(f, "< {} {} >", c.re, c.im),
            Scalar::String(s) if needs_quotes(s) => write!(f, "\"{s}\""),
            Scalar::String(s) => f.write_str(s),
        }
    }
}

/// A parsed parameter or connection value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A single element.
    Scalar(Scalar),
    /// One or more elements of the same kind.
    Array { kind: DataKind, elements: Vec<Scalar> },
}

impl Value {
    pub fn scalar(value: Scalar) -> Self {
        Value::Scalar(value)
    }

    /// Build an array value, checking it is non-empty and homogeneous.
    pub fn array(kind: DataKind, elements: Vec<Scalar>) -> Result<Self> {
        if elements.is_empty() {
            return Err(Error::InvalidValue(
                "array value must have at least one element".into(),
            ));
        }
        if let Some(bad) = elements.iter().find(|e| e.kind() != kind) {
            return Err(Error::InvalidValue(format!(
                "{} element in {} array",
                bad.kind(),
                kind
            )));
        }
        Ok(Value::Array { kind, elements })
    }

    pub fn kind(&self) -> DataKind {
        match self {
            Value::Scalar(s) => s.kind(),
            Value::Array { kind, .. } => *kind,
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Scalar(s) => ValueType::scalar(s.kind()),
            Value::Array { kind, .. } => ValueType::array(*kind),
        }
    }

    /// Element count for arrays, `None` for scalars.
    pub fn count(&self) -> Option<usize> {
        match self {
            Value::Scalar(_) => None,
            Value::Array { elements, .. } => Some(elements.len()),
        }
    }

    /// View the value as a slice of elements (a scalar is a slice of one).
    pub fn elements(&self) -> &[Scalar] {
        match self {
            Value::Scalar(s) => std::slice::from_ref(s),
            Value::Array { elements, .. } => elements,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(s) => write!(f, "{s}"),
            Value::Array { elements, .. } => {
                f.write_str("[")?;
                for e in elements {
                    write!(f, " {e}")?;
                }
                f.write_str(" ]")
            }
        }
    }
}
