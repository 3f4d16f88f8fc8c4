//! Event node payloads.

use std::fmt;

use crate::error::{Error, Result};

/// Logic level of a digital node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum State {
    #[default]
    Zero,
    One,
    Unknown,
}

impl State {
    /// Swap zero and one; unknown stays unknown.
    pub fn inverted(self) -> Self {
        match self {
            State::Zero => State::One,
            State::One => State::Zero,
            State::Unknown => State::Unknown,
        }
    }

    fn code(self) -> char {
        match self {
            State::Zero => '0',
            State::One => '1',
            State::Unknown => 'U',
        }
    }
}

/// Drive strength of a digital node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strength {
    #[default]
    Strong,
    Resistive,
    HiImpedance,
    Undetermined,
}

impl Strength {
    /// Arbitration rank; higher wins. An undetermined driver may be
    /// strong, so it outranks resistive.
    pub fn rank(self) -> u8 {
        match self {
            Strength::Strong => 3,
            Strength::Undetermined => 2,
            Strength::Resistive => 1,
            Strength::HiImpedance => 0,
        }
    }

    fn code(self) -> char {
        match self {
            Strength::Strong => 's',
            Strength::Resistive => 'r',
            Strength::HiImpedance => 'z',
            Strength::Undetermined => 'u',
        }
    }
}

/// A digital node value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Digital {
    pub state: State,
    pub strength: Strength,
}

impl Digital {
    pub const fn new(state: State, strength: Strength) -> Self {
        Self { state, strength }
    }
}

impl fmt::Display for Digital {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.state.code(), self.strength.code())
    }
}

/// Payload of one event node.
///
/// Each registered node type works on exactly one variant. `Bytes`
/// carries opaque data for node types defined outside this crate.
#[derive(Debug, Clone, PartialEq)]
pub enum EventValue {
    Real(f64),
    Int(i64),
    Digital(Digital),
    Bytes(Vec<u8>),
}

impl EventValue {
    /// Name of the payload variant, for error reports.
    pub fn kind_name(&self) -> &'static str {
        match self {
            EventValue::Real(_) => "real",
            EventValue::Int(_) => "int",
            EventValue::Digital(_) => "digital",
            EventValue::Bytes(_) => "bytes",
        }
    }

    fn mismatch(&self, expected: &'static str) -> Error {
        Error::PayloadMismatch {
            expected,
            found: self.kind_name(),
        }
    }

    pub fn as_real(&self) -> Result<f64> {
        match self {
            EventValue::Real(v) => Ok(*v),
            other => Err(other.mismatch("real")),
        }
    }

    pub fn as_int(&self) -> Result<i64> {
        match self {
            EventValue::Int(v) => Ok(*v),
            other => Err(other.mismatch("int")),
        }
    }

    pub fn as_digital(&self) -> Result<Digital> {
        match self {
            EventValue::Digital(v) => Ok(*v),
            other => Err(other.mismatch("digital")),
        }
    }

    pub fn as_bytes(&self) -> Result<&[u8]> {
        match self {
            EventValue::Bytes(v) => Ok(v),
            other => Err(other.mismatch("bytes")),
        }
    }

    /// Check that `self` and `other` carry the same variant.
    pub fn same_kind(&self, other: &EventValue) -> Result<()> {
        if std::mem::discriminant(self) == std::mem::discriminant(other) {
            Ok(())
        } else {
            Err(other.mismatch(self.kind_name()))
        }
    }
}
