//! Error types for mixsim-parser.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("Array parameter expected - No array delimiter found")]
    ArrayExpected,

    #[error("Unexpected end of model card")]
    UnexpectedEnd,

    #[error("Array parameter must have at least one value")]
    EmptyArray,

    #[error("Bad boolean value")]
    BadBoolean { token: String },

    #[error("Bad integer, octal, or hex value")]
    BadInteger { token: String },

    #[error("Bad real value")]
    BadReal { token: String },

    #[error("Bad complex value")]
    BadComplex,

    #[error("unknown port type: %{0}")]
    UnknownPortType(String),

    #[error("unexpected token '{0}' in connection")]
    UnexpectedToken(String),

    #[error("unexpected text after value: {0}")]
    TrailingText(String),

    #[error("array connection expected")]
    ArrayConnectionExpected,

    #[error("array connection must have at least one port")]
    EmptyConnectionArray,

    #[error("only event-driven ports can be inverted")]
    InvertedAnalogPort,
}

pub type Result<T> = std::result::Result<T, Error>;
