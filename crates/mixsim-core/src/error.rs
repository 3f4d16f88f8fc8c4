//! Error types for mixsim-core.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("duplicate equation: {0}")]
    DuplicateEquation(String),

    #[error("out of memory while allocating {what}")]
    OutOfMemory { what: String },

    #[error("invalid value: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, Error>;
