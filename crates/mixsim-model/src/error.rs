//! Error types for mixsim-model.

use mixsim_core::ValueType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("bad parameter index {index} (model has {count} parameters)")]
    BadParameter { index: usize, count: usize },

    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("parameter {param}: expected {expected} value, found {found}")]
    KindMismatch {
        param: String,
        expected: ValueType,
        found: ValueType,
    },

    #[error("{instance}: unknown controlling source {vsource}")]
    UnknownControllingSource { instance: String, vsource: String },

    #[error("parameter {param} is sized by unknown connection {connection}")]
    UnknownConnection { param: String, connection: String },

    #[error("array parameter {0} is not sized by any connection")]
    MissingConnectionRef(String),

    #[error("model {0} is frozen after defaulting")]
    ModelFrozen(String),

    #[error("{instance}: expected {expected} connections, found {found}")]
    ConnectionCount {
        instance: String,
        expected: usize,
        found: usize,
    },

    #[error("{instance}: connection {connection} cannot be null")]
    NullConnection { instance: String, connection: String },

    #[error("{instance}: output port {port} has no branch equation")]
    MissingBranch { instance: String, port: String },

    #[error(transparent)]
    Parse(#[from] mixsim_parser::Error),

    #[error(transparent)]
    Core(#[from] mixsim_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
