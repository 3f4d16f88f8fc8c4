//! Error types for mixsim-events.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("expected {expected} payload, found {found}")]
    PayloadMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("cannot resolve a node with no drivers")]
    NoDrivers,

    #[error("unknown event node type: {0}")]
    UnknownType(String),

    #[error("event node type already registered: {0}")]
    DuplicateType(String),
}

pub type Result<T> = std::result::Result<T, Error>;
