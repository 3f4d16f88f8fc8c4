//! Core value and equation structures for mixsim.
//!
//! This crate provides the data shared by every stage of code-model setup:
//! typed parameter values, engineering-unit evaluation, and the two
//! collaborators setup talks to: the sparse matrix entry allocator and the
//! branch equation allocator.

pub mod error;
pub mod matrix;
pub mod node;
pub mod port;
pub mod units;
pub mod value;

pub use error::{Error, Result};
pub use matrix::{EntryHandle, MatrixAllocator, SparsePattern};
pub use node::{BranchAllocator, EquationKind, EquationTable, GROUND};
pub use port::PortKind;
pub use value::{DataKind, Scalar, Value, ValueType};
