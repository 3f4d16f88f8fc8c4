//! Code-model card parsing for mixsim.
//!
//! This crate provides the tokenizer for parameter and connection text and
//! the parsers built on it.
//!
//! # Example
//!
//! ```
//! use mixsim_core::{DataKind, Scalar, ValueType};
//! use mixsim_parser::{Lexer, parse_value};
//!
//! let mut lexer = Lexer::new("gain=2.5k");
//! lexer.next_token(); // parameter name
//! let value = parse_value(&mut lexer, ValueType::scalar(DataKind::Real)).unwrap();
//!
//! assert_eq!(value.elements(), &[Scalar::Real(2500.0)]);
//! ```

pub mod connection;
pub mod error;
pub mod lexer;
pub mod value;

pub use connection::{ConnectionSpec, PortSpec, PortTarget, parse_connection};
pub use error::{Error, Result};
pub use lexer::{Lexer, Token, TokenKind};
pub use value::parse_value;
