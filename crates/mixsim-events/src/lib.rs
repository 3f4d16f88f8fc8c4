//! Event node types for mixsim.
//!
//! Event-driven nodes carry typed data the scheduler never looks into.
//! Each data kind is an [`EventNodeType`] providing create, initialize,
//! invert, copy, multi-driver resolve, compare and the three renderings
//! (plot, print, export). Types are looked up by name in an
//! [`EventTypeRegistry`].
//!
//! # Example
//!
//! ```
//! use mixsim_events::{EventValue, global};
//!
//! let real = global().get("real").unwrap();
//! let sum = real.resolve(&[EventValue::Real(1.0), EventValue::Real(2.5)]).unwrap();
//! assert_eq!(real.print_value(&sum).unwrap(), "   3.500000e+00");
//! ```

pub mod digital;
pub mod error;
pub mod int;
pub mod node_type;
pub mod real;
pub mod registry;
pub mod value;

pub use digital::DigitalType;
pub use error::{Error, Result};
pub use int::IntType;
pub use node_type::EventNodeType;
pub use real::RealType;
pub use registry::{EventTypeRegistry, global};
pub use value::{Digital, EventValue, State, Strength};
