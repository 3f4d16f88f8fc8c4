//! # mixsim
//!
//! Coupling of behavioral code models into a circuit simulator.
//!
//! mixsim provides the pieces a simulator needs to host code models:
//! - parameter and connection parsing from model and instance cards
//! - parameter binding and defaulting, including arrays sized by connections
//! - branch equations and matrix entries for every analog port pair
//! - typed event node data (`real`, `int`, `digital`, user types)
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use mixsim::prelude::*;
//!
//! let info = Arc::new(
//!     CodeModelInfo::new("gain")
//!         .with_param(ParamInfo::scalar("gain", DataKind::Real))
//!         .with_conn(ConnInfo::new("in", Direction::In, PortKind::Voltage))
//!         .with_conn(ConnInfo::new("out", Direction::Out, PortKind::Voltage)),
//! );
//!
//! let mut equations = EquationTable::new();
//! let mut model = Model::new("amp", info);
//! model.set_param_text("gain", "2.5k").unwrap();
//! model.add_instance_text("a1", &["in", "out"], &mut equations).unwrap();
//!
//! let mut matrix = SparsePattern::new();
//! let mut models = [model];
//! let summary =
//!     setup_models(&mut models, &mut matrix, &mut equations, &SetupConfig::default()).unwrap();
//! assert_eq!(summary.branch_equations, 1);
//!
//! // Load the gain of out <- in.
//! let out = &models[0].instances()[0].connections[1].ports[0];
//! let stamp = out.matrix.inputs[0][0].unwrap();
//! assert_eq!(stamp.source(), ControlledSource::Vcvs);
//! stamp.load(&mut matrix, 2500.0);
//! ```
//!
//! ## Event Nodes
//!
//! ```rust
//! use mixsim::prelude::*;
//!
//! let digital = mixsim::events::global().get("digital").unwrap();
//! let resolved = digital
//!     .resolve(&[
//!         EventValue::Digital(Digital::new(State::One, Strength::Resistive)),
//!         EventValue::Digital(Digital::new(State::Zero, Strength::Strong)),
//!     ])
//!     .unwrap();
//! assert_eq!(digital.print_value(&resolved).unwrap(), "0s");
//! ```

pub use mixsim_core as core;
pub use mixsim_events as events;
pub use mixsim_model as model;
pub use mixsim_parser as parser;

// ============================================================================
// Convenient re-exports from mixsim_core
// ============================================================================

pub use mixsim_core::{
    BranchAllocator, DataKind, EntryHandle, EquationKind, EquationTable, Error as CoreError,
    GROUND, MatrixAllocator, PortKind, Scalar, SparsePattern, Value, ValueType,
};

// ============================================================================
// Convenient re-exports from mixsim_parser
// ============================================================================

pub use mixsim_parser::{
    ConnectionSpec, Error as ParseError, Lexer, PortSpec, PortTarget, parse_connection,
    parse_value,
};

// ============================================================================
// Convenient re-exports from mixsim_model
// ============================================================================

pub use mixsim_model::{
    CodeModelInfo, ConnInfo, Connection, ControlStamp, ControlledSource, Direction,
    Error as ModelError, Instance, Model, ParamInfo, ParamState, Port, SetupConfig, SetupSummary,
    classify, setup_instance, setup_model, setup_models,
};

// ============================================================================
// Convenient re-exports from mixsim_events
// ============================================================================

pub use mixsim_events::{
    Digital, Error as EventError, EventNodeType, EventTypeRegistry, EventValue, State, Strength,
};

/// Re-export of nalgebra's dynamic matrix type.
pub use nalgebra::DMatrix;

/// Re-export of num_complex's double-precision complex type.
pub use num_complex::Complex64;

/// Prelude module containing commonly used types and traits.
///
/// ```rust
/// use mixsim::prelude::*;
/// ```
pub mod prelude {
    // Values and parsing
    pub use crate::{DataKind, Lexer, Scalar, Value, ValueType, parse_value};

    // Equations and matrix
    pub use crate::{BranchAllocator, EquationTable, MatrixAllocator, PortKind, SparsePattern};

    // Models
    pub use crate::{
        CodeModelInfo, ConnInfo, ControlledSource, Direction, Model, ParamInfo, SetupConfig,
        setup_models,
    };

    // Event nodes
    pub use crate::{Digital, EventNodeType, EventValue, State, Strength};

    pub use crate::{Complex64, DMatrix};
}
