//! Code-model setup for mixsim.
//!
//! A code model is a behavioral block whose equations are supplied from
//! outside the simulator. This crate binds model parameters, defaults the
//! ones left unset, and prepares every instance for loading: branch
//! equations for voltage-like outputs and current-sensing inputs, and the
//! matrix entries coupling each output port to each input port as one of
//! the four controlled-source kinds.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use mixsim_core::{EquationTable, PortKind, SparsePattern};
//! use mixsim_model::{CodeModelInfo, ConnInfo, Direction, Model, SetupConfig, setup_models};
//!
//! let info = Arc::new(
//!     CodeModelInfo::new("gain")
//!         .with_conn(ConnInfo::new("in", Direction::In, PortKind::Voltage))
//!         .with_conn(ConnInfo::new("out", Direction::Out, PortKind::Voltage)),
//! );
//!
//! let mut equations = EquationTable::new();
//! let mut model = Model::new("amp", info);
//! model.add_instance_text("a1", &["1", "2"], &mut equations).unwrap();
//!
//! let mut matrix = SparsePattern::new();
//! let mut models = [model];
//! let summary =
//!     setup_models(&mut models, &mut matrix, &mut equations, &SetupConfig::default()).unwrap();
//!
//! assert_eq!(summary.branch_equations, 1);
//! ```

pub mod definition;
pub mod error;
pub mod instance;
pub mod model;
pub mod resolver;
pub mod setup;

pub use definition::{CodeModelInfo, ConnInfo, Direction, ParamInfo};
pub use error::{Error, Result};
pub use instance::{
    BranchEntries, Connection, Instance, InstanceCounters, Port, PortMatrixData, PortRuntime,
};
pub use model::{Model, ParamState};
pub use resolver::{ControlStamp, ControlledSource, classify};
pub use setup::{SetupConfig, SetupSummary, setup_instance, setup_model, setup_models};
