//! Code-model instances: connections, ports and their setup data.

use mixsim_core::{EntryHandle, EquationTable, GROUND, PortKind, SparsePattern};
use mixsim_parser::{ConnectionSpec, PortSpec, PortTarget};
use num_complex::Complex64;

use crate::definition::{CodeModelInfo, ConnInfo};
use crate::error::{Error, Result};
use crate::resolver::ControlStamp;

/// The four entries coupling a port's nodes to a branch equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchEntries {
    pub pos_branch: EntryHandle,
    pub neg_branch: EntryHandle,
    pub branch_pos: EntryHandle,
    pub branch_neg: EntryHandle,
}

impl BranchEntries {
    /// Load the unit incidence of an ideal voltage source.
    pub fn load_incidence(&self, matrix: &mut SparsePattern) {
        matrix.add(self.pos_branch, 1.0);
        matrix.add(self.neg_branch, -1.0);
        matrix.add(self.branch_pos, 1.0);
        matrix.add(self.branch_neg, -1.0);
    }
}

/// Matrix data created for a port during setup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortMatrixData {
    /// Branch equation of a voltage-like output.
    pub branch: Option<usize>,
    /// Branch equation whose current this port senses.
    pub ibranch: Option<usize>,
    pub branch_entries: Option<BranchEntries>,
    /// Entries of the zero-valued source sensing a current input.
    pub ibranch_entries: Option<BranchEntries>,
    /// Coupling to each input port, indexed `[connection][port]`.
    pub inputs: Vec<Vec<Option<ControlStamp>>>,
}

/// Per-port storage the load phase writes into.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortRuntime {
    /// Output partials, indexed `[connection][port]` of the inputs.
    pub partial: Vec<Vec<f64>>,
    /// Output AC gains, same shape as `partial`.
    pub ac_gain: Vec<Vec<Complex64>>,
    /// State vector slot of an input's previous value.
    pub old_input: Option<usize>,
}

/// One terminal of a connection.
#[derive(Debug, Clone, PartialEq)]
pub struct Port {
    pub kind: PortKind,
    pub is_null: bool,
    pub invert: bool,
    pub pos_node: usize,
    pub neg_node: usize,
    /// Voltage source name for `vnam` ports.
    pub vsource: Option<String>,
    pub matrix: PortMatrixData,
    pub runtime: PortRuntime,
}

impl Port {
    fn with_nodes(kind: PortKind, pos_node: usize, neg_node: usize) -> Self {
        Self {
            kind,
            is_null: false,
            invert: false,
            pos_node,
            neg_node,
            vsource: None,
            matrix: PortMatrixData::default(),
            runtime: PortRuntime::default(),
        }
    }

    /// A port between two equations.
    pub fn nodes(kind: PortKind, pos_node: usize, neg_node: usize) -> Self {
        Self::with_nodes(kind, pos_node, neg_node)
    }

    /// A single-ended port referenced to ground.
    pub fn node(kind: PortKind, node: usize) -> Self {
        Self::with_nodes(kind, node, GROUND)
    }

    /// A port sensing the current of a named voltage source.
    pub fn vsource(name: impl Into<String>) -> Self {
        Self {
            vsource: Some(name.into()),
            ..Self::with_nodes(PortKind::VsourceCurrent, GROUND, GROUND)
        }
    }

    /// An unconnected port.
    pub fn null(kind: PortKind) -> Self {
        Self {
            is_null: true,
            ..Self::with_nodes(kind, GROUND, GROUND)
        }
    }

    fn from_spec(spec: &PortSpec, equations: &mut EquationTable) -> Result<Self> {
        let mut port = match &spec.target {
            PortTarget::Null => Self::null(spec.kind),
            PortTarget::Node(n) => Self::node(spec.kind, equations.node(n)?),
            PortTarget::Differential { pos, neg } => {
                Self::nodes(spec.kind, equations.node(pos)?, equations.node(neg)?)
            }
            PortTarget::Source(name) => Self::vsource(name.clone()),
        };
        port.kind = spec.kind;
        port.invert = spec.invert;
        Ok(port)
    }
}

/// A named group of ports sharing a direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub name: String,
    pub is_input: bool,
    pub is_output: bool,
    pub is_null: bool,
    pub ports: Vec<Port>,
}

impl Connection {
    pub fn input(name: impl Into<String>, ports: Vec<Port>) -> Self {
        Self {
            name: name.into(),
            is_input: true,
            is_output: false,
            is_null: false,
            ports,
        }
    }

    pub fn output(name: impl Into<String>, ports: Vec<Port>) -> Self {
        Self {
            is_input: false,
            is_output: true,
            ..Self::input(name, ports)
        }
    }

    pub fn inout(name: impl Into<String>, ports: Vec<Port>) -> Self {
        Self {
            is_output: true,
            ..Self::input(name, ports)
        }
    }

    /// A null connection of the given direction.
    pub fn null(info: &ConnInfo) -> Self {
        Self {
            name: info.name.clone(),
            is_input: info.direction.is_input(),
            is_output: info.direction.is_output(),
            is_null: true,
            ports: Vec::new(),
        }
    }

    /// Number of ports.
    pub fn size(&self) -> usize {
        self.ports.len()
    }
}

/// Counters reset at the start of every setup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstanceCounters {
    pub num_state: usize,
    pub num_intgr: usize,
    pub num_conv: usize,
}

/// One placement of a code model.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    name: String,
    pub connections: Vec<Connection>,
    pub counters: InstanceCounters,
}

impl Instance {
    pub fn new(name: impl Into<String>, connections: Vec<Connection>) -> Self {
        Self {
            name: name.into(),
            connections,
            counters: InstanceCounters::default(),
        }
    }

    /// Build an instance from parsed connection specs, numbering nodes as
    /// they are seen.
    pub fn from_specs(
        name: impl Into<String>,
        info: &CodeModelInfo,
        specs: &[ConnectionSpec],
        equations: &mut EquationTable,
    ) -> Result<Self> {
        let name = name.into();
        if specs.len() != info.conns().len() {
            return Err(Error::ConnectionCount {
                instance: name,
                expected: info.conns().len(),
                found: specs.len(),
            });
        }

        let mut connections = Vec::with_capacity(specs.len());
        for (conn_info, spec) in info.conns().iter().zip(specs) {
            if *spec == ConnectionSpec::Null {
                if !conn_info.null_allowed {
                    return Err(Error::NullConnection {
                        instance: name,
                        connection: conn_info.name.clone(),
                    });
                }
                connections.push(Connection::null(conn_info));
                continue;
            }
            let ports = spec
                .ports()
                .iter()
                .map(|p| Port::from_spec(p, equations))
                .collect::<Result<Vec<_>>>()?;
            connections.push(Connection {
                is_null: false,
                ports,
                ..Connection::null(conn_info)
            });
        }

        Ok(Self::new(name, connections))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if any connected port couples into the analog matrix.
    pub fn is_analog(&self) -> bool {
        self.connections
            .iter()
            .filter(|c| !c.is_null)
            .flat_map(|c| &c.ports)
            .any(|p| p.kind.is_analog())
    }

    /// Iterate over every port with its `(connection, port)` index.
    pub fn ports(&self) -> impl Iterator<Item = ((usize, usize), &Port)> {
        self.connections
            .iter()
            .enumerate()
            .flat_map(|(i, c)| c.ports.iter().enumerate().map(move |(j, p)| ((i, j), p)))
    }
}
