//! Semantic port kinds of code-model connections.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What a port senses or drives.
///
/// The first nine kinds are analog and couple into the simulation matrix.
/// `Digital` and `UserDefined` ports are event-driven and never stamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortKind {
    Voltage,
    DiffVoltage,
    Current,
    DiffCurrent,
    Resistance,
    DiffResistance,
    Conductance,
    DiffConductance,
    /// Current through a named independent voltage source.
    VsourceCurrent,
    Digital,
    UserDefined,
}

impl PortKind {
    /// The nine analog kinds, in declaration order.
    pub const ANALOG: [PortKind; 9] = [
        PortKind::Voltage,
        PortKind::DiffVoltage,
        PortKind::Current,
        PortKind::DiffCurrent,
        PortKind::Resistance,
        PortKind::DiffResistance,
        PortKind::Conductance,
        PortKind::DiffConductance,
        PortKind::VsourceCurrent,
    ];

    /// Check if ports of this kind take part in the analog matrix.
    pub fn is_analog(self) -> bool {
        !matches!(self, PortKind::Digital | PortKind::UserDefined)
    }

    /// Check if the port is connected between two explicit nodes.
    pub fn is_differential(self) -> bool {
        matches!(
            self,
            PortKind::DiffVoltage
                | PortKind::DiffCurrent
                | PortKind::DiffResistance
                | PortKind::DiffConductance
        )
    }

    /// Netlist prefix used after `%` to select this kind.
    pub fn prefix(self) -> &'static str {
        match self {
            PortKind::Voltage => "v",
            PortKind::DiffVoltage => "vd",
            PortKind::Current => "i",
            PortKind::DiffCurrent => "id",
            PortKind::Resistance => "h",
            PortKind::DiffResistance => "hd",
            PortKind::Conductance => "g",
            PortKind::DiffConductance => "gd",
            PortKind::VsourceCurrent => "vnam",
            PortKind::Digital => "d",
            PortKind::UserDefined => "ud",
        }
    }

    /// Look up a kind by its `%` prefix (case-insensitive).
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        let prefix = prefix.to_lowercase();
        PortKind::ANALOG
            .into_iter()
            .chain([PortKind::Digital, PortKind::UserDefined])
            .find(|k| k.prefix() == prefix)
    }
}

impl fmt::Display for PortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.prefix())
    }
}
