//! Port-type pair resolution.
//!
//! Every (input port, output port) pair on a code-model instance couples
//! into the matrix as one of the four linear controlled sources, decided
//! only by the two port kinds:
//!
//! | input                                   | output                                 | source |
//! |-----------------------------------------|----------------------------------------|--------|
//! | `v`, `vd`, `g`, `gd`                    | `v`, `vd`, `h`, `hd`                   | VCVS   |
//! | `v`, `vd`, `g`, `gd`                    | `i`, `id`, `g`, `gd`                   | VCCS   |
//! | `i`, `id`, `vnam`, `h`, `hd`            | `v`, `vd`, `h`, `hd`                   | CCVS   |
//! | `i`, `id`, `vnam`, `h`, `hd`            | `i`, `id`, `g`, `gd`                   | CCCS   |
//!
//! Any other pair has no coupling.

use mixsim_core::{EntryHandle, PortKind, SparsePattern};

/// The four canonical two-port couplings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlledSource {
    /// Voltage-controlled voltage source.
    Vcvs,
    /// Voltage-controlled current source.
    Vccs,
    /// Current-controlled voltage source.
    Ccvs,
    /// Current-controlled current source.
    Cccs,
}

fn senses_voltage(kind: PortKind) -> bool {
    matches!(
        kind,
        PortKind::Voltage
            | PortKind::DiffVoltage
            | PortKind::Conductance
            | PortKind::DiffConductance
    )
}

fn senses_current(kind: PortKind) -> bool {
    matches!(
        kind,
        PortKind::Current
            | PortKind::DiffCurrent
            | PortKind::VsourceCurrent
            | PortKind::Resistance
            | PortKind::DiffResistance
    )
}

fn drives_voltage(kind: PortKind) -> bool {
    matches!(
        kind,
        PortKind::Voltage | PortKind::DiffVoltage | PortKind::Resistance | PortKind::DiffResistance
    )
}

fn drives_current(kind: PortKind) -> bool {
    matches!(
        kind,
        PortKind::Current
            | PortKind::DiffCurrent
            | PortKind::Conductance
            | PortKind::DiffConductance
    )
}

/// Classify an (input kind, output kind) pair.
pub fn classify(input: PortKind, output: PortKind) -> Option<ControlledSource> {
    if senses_voltage(input) {
        if drives_voltage(output) {
            return Some(ControlledSource::Vcvs);
        }
        if drives_current(output) {
            return Some(ControlledSource::Vccs);
        }
    } else if senses_current(input) {
        if drives_voltage(output) {
            return Some(ControlledSource::Ccvs);
        }
        if drives_current(output) {
            return Some(ControlledSource::Cccs);
        }
    }
    None
}

/// Matrix entries holding one output port's partial derivative with
/// respect to one input port.
///
/// Field names read `<row>_<column>`: `branch` is the output's branch
/// equation, `pos`/`neg` the output's nodes, `poscntl`/`negcntl` the
/// input's nodes and `ibranchcntl` the input's sensing branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlStamp {
    Vcvs {
        branch_poscntl: EntryHandle,
        branch_negcntl: EntryHandle,
    },
    Vccs {
        pos_poscntl: EntryHandle,
        pos_negcntl: EntryHandle,
        neg_poscntl: EntryHandle,
        neg_negcntl: EntryHandle,
    },
    Ccvs {
        branch_ibranchcntl: EntryHandle,
    },
    Cccs {
        pos_ibranchcntl: EntryHandle,
        neg_ibranchcntl: EntryHandle,
    },
}

impl ControlStamp {
    pub fn source(&self) -> ControlledSource {
        match self {
            ControlStamp::Vcvs { .. } => ControlledSource::Vcvs,
            ControlStamp::Vccs { .. } => ControlledSource::Vccs,
            ControlStamp::Ccvs { .. } => ControlledSource::Ccvs,
            ControlStamp::Cccs { .. } => ControlledSource::Cccs,
        }
    }

    /// All entry handles of the stamp, in allocation order.
    pub fn handles(&self) -> Vec<EntryHandle> {
        match *self {
            ControlStamp::Vcvs {
                branch_poscntl,
                branch_negcntl,
            } => vec![branch_poscntl, branch_negcntl],
            ControlStamp::Vccs {
                pos_poscntl,
                pos_negcntl,
                neg_poscntl,
                neg_negcntl,
            } => vec![pos_poscntl, pos_negcntl, neg_poscntl, neg_negcntl],
            ControlStamp::Ccvs { branch_ibranchcntl } => vec![branch_ibranchcntl],
            ControlStamp::Cccs {
                pos_ibranchcntl,
                neg_ibranchcntl,
            } => vec![pos_ibranchcntl, neg_ibranchcntl],
        }
    }

    /// Load a partial derivative (gain, transconductance, ...) into the matrix.
    pub fn load(&self, matrix: &mut SparsePattern, partial: f64) {
        match *self {
            ControlStamp::Vcvs {
                branch_poscntl,
                branch_negcntl,
            } => {
                matrix.add(branch_poscntl, -partial);
                matrix.add(branch_negcntl, partial);
            }
            ControlStamp::Vccs {
                pos_poscntl,
                pos_negcntl,
                neg_poscntl,
                neg_negcntl,
            } => {
                matrix.add(pos_poscntl, partial);
                matrix.add(pos_negcntl, -partial);
                matrix.add(neg_poscntl, -partial);
                matrix.add(neg_negcntl, partial);
            }
            ControlStamp::Ccvs { branch_ibranchcntl } => {
                matrix.add(branch_ibranchcntl, -partial);
            }
            ControlStamp::Cccs {
                pos_ibranchcntl,
                neg_ibranchcntl,
            } => {
                matrix.add(pos_ibranchcntl, partial);
                matrix.add(neg_ibranchcntl, -partial);
            }
        }
    }
}
