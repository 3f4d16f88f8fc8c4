//! Model and instance setup.
//!
//! Setup runs once per circuit before simulation. For each model it
//! defaults unset parameters, allocates per-port runtime storage, then for
//! each analog instance creates branch equations (phase A) and the matrix
//! entries coupling outputs to inputs (phase B). Any allocation failure
//! aborts the whole setup.

use std::ops::AddAssign;

use mixsim_core::{BranchAllocator, EntryHandle, MatrixAllocator, PortKind};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::instance::{BranchEntries, Instance, InstanceCounters, Port};
use crate::model::Model;
use crate::resolver::{ControlStamp, ControlledSource, classify};

/// Options for [`setup_models`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupConfig {
    /// First free slot in the simulator state vector.
    pub first_state: usize,
    /// Also set up instances without analog ports.
    pub allocate_event_instances: bool,
    /// Allocate AC gain storage next to the partials.
    pub ac_runtime: bool,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            first_state: 0,
            allocate_event_instances: false,
            ac_runtime: true,
        }
    }
}

/// Counts of what setup created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SetupSummary {
    pub models: usize,
    pub instances: usize,
    pub skipped_instances: usize,
    pub branch_equations: usize,
    pub matrix_entries: usize,
    pub state_slots: usize,
}

impl AddAssign for SetupSummary {
    fn add_assign(&mut self, rhs: Self) {
        self.models += rhs.models;
        self.instances += rhs.instances;
        self.skipped_instances += rhs.skipped_instances;
        self.branch_equations += rhs.branch_equations;
        self.matrix_entries += rhs.matrix_entries;
        self.state_slots += rhs.state_slots;
    }
}

/// Input port data phase B needs, captured before output ports are
/// mutated.
#[derive(Debug, Clone, Copy)]
struct Control {
    kind: PortKind,
    pos_node: usize,
    neg_node: usize,
    ibranch: Option<usize>,
    label: (usize, usize),
}

struct Allocator<'a, M: ?Sized> {
    matrix: &'a mut M,
    instance: &'a str,
    entries: usize,
}

impl<M: MatrixAllocator + ?Sized> Allocator<'_, M> {
    fn entry(&mut self, row: usize, col: usize) -> Result<EntryHandle> {
        let handle = self.matrix.make_entry(row, col).ok_or_else(|| {
            Error::Core(mixsim_core::Error::OutOfMemory {
                what: format!("matrix entry ({row}, {col}) for {}", self.instance),
            })
        })?;
        self.entries += 1;
        Ok(handle)
    }

    fn branch_entries(&mut self, pos: usize, neg: usize, branch: usize) -> Result<BranchEntries> {
        Ok(BranchEntries {
            pos_branch: self.entry(pos, branch)?,
            neg_branch: self.entry(neg, branch)?,
            branch_pos: self.entry(branch, pos)?,
            branch_neg: self.entry(branch, neg)?,
        })
    }
}

fn missing_branch(instance: &str, conn: usize, port: usize) -> Error {
    Error::MissingBranch {
        instance: instance.to_string(),
        port: format!("{conn}_{port}"),
    }
}

/// Create the branch equations and matrix entries of one instance.
pub fn setup_instance<M, B>(
    instance: &mut Instance,
    matrix: &mut M,
    branches: &mut B,
) -> Result<SetupSummary>
where
    M: MatrixAllocator + ?Sized,
    B: BranchAllocator + ?Sized,
{
    let name = instance.name().to_string();
    let mut alloc = Allocator {
        matrix,
        instance: &name,
        entries: 0,
    };
    let mut branch_equations = 0;

    // Phase A: output branches, current-sensing sources, vsource lookups.
    for (i, conn) in instance.connections.iter_mut().enumerate() {
        if conn.is_null {
            continue;
        }
        let (is_input, is_output) = (conn.is_input, conn.is_output);

        for (j, port) in conn.ports.iter_mut().enumerate() {
            if port.is_null {
                continue;
            }
            let kind = port.kind;

            if (is_output && matches!(kind, PortKind::Voltage | PortKind::DiffVoltage))
                || matches!(kind, PortKind::Resistance | PortKind::DiffResistance)
            {
                let branch = branches.make_branch(&name, &format!("branch_{i}_{j}"))?;
                port.matrix.branch = Some(branch);
                // A resistance input senses the current of its own branch.
                port.matrix.ibranch = Some(branch);
                port.matrix.branch_entries =
                    Some(alloc.branch_entries(port.pos_node, port.neg_node, branch)?);
                branch_equations += 1;
            }

            if is_input && matches!(kind, PortKind::Current | PortKind::DiffCurrent) {
                let ibranch = branches.make_branch(&name, &format!("ibranch_{i}_{j}"))?;
                port.matrix.ibranch = Some(ibranch);
                port.matrix.ibranch_entries =
                    Some(alloc.branch_entries(port.pos_node, port.neg_node, ibranch)?);
                branch_equations += 1;
            }

            if is_input && kind == PortKind::VsourceCurrent {
                let source = port.vsource.as_deref().unwrap_or_default();
                match branches.find_branch(source) {
                    Some(ibranch) => port.matrix.ibranch = Some(ibranch),
                    None => {
                        log::error!("{name}: unknown controlling source {source}");
                        return Err(Error::UnknownControllingSource {
                            instance: name.clone(),
                            vsource: source.to_string(),
                        });
                    }
                }
            }
        }
    }

    // Phase B: one controlled-source stamp per (output, input) port pair.
    let controls: Vec<Option<Vec<Option<Control>>>> = instance
        .connections
        .iter()
        .enumerate()
        .map(|(k, conn)| {
            (!conn.is_null && conn.is_input).then(|| {
                conn.ports
                    .iter()
                    .enumerate()
                    .map(|(l, p)| {
                        (!p.is_null).then_some(Control {
                            kind: p.kind,
                            pos_node: p.pos_node,
                            neg_node: p.neg_node,
                            ibranch: p.matrix.ibranch,
                            label: (k, l),
                        })
                    })
                    .collect()
            })
        })
        .collect();

    for (i, conn) in instance.connections.iter_mut().enumerate() {
        if conn.is_null || !conn.is_output {
            continue;
        }
        for (j, port) in conn.ports.iter_mut().enumerate() {
            if port.is_null {
                continue;
            }

            let mut inputs = Vec::with_capacity(controls.len());
            for row in &controls {
                let Some(row) = row else {
                    inputs.push(Vec::new());
                    continue;
                };
                let mut stamps = Vec::with_capacity(row.len());
                for control in row {
                    let stamp = match control {
                        Some(c) => stamp_pair(&mut alloc, port, c, (i, j))?,
                        None => None,
                    };
                    stamps.push(stamp);
                }
                inputs.push(stamps);
            }
            port.matrix.inputs = inputs;
        }
    }

    log::debug!(
        "{name}: {branch_equations} branch equations, {} matrix entries",
        alloc.entries
    );
    Ok(SetupSummary {
        branch_equations,
        matrix_entries: alloc.entries,
        ..SetupSummary::default()
    })
}

fn stamp_pair<M: MatrixAllocator + ?Sized>(
    alloc: &mut Allocator<'_, M>,
    output: &Port,
    input: &Control,
    out_label: (usize, usize),
) -> Result<Option<ControlStamp>> {
    let Some(source) = classify(input.kind, output.kind) else {
        return Ok(None);
    };

    let instance = alloc.instance;
    let branch = || {
        output
            .matrix
            .branch
            .ok_or_else(|| missing_branch(instance, out_label.0, out_label.1))
    };
    let ibranch = || {
        input
            .ibranch
            .ok_or_else(|| missing_branch(instance, input.label.0, input.label.1))
    };

    let stamp = match source {
        ControlledSource::Vcvs => {
            let branch = branch()?;
            ControlStamp::Vcvs {
                branch_poscntl: alloc.entry(branch, input.pos_node)?,
                branch_negcntl: alloc.entry(branch, input.neg_node)?,
            }
        }
        ControlledSource::Cccs => {
            let ibranch = ibranch()?;
            ControlStamp::Cccs {
                pos_ibranchcntl: alloc.entry(output.pos_node, ibranch)?,
                neg_ibranchcntl: alloc.entry(output.neg_node, ibranch)?,
            }
        }
        ControlledSource::Vccs => ControlStamp::Vccs {
            pos_poscntl: alloc.entry(output.pos_node, input.pos_node)?,
            pos_negcntl: alloc.entry(output.pos_node, input.neg_node)?,
            neg_poscntl: alloc.entry(output.neg_node, input.pos_node)?,
            neg_negcntl: alloc.entry(output.neg_node, input.neg_node)?,
        },
        ControlledSource::Ccvs => {
            let (branch, ibranch) = (branch()?, ibranch()?);
            ControlStamp::Ccvs {
                branch_ibranchcntl: alloc.entry(branch, ibranch)?,
            }
        }
    };
    Ok(Some(stamp))
}

/// Reset counters and allocate partials, AC gains and state slots.
///
/// Returns the number of state slots consumed.
fn allocate_runtime(instance: &mut Instance, ac_runtime: bool, first_state: usize) -> usize {
    let shape: Vec<usize> = instance
        .connections
        .iter()
        .map(|c| if c.is_null || !c.is_input { 0 } else { c.size() })
        .collect();

    for conn in &mut instance.connections {
        if conn.is_null || !conn.is_output {
            continue;
        }
        for port in &mut conn.ports {
            port.runtime.partial = shape.iter().map(|&n| vec![0.0; n]).collect();
            if ac_runtime {
                port.runtime.ac_gain = shape
                    .iter()
                    .map(|&n| vec![Complex64::default(); n])
                    .collect();
            }
        }
    }

    let mut state = first_state;
    for conn in &mut instance.connections {
        if conn.is_null || !conn.is_input {
            continue;
        }
        for port in &mut conn.ports {
            port.runtime.old_input = Some(state);
            state += 1;
        }
    }
    state - first_state
}

/// Set up one model and all of its instances.
///
/// Input ports take state-vector slots counting up from `first_state`.
pub fn setup_model<M, B>(
    model: &mut Model,
    matrix: &mut M,
    branches: &mut B,
    config: &SetupConfig,
    first_state: usize,
) -> Result<SetupSummary>
where
    M: MatrixAllocator + ?Sized,
    B: BranchAllocator + ?Sized,
{
    model.default_model()?;

    let mut summary = SetupSummary {
        models: 1,
        ..SetupSummary::default()
    };

    for instance in model.instances_mut() {
        instance.counters = InstanceCounters::default();
    }

    let mut analog = Vec::with_capacity(model.instances().len());
    for instance in model.instances_mut() {
        summary.instances += 1;
        let is_analog = config.allocate_event_instances || instance.is_analog();
        analog.push(is_analog);
        if !is_analog {
            log::debug!("{}: no analog ports, skipping matrix setup", instance.name());
            summary.skipped_instances += 1;
            continue;
        }
        summary.state_slots +=
            allocate_runtime(instance, config.ac_runtime, first_state + summary.state_slots);
    }

    for (instance, is_analog) in model.instances_mut().iter_mut().zip(analog) {
        if is_analog {
            summary += setup_instance(instance, matrix, branches)?;
        }
    }

    log::info!(
        "model {}: {} instances ({} skipped), {} branch equations, {} matrix entries",
        model.name(),
        summary.instances,
        summary.skipped_instances,
        summary.branch_equations,
        summary.matrix_entries
    );
    Ok(summary)
}

/// Set up every model of a circuit, in order.
pub fn setup_models<M, B>(
    models: &mut [Model],
    matrix: &mut M,
    branches: &mut B,
    config: &SetupConfig,
) -> Result<SetupSummary>
where
    M: MatrixAllocator + ?Sized,
    B: BranchAllocator + ?Sized,
{
    let mut total = SetupSummary::default();
    for model in models.iter_mut() {
        let first_state = config.first_state + total.state_slots;
        total += setup_model(model, matrix, branches, config, first_state)?;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Connection;
    use mixsim_core::{EquationTable, SparsePattern};

    #[test]
    fn test_failed_entry_is_not_counted() {
        let mut matrix = SparsePattern::with_capacity_limit(1);
        let mut alloc = Allocator {
            matrix: &mut matrix,
            instance: "a1",
            entries: 0,
        };
        alloc.entry(1, 1).unwrap();
        alloc.entry(0, 2).unwrap();
        assert!(matches!(
            alloc.entry(2, 2),
            Err(Error::Core(mixsim_core::Error::OutOfMemory { .. }))
        ));
        assert_eq!(alloc.entries, 2);
    }

    #[test]
    fn test_config_default() {
        let config = SetupConfig::default();
        assert_eq!(config.first_state, 0);
        assert!(!config.allocate_event_instances);
        assert!(config.ac_runtime);
    }

    #[test]
    fn test_voltage_output_branch() {
        let mut equations = EquationTable::new();
        let a = equations.node("a").unwrap();
        let y = equations.node("y").unwrap();
        let mut inst = Instance::new(
            "buf",
            vec![
                Connection::input("in", vec![Port::node(PortKind::Voltage, a)]),
                Connection::output("out", vec![Port::node(PortKind::Voltage, y)]),
            ],
        );
        let mut matrix = SparsePattern::new();
        let summary = setup_instance(&mut inst, &mut matrix, &mut equations).unwrap();

        let out = &inst.connections[1].ports[0];
        let branch = out.matrix.branch.unwrap();
        assert_eq!(equations.name(branch), Some("buf#branch_1_0"));
        assert_eq!(summary.branch_equations, 1);
        // 4 incidence entries plus 2 VCVS entries.
        assert_eq!(summary.matrix_entries, 6);

        let stamp = out.matrix.inputs[0][0].unwrap();
        assert_eq!(stamp.source(), ControlledSource::Vcvs);
        assert!(out.matrix.inputs[1].is_empty());

        // Input voltage ports need no branch of their own.
        assert_eq!(inst.connections[0].ports[0].matrix.branch, None);
    }

    #[test]
    fn test_resistance_input_uses_own_branch() {
        let mut equations = EquationTable::new();
        let a = equations.node("a").unwrap();
        let y = equations.node("y").unwrap();
        let mut inst = Instance::new(
            "r",
            vec![
                Connection::input("in", vec![Port::node(PortKind::Resistance, a)]),
                Connection::output("out", vec![Port::node(PortKind::Current, y)]),
            ],
        );
        let mut matrix = SparsePattern::new();
        setup_instance(&mut inst, &mut matrix, &mut equations).unwrap();

        let input = &inst.connections[0].ports[0];
        assert_eq!(input.matrix.branch, input.matrix.ibranch);
        let stamp = inst.connections[1].ports[0].matrix.inputs[0][0].unwrap();
        assert_eq!(
            stamp,
            ControlStamp::Cccs {
                pos_ibranchcntl: matrix.get(y, input.matrix.branch.unwrap()).unwrap(),
                neg_ibranchcntl: EntryHandle::TRASH,
            }
        );
    }

    #[test]
    fn test_vsource_reference() {
        let mut equations = EquationTable::new();
        let vbranch = equations.add_vsource("vin").unwrap();
        let y = equations.node("y").unwrap();
        let mut inst = Instance::new(
            "s",
            vec![
                Connection::input("in", vec![Port::vsource("VIN")]),
                Connection::output("out", vec![Port::node(PortKind::Current, y)]),
            ],
        );
        let mut matrix = SparsePattern::new();
        let summary = setup_instance(&mut inst, &mut matrix, &mut equations).unwrap();

        assert_eq!(inst.connections[0].ports[0].matrix.ibranch, Some(vbranch));
        assert_eq!(summary.branch_equations, 0);
    }

    #[test]
    fn test_unknown_vsource_is_fatal() {
        let mut equations = EquationTable::new();
        let mut inst = Instance::new(
            "s",
            vec![Connection::input("in", vec![Port::vsource("vmissing")])],
        );
        let err = setup_instance(&mut inst, &mut SparsePattern::new(), &mut equations).unwrap_err();
        match err {
            Error::UnknownControllingSource { instance, vsource } => {
                assert_eq!(instance, "s");
                assert_eq!(vsource, "vmissing");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_null_ports_are_skipped() {
        let mut equations = EquationTable::new();
        let a = equations.node("a").unwrap();
        let mut inst = Instance::new(
            "n",
            vec![
                Connection::input(
                    "in",
                    vec![Port::null(PortKind::Current), Port::node(PortKind::Voltage, a)],
                ),
                Connection::output("out", vec![Port::null(PortKind::Voltage)]),
            ],
        );
        let summary = setup_instance(&mut inst, &mut SparsePattern::new(), &mut equations).unwrap();
        assert_eq!(summary.branch_equations, 0);
        assert_eq!(summary.matrix_entries, 0);
        assert!(inst.connections[1].ports[0].matrix.inputs.is_empty());
    }

    #[test]
    fn test_runtime_shape_and_state_slots() {
        let mut inst = Instance::new(
            "x",
            vec![
                Connection::input(
                    "in",
                    vec![Port::node(PortKind::Voltage, 1), Port::node(PortKind::Voltage, 2)],
                ),
                Connection::output("out", vec![Port::node(PortKind::Voltage, 3)]),
                Connection::input("en", vec![Port::node(PortKind::Voltage, 4)]),
            ],
        );
        let used = allocate_runtime(&mut inst, false, 10);

        assert_eq!(used, 3);
        let out = &inst.connections[1].ports[0].runtime;
        assert_eq!(out.partial, vec![vec![0.0; 2], vec![], vec![0.0]]);
        assert!(out.ac_gain.is_empty());
        assert_eq!(out.old_input, None);
        assert_eq!(inst.connections[0].ports[1].runtime.old_input, Some(11));
        assert_eq!(inst.connections[2].ports[0].runtime.old_input, Some(12));
    }

    #[test]
    fn test_summary_add_assign() {
        let mut a = SetupSummary {
            models: 1,
            branch_equations: 2,
            ..Default::default()
        };
        a += SetupSummary {
            models: 1,
            matrix_entries: 5,
            ..Default::default()
        };
        assert_eq!(a.models, 2);
        assert_eq!(a.branch_equations, 2);
        assert_eq!(a.matrix_entries, 5);
    }
}
