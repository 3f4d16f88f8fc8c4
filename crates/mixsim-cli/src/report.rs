//! Plain-text report of a set-up circuit.

use std::fmt;

use mixsim_core::{EntryHandle, EquationKind, EquationTable, SparsePattern, Value};
use mixsim_model::{ControlledSource, Instance, Model, ParamState, Port, SetupSummary};

use crate::circuit::Circuit;

fn source_label(source: ControlledSource) -> &'static str {
    match source {
        ControlledSource::Vcvs => "vcvs",
        ControlledSource::Vccs => "vccs",
        ControlledSource::Ccvs => "ccvs",
        ControlledSource::Cccs => "cccs",
    }
}

fn kind_label(kind: EquationKind) -> &'static str {
    match kind {
        EquationKind::Ground => "ground",
        EquationKind::Voltage => "voltage",
        EquationKind::Current => "current",
    }
}

/// Equation name, or its number if the table does not know it.
fn equation(equations: &EquationTable, index: usize) -> String {
    equations
        .name(index)
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{index}"))
}

fn entry(matrix: &SparsePattern, handle: EntryHandle) -> String {
    match matrix.position(handle) {
        Some((row, col)) => format!("({row},{col})"),
        None => "gnd".to_string(),
    }
}

fn entries(matrix: &SparsePattern, handles: &[EntryHandle]) -> String {
    handles
        .iter()
        .map(|&h| entry(matrix, h))
        .collect::<Vec<_>>()
        .join(" ")
}

fn param_text(model: &Model, index: usize, state: &ParamState) -> String {
    let Some(values) = state.values() else {
        return "(unset)".to_string();
    };
    let ty = model.info().params()[index].ty;
    let value = if ty.is_array {
        Value::Array {
            kind: ty.kind,
            elements: values.to_vec(),
        }
    } else {
        match values.first() {
            Some(v) => Value::Scalar(v.clone()),
            None => return "(empty)".to_string(),
        }
    };
    let origin = if state.is_explicit() { "explicit" } else { "default" };
    format!("{value} ({origin})")
}

fn port_target(equations: &EquationTable, port: &Port) -> String {
    if port.is_null {
        return "null".to_string();
    }
    let invert = if port.invert { "~" } else { "" };
    if let Some(source) = &port.vsource {
        return format!("{invert}{source}");
    }
    if port.kind.is_differential() {
        format!(
            "{invert}({} {})",
            equation(equations, port.pos_node),
            equation(equations, port.neg_node)
        )
    } else {
        format!("{invert}{}", equation(equations, port.pos_node))
    }
}

fn render_instance(
    out: &mut fmt::Formatter<'_>,
    equations: &EquationTable,
    matrix: &SparsePattern,
    instance: &Instance,
) -> fmt::Result {
    writeln!(out, "  {}", instance.name())?;
    for ((i, j), port) in instance.ports() {
        let conn = &instance.connections[i];
        write!(
            out,
            "    {}[{j}] {} {}",
            conn.name,
            port.kind,
            port_target(equations, port)
        )?;
        if let Some(slot) = port.runtime.old_input {
            write!(out, " state={slot}")?;
        }
        if let Some(branch) = port.matrix.branch {
            write!(out, " branch={}", equation(equations, branch))?;
        }
        if let Some(ibranch) = port.matrix.ibranch
            && port.matrix.branch != Some(ibranch)
        {
            write!(out, " ibranch={}", equation(equations, ibranch))?;
        }
        writeln!(out)?;

        for (k, row) in port.matrix.inputs.iter().enumerate() {
            for (l, stamp) in row.iter().enumerate() {
                let Some(stamp) = stamp else { continue };
                writeln!(
                    out,
                    "      <- {}[{l}] {} {}",
                    instance.connections[k].name,
                    source_label(stamp.source()),
                    entries(matrix, &stamp.handles())
                )?;
            }
        }
    }
    Ok(())
}

/// Equations, parameters and per-port stamps of a set-up circuit.
pub struct Report<'a> {
    pub circuit: &'a Circuit,
    pub summary: &'a SetupSummary,
    pub matrix: &'a SparsePattern,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Report {
            circuit,
            summary,
            matrix,
        } = *self;
        writeln!(out, "Circuit: {}", circuit.title.as_deref().unwrap_or("(untitled)"))?;
        writeln!(out)?;

        writeln!(out, "Equations:")?;
        for (index, name, kind) in circuit.equations.iter() {
            writeln!(out, "  {index:>4}  {name:<20} {}", kind_label(kind))?;
        }
        writeln!(out)?;

        for model in &circuit.models {
            writeln!(out, "Model {} ({})", model.name(), model.info().name)?;
            for (index, state) in model.params().iter().enumerate() {
                let name = &model.info().params()[index].name;
                writeln!(out, "  {name} = {}", param_text(model, index, state))?;
            }
            for instance in model.instances() {
                render_instance(out, &circuit.equations, matrix, instance)?;
            }
            writeln!(out)?;
        }

        writeln!(
            out,
            "Setup: {} models, {} instances ({} skipped), {} branch equations, \
             {} matrix entries ({} structural), {} state slots",
            summary.models,
            summary.instances,
            summary.skipped_instances,
            summary.branch_equations,
            summary.matrix_entries,
            matrix.len(),
            summary.state_slots
        )
    }
}

pub fn render_report(circuit: &Circuit, summary: &SetupSummary, matrix: &SparsePattern) -> String {
    Report {
        circuit,
        summary,
        matrix,
    }
    .to_string()
}
