//! End-to-end setup tests through the public API.

use std::sync::Arc;

use mixsim_core::{DataKind, EquationTable, PortKind, Scalar, SparsePattern};
use mixsim_model::{
    CodeModelInfo, ConnInfo, Connection, ControlStamp, ControlledSource, Direction, Error,
    Instance, Model, ParamInfo, ParamState, Port, SetupConfig, setup_instance, setup_models,
};

fn port(kind: PortKind, pos: usize, neg: usize) -> Port {
    match kind {
        PortKind::VsourceCurrent => Port::vsource("vctl"),
        k if k.is_differential() => Port::nodes(k, pos, neg),
        k => Port::node(k, pos),
    }
}

fn expected(input: PortKind, output: PortKind) -> Option<ControlledSource> {
    use PortKind::*;
    let voltage_in = [Voltage, DiffVoltage, Conductance, DiffConductance];
    let current_in = [Current, DiffCurrent, VsourceCurrent, Resistance, DiffResistance];
    let voltage_out = [Voltage, DiffVoltage, Resistance, DiffResistance];
    let current_out = [Current, DiffCurrent, Conductance, DiffConductance];

    match (
        voltage_in.contains(&input),
        current_in.contains(&input),
        voltage_out.contains(&output),
        current_out.contains(&output),
    ) {
        (true, _, true, _) => Some(ControlledSource::Vcvs),
        (true, _, _, true) => Some(ControlledSource::Vccs),
        (_, true, true, _) => Some(ControlledSource::Ccvs),
        (_, true, _, true) => Some(ControlledSource::Cccs),
        _ => None,
    }
}

#[test]
fn test_voltage_out_current_in_gives_one_ccvs() {
    let mut equations = EquationTable::new();
    let a = equations.node("a").unwrap();
    let y = equations.node("y").unwrap();
    let mut inst = Instance::new(
        "a1",
        vec![
            Connection::input("in", vec![Port::node(PortKind::Current, a)]),
            Connection::output("out", vec![Port::node(PortKind::Voltage, y)]),
        ],
    );

    let mut matrix = SparsePattern::new();
    let summary = setup_instance(&mut inst, &mut matrix, &mut equations).unwrap();

    assert_eq!(summary.branch_equations, 2);
    assert_eq!(equations.num_branches(), 2);

    let out = &inst.connections[1].ports[0];
    let stamps: Vec<ControlStamp> =
        out.matrix.inputs.iter().flatten().flatten().copied().collect();
    assert_eq!(stamps.len(), 1);

    let branch = out.matrix.branch.unwrap();
    let ibranch = inst.connections[0].ports[0].matrix.ibranch.unwrap();
    assert_ne!(branch, ibranch);
    assert_eq!(
        stamps[0],
        ControlStamp::Ccvs {
            branch_ibranchcntl: matrix.get(branch, ibranch).unwrap()
        }
    );
}

#[test]
fn test_port_pair_table() {
    for input in PortKind::ANALOG {
        for output in PortKind::ANALOG {
            let mut equations = EquationTable::new();
            equations.add_vsource("vctl").unwrap();
            let (ip, in_) = (equations.node("ip").unwrap(), equations.node("in").unwrap());
            let (op, on) = (equations.node("op").unwrap(), equations.node("on").unwrap());

            let mut inst = Instance::new(
                "x",
                vec![
                    Connection::input("in", vec![port(input, ip, in_)]),
                    Connection::output("out", vec![port(output, op, on)]),
                ],
            );
            setup_instance(&mut inst, &mut SparsePattern::new(), &mut equations).unwrap();

            let found = inst.connections[1].ports[0].matrix.inputs[0][0].map(|s| s.source());
            assert_eq!(found, expected(input, output), "input {input}, output {output}");
        }
    }
}

#[test]
fn test_event_ports_never_stamp() {
    let mut equations = EquationTable::new();
    let mut inst = Instance::new(
        "u1",
        vec![
            Connection::input("in", vec![Port::node(PortKind::Digital, 1)]),
            Connection::output("out", vec![Port::node(PortKind::Voltage, 2)]),
        ],
    );
    let mut matrix = SparsePattern::new();
    setup_instance(&mut inst, &mut matrix, &mut equations).unwrap();
    assert_eq!(inst.connections[1].ports[0].matrix.inputs[0], vec![None]);
}

fn summer() -> Arc<CodeModelInfo> {
    Arc::new(
        CodeModelInfo::new("summer")
            .with_param(
                ParamInfo::array("in_gain", DataKind::Real, "in").with_default(Scalar::Real(1.0)),
            )
            .with_param(
                ParamInfo::scalar("out_gain", DataKind::Real).with_default(Scalar::Real(1.0)),
            )
            .with_param(ParamInfo::scalar("limit", DataKind::Boolean))
            .with_conn(ConnInfo::new("in", Direction::In, PortKind::Voltage).array())
            .with_conn(ConnInfo::new("out", Direction::Out, PortKind::Voltage)),
    )
}

#[test]
fn test_defaulting_keeps_explicit_values_in_any_order() {
    let instance_sets: [&[(&str, &str)]; 3] = [
        &[("a1", "[a b]"), ("a2", "[a b c]"), ("a3", "[a]")],
        &[("a3", "[a]"), ("a1", "[a b]"), ("a2", "[a b c]")],
        &[("a2", "[a b c]"), ("a3", "[a]"), ("a1", "[a b]")],
    ];

    for instances in instance_sets {
        let mut equations = EquationTable::new();
        let mut model = Model::new("m", summer());
        model.set_param_text("out_gain", "2.5").unwrap();
        for &(name, conn) in instances {
            let out = format!("y_{name}");
            model
                .add_instance_text(name, &[conn, out.as_str()], &mut equations)
                .unwrap();
        }

        setup_models(
            std::slice::from_mut(&mut model),
            &mut SparsePattern::new(),
            &mut equations,
            &SetupConfig::default(),
        )
        .unwrap();

        assert_eq!(
            model.param("out_gain"),
            Some(&ParamState::Explicit(vec![Scalar::Real(2.5)]))
        );
        assert_eq!(
            model.param("in_gain"),
            Some(&ParamState::Defaulted(vec![Scalar::Real(1.0); 3]))
        );
        assert_eq!(
            model.param("limit"),
            Some(&ParamState::Defaulted(vec![Scalar::Boolean(false)]))
        );
    }
}

#[test]
fn test_explicit_array_is_not_resized() {
    let mut equations = EquationTable::new();
    let mut model = Model::new("m", summer());
    model.set_param_text("in_gain", "[0.5]").unwrap();
    model
        .add_instance_text("a1", &["[a b c d]", "y"], &mut equations)
        .unwrap();
    model.default_model().unwrap();

    assert_eq!(model.params()[0].values(), Some(&[Scalar::Real(0.5)][..]));
}

#[test]
fn test_instance_after_setup_is_rejected() {
    let mut equations = EquationTable::new();
    let mut model = Model::new("m", summer());
    model
        .add_instance_text("a1", &["[a b]", "y"], &mut equations)
        .unwrap();

    let mut models = vec![model];
    setup_models(
        &mut models,
        &mut SparsePattern::new(),
        &mut equations,
        &SetupConfig::default(),
    )
    .unwrap();

    let err = models[0]
        .add_instance_text("a2", &["[a b c d e]", "z"], &mut equations)
        .unwrap_err();
    assert!(matches!(err, Error::ModelFrozen(_)));
    assert_eq!(models[0].params()[0].values().map(<[Scalar]>::len), Some(2));
}

#[test]
fn test_unknown_controlling_source_aborts_setup() {
    let info = Arc::new(
        CodeModelInfo::new("ammeter")
            .with_conn(ConnInfo::new("in", Direction::In, PortKind::VsourceCurrent))
            .with_conn(ConnInfo::new("out", Direction::Out, PortKind::Voltage)),
    );
    let mut equations = EquationTable::new();
    let mut model = Model::new("m", info);
    model
        .add_instance_text("a1", &["vsense", "y"], &mut equations)
        .unwrap();

    let err = setup_models(
        &mut [model],
        &mut SparsePattern::new(),
        &mut equations,
        &SetupConfig::default(),
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "a1: unknown controlling source vsense");
}

#[test]
fn test_matrix_exhaustion_is_out_of_memory() {
    let mut equations = EquationTable::new();
    let mut model = Model::new("m", summer());
    model
        .add_instance_text("a1", &["[a b]", "y"], &mut equations)
        .unwrap();

    let err = setup_models(
        &mut [model],
        &mut SparsePattern::with_capacity_limit(2),
        &mut equations,
        &SetupConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        Error::Core(mixsim_core::Error::OutOfMemory { .. })
    ));
}

#[test]
fn test_branch_exhaustion_is_out_of_memory() {
    let mut equations = EquationTable::with_equation_limit(3);
    let mut model = Model::new("m", summer());
    model
        .add_instance_text("a1", &["[a]", "y"], &mut equations)
        .unwrap();

    let err = setup_models(
        &mut [model],
        &mut SparsePattern::new(),
        &mut equations,
        &SetupConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        Error::Core(mixsim_core::Error::OutOfMemory { .. })
    ));
}

#[test]
fn test_loaded_gain_block() {
    // y = 2 * a, as the Jacobian of a voltage output driven by a voltage input.
    let mut equations = EquationTable::new();
    let mut model = Model::new("m", summer());
    model
        .add_instance_text("a1", &["[a]", "y"], &mut equations)
        .unwrap();
    let mut matrix = SparsePattern::new();
    let mut models = [model];
    setup_models(&mut models, &mut matrix, &mut equations, &SetupConfig::default()).unwrap();

    let out = &models[0].instances()[0].connections[1].ports[0];
    out.matrix.branch_entries.unwrap().load_incidence(&mut matrix);
    out.matrix.inputs[0][0].unwrap().load(&mut matrix, 2.0);

    let a = equations.find_node("a").unwrap();
    let y = equations.find_node("y").unwrap();
    let b = out.matrix.branch.unwrap();
    let dense = matrix.to_dense(equations.len() - 1);

    assert_eq!(dense[(y - 1, b - 1)], 1.0);
    assert_eq!(dense[(b - 1, y - 1)], 1.0);
    assert_eq!(dense[(b - 1, a - 1)], -2.0);
    assert_eq!(dense[(a - 1, b - 1)], 0.0);
}

#[test]
fn test_state_slots_span_models() {
    let mut equations = EquationTable::new();
    let mut first = Model::new("m1", summer());
    first
        .add_instance_text("a1", &["[a b]", "y1"], &mut equations)
        .unwrap();
    let mut second = Model::new("m2", summer());
    second
        .add_instance_text("a2", &["[c]", "y2"], &mut equations)
        .unwrap();

    let mut models = [first, second];
    let config = SetupConfig {
        first_state: 5,
        ..SetupConfig::default()
    };
    let summary =
        setup_models(&mut models, &mut SparsePattern::new(), &mut equations, &config).unwrap();

    assert_eq!(summary.models, 2);
    assert_eq!(summary.state_slots, 3);
    let old_input =
        |m: usize, p: usize| models[m].instances()[0].connections[0].ports[p].runtime.old_input;
    assert_eq!(old_input(0, 0), Some(5));
    assert_eq!(old_input(0, 1), Some(6));
    assert_eq!(old_input(1, 0), Some(7));
}

#[test]
fn test_event_instances_are_skipped() {
    let info = Arc::new(
        CodeModelInfo::new("inverter")
            .with_conn(ConnInfo::new("in", Direction::In, PortKind::Digital))
            .with_conn(ConnInfo::new("out", Direction::Out, PortKind::Digital)),
    );
    let mut equations = EquationTable::new();
    let mut model = Model::new("m", info);
    model
        .add_instance_text("u1", &["a", "~y"], &mut equations)
        .unwrap();

    let mut models = [model];
    let summary = setup_models(
        &mut models,
        &mut SparsePattern::new(),
        &mut equations,
        &SetupConfig::default(),
    )
    .unwrap();

    assert_eq!(summary.instances, 1);
    assert_eq!(summary.skipped_instances, 1);
    assert_eq!(summary.state_slots, 0);
    assert!(models[0].instances()[0].connections[1].ports[0].invert);
}

#[test]
fn test_config_from_json() {
    let config: SetupConfig = serde_json::from_str(r#"{ "first_state": 12 }"#).unwrap();
    assert_eq!(config.first_state, 12);
    assert!(config.ac_runtime);
    assert!(!config.allocate_event_instances);

    let config: SetupConfig =
        serde_json::from_str(r#"{ "ac_runtime": false, "allocate_event_instances": true }"#)
            .unwrap();
    assert!(!config.ac_runtime);
    assert!(config.allocate_event_instances);
}
