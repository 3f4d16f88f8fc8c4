//! Models: parameter binding and defaulting.

use std::sync::Arc;

use mixsim_core::{EquationTable, Scalar, Value};
use mixsim_parser::{ConnectionSpec, Lexer, parse_connection, parse_value};

use crate::definition::CodeModelInfo;
use crate::error::{Error, Result};
use crate::instance::Instance;

/// State of one parameter slot.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamState {
    /// Not given on the model card.
    Unset,
    /// Bound from a model card value.
    Explicit(Vec<Scalar>),
    /// Filled by [`Model::default_model`].
    Defaulted(Vec<Scalar>),
}

impl ParamState {
    pub fn is_explicit(&self) -> bool {
        matches!(self, ParamState::Explicit(_))
    }

    /// Elements of the slot, `None` while unset.
    pub fn values(&self) -> Option<&[Scalar]> {
        match self {
            ParamState::Unset => None,
            ParamState::Explicit(v) | ParamState::Defaulted(v) => Some(v),
        }
    }
}

/// A shared template for a group of code-model instances.
///
/// Instances must all be linked before [`Model::default_model`] runs;
/// defaulting sizes array parameters from their connections and freezes
/// the instance list.
#[derive(Debug, Clone)]
pub struct Model {
    name: String,
    info: Arc<CodeModelInfo>,
    params: Vec<ParamState>,
    instances: Vec<Instance>,
    frozen: bool,
}

impl Model {
    pub fn new(name: impl Into<String>, info: Arc<CodeModelInfo>) -> Self {
        let params = vec![ParamState::Unset; info.params().len()];
        Self {
            name: name.into(),
            info,
            params,
            instances: Vec::new(),
            frozen: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn info(&self) -> &CodeModelInfo {
        &self.info
    }

    pub fn params(&self) -> &[ParamState] {
        &self.params
    }

    /// Look up a parameter slot by name.
    pub fn param(&self, name: &str) -> Option<&ParamState> {
        self.info.param_index(name).map(|i| &self.params[i])
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn instances_mut(&mut self) -> &mut [Instance] {
        &mut self.instances
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Link an instance to this model.
    pub fn add_instance(&mut self, instance: Instance) -> Result<()> {
        if self.frozen {
            return Err(Error::ModelFrozen(self.name.clone()));
        }
        self.instances.push(instance);
        Ok(())
    }

    /// Parse one connection text per declared connection and link the
    /// resulting instance.
    pub fn add_instance_text(
        &mut self,
        name: &str,
        connections: &[&str],
        equations: &mut EquationTable,
    ) -> Result<()> {
        if self.frozen {
            return Err(Error::ModelFrozen(self.name.clone()));
        }
        let conns = self.info.conns();
        if connections.len() != conns.len() {
            return Err(Error::ConnectionCount {
                instance: name.to_string(),
                expected: conns.len(),
                found: connections.len(),
            });
        }

        let specs = conns
            .iter()
            .zip(connections)
            .map(|(conn, text)| -> mixsim_parser::Result<ConnectionSpec> {
                let mut lexer = Lexer::new(text);
                let spec = parse_connection(&mut lexer, conn.default_kind, conn.is_array)?;
                lexer.finish()?;
                Ok(spec)
            })
            .collect::<mixsim_parser::Result<Vec<_>>>()?;

        let instance = Instance::from_specs(name, &self.info, &specs, equations)?;
        self.add_instance(instance)
    }

    /// Bind an explicit value to parameter `index`.
    pub fn bind_parameter(&mut self, index: usize, value: &Value) -> Result<()> {
        let count = self.params.len();
        let Some(info) = self.info.params().get(index) else {
            return Err(Error::BadParameter { index, count });
        };
        if self.frozen {
            return Err(Error::ModelFrozen(self.name.clone()));
        }
        if value.value_type() != info.ty {
            return Err(Error::KindMismatch {
                param: info.name.clone(),
                expected: info.ty,
                found: value.value_type(),
            });
        }
        self.params[index] = ParamState::Explicit(value.elements().to_vec());
        Ok(())
    }

    /// Parse `text` as the declared type of parameter `name` and bind it.
    pub fn set_param_text(&mut self, name: &str, text: &str) -> Result<()> {
        let index = self
            .info
            .param_index(name)
            .ok_or_else(|| Error::UnknownParameter(name.to_string()))?;
        let ty = self.info.params()[index].ty;
        let mut lexer = Lexer::new(text);
        let value = parse_value(&mut lexer, ty)?;
        lexer.finish()?;
        self.bind_parameter(index, &value)
    }

    /// Fill every unset parameter from its static default and freeze the
    /// model.
    ///
    /// Array parameters get one element per port of the largest instance
    /// connection they are sized by. Explicit values are never touched.
    /// Calling this again on a frozen model is a no-op.
    pub fn default_model(&mut self) -> Result<()> {
        if self.frozen {
            return Ok(());
        }

        for (index, param) in self.info.params().iter().enumerate() {
            if self.params[index] != ParamState::Unset {
                continue;
            }

            let size = if param.ty.is_array {
                let conn_ref = param
                    .conn_ref
                    .as_deref()
                    .ok_or_else(|| Error::MissingConnectionRef(param.name.clone()))?;
                let conn = self.info.conn_index(conn_ref).ok_or_else(|| {
                    Error::UnknownConnection {
                        param: param.name.clone(),
                        connection: conn_ref.to_string(),
                    }
                })?;
                self.instances
                    .iter()
                    .filter_map(|inst| inst.connections.get(conn))
                    .map(|c| c.size())
                    .max()
                    .unwrap_or(0)
            } else {
                1
            };

            let element = param.default_element();
            if element.kind() != param.ty.kind {
                return Err(Error::KindMismatch {
                    param: param.name.clone(),
                    expected: param.ty,
                    found: mixsim_core::ValueType::scalar(element.kind()),
                });
            }

            log::debug!(
                "model {}: defaulted {} to {} element(s) of {}",
                self.name,
                param.name,
                size,
                element
            );
            self.params[index] = ParamState::Defaulted(vec![element; size]);
        }

        self.frozen = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{ConnInfo, Direction, ParamInfo};
    use mixsim_core::{DataKind, PortKind};

    fn info() -> Arc<CodeModelInfo> {
        Arc::new(
            CodeModelInfo::new("summer")
                .with_param(
                    ParamInfo::array("in_gain", DataKind::Real, "in")
                        .with_default(Scalar::Real(1.0)),
                )
                .with_param(ParamInfo::scalar("out_offset", DataKind::Real))
                .with_param(ParamInfo::scalar("label", DataKind::String))
                .with_conn(ConnInfo::new("in", Direction::In, PortKind::Voltage).array())
                .with_conn(ConnInfo::new("out", Direction::Out, PortKind::Voltage)),
        )
    }

    #[test]
    fn test_bind_parameter() {
        let mut model = Model::new("m1", info());
        model.set_param_text("out_offset", "2.5k").unwrap();
        assert_eq!(
            model.param("OUT_OFFSET"),
            Some(&ParamState::Explicit(vec![Scalar::Real(2500.0)]))
        );
    }

    #[test]
    fn test_bind_bad_index() {
        let mut model = Model::new("m1", info());
        let err = model
            .bind_parameter(7, &Value::scalar(Scalar::Real(1.0)))
            .unwrap_err();
        assert!(matches!(err, Error::BadParameter { index: 7, count: 3 }));
    }

    #[test]
    fn test_bind_kind_mismatch() {
        let mut model = Model::new("m1", info());
        let err = model
            .bind_parameter(1, &Value::scalar(Scalar::Integer(1)))
            .unwrap_err();
        assert!(matches!(err, Error::KindMismatch { .. }));

        let err = model
            .bind_parameter(0, &Value::scalar(Scalar::Real(1.0)))
            .unwrap_err();
        assert!(matches!(err, Error::KindMismatch { .. }));
    }

    #[test]
    fn test_unknown_parameter_text() {
        let mut model = Model::new("m1", info());
        assert!(matches!(
            model.set_param_text("gain", "1").unwrap_err(),
            Error::UnknownParameter(_)
        ));
        assert!(matches!(
            model.set_param_text("out_offset", "abc").unwrap_err(),
            Error::Parse(_)
        ));
    }

    #[test]
    fn test_trailing_param_text_rejected() {
        let mut model = Model::new("m1", info());
        let err = model
            .set_param_text("out_offset", "1.0 garbage [ 7")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Parse(mixsim_parser::Error::TrailingText(ref rest)) if rest == "garbage [ 7"
        ));
        assert_eq!(model.param("out_offset"), Some(&ParamState::Unset));
    }

    #[test]
    fn test_trailing_connection_text_rejected() {
        let mut model = Model::new("m1", info());
        let mut equations = EquationTable::new();
        let err = model
            .add_instance_text("a1", &["[a]", "out extra_node %vd x y"], &mut equations)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Parse(mixsim_parser::Error::TrailingText(ref rest))
                if rest == "extra_node %vd x y"
        ));
        assert!(model.instances().is_empty());
    }

    #[test]
    fn test_default_model() {
        let mut model = Model::new("m1", info());
        let mut equations = EquationTable::new();
        model
            .add_instance_text("a1", &["[a b]", "y1"], &mut equations)
            .unwrap();
        model
            .add_instance_text("a2", &["[a b c d]", "y2"], &mut equations)
            .unwrap();
        model.set_param_text("label", "\"mix\"").unwrap();
        model.default_model().unwrap();

        assert!(model.is_frozen());
        assert_eq!(
            model.params()[0],
            ParamState::Defaulted(vec![Scalar::Real(1.0); 4])
        );
        assert_eq!(model.params()[1], ParamState::Defaulted(vec![Scalar::Real(0.0)]));
        assert_eq!(
            model.params()[2],
            ParamState::Explicit(vec![Scalar::String("mix".into())])
        );
    }

    #[test]
    fn test_array_without_instances_is_empty() {
        let mut model = Model::new("m1", info());
        model.default_model().unwrap();
        assert_eq!(model.params()[0].values(), Some(&[][..]));
    }

    #[test]
    fn test_frozen_model() {
        let mut model = Model::new("m1", info());
        model.default_model().unwrap();
        let err = model
            .add_instance_text("a1", &["[a]", "y"], &mut EquationTable::new())
            .unwrap_err();
        assert!(matches!(err, Error::ModelFrozen(_)));
        assert!(matches!(
            model.set_param_text("out_offset", "1").unwrap_err(),
            Error::ModelFrozen(_)
        ));
    }

    #[test]
    fn test_missing_connection_ref() {
        let info = Arc::new(CodeModelInfo::new("bad").with_param(ParamInfo {
            conn_ref: None,
            ..ParamInfo::array("table", DataKind::Integer, "x")
        }));
        let mut model = Model::new("m1", info);
        assert!(matches!(
            model.default_model().unwrap_err(),
            Error::MissingConnectionRef(_)
        ));

        let info = Arc::new(
            CodeModelInfo::new("bad").with_param(ParamInfo::array("table", DataKind::Integer, "x")),
        );
        let mut model = Model::new("m1", info);
        assert!(matches!(
            model.default_model().unwrap_err(),
            Error::UnknownConnection { .. }
        ));
    }

    #[test]
    fn test_default_kind_mismatch() {
        let info = Arc::new(
            CodeModelInfo::new("bad")
                .with_param(
                    ParamInfo::scalar("n", DataKind::Integer).with_default(Scalar::Real(1.5)),
                ),
        );
        let mut model = Model::new("m1", info);
        assert!(matches!(
            model.default_model().unwrap_err(),
            Error::KindMismatch { .. }
        ));
    }
}
