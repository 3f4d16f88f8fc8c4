//! Static code-model definitions: declared parameters and connections.

use mixsim_core::{DataKind, PortKind, Scalar, ValueType};
use serde::{Deserialize, Serialize};

/// Declared direction of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
    InOut,
}

impl Direction {
    pub fn is_input(self) -> bool {
        matches!(self, Direction::In | Direction::InOut)
    }

    pub fn is_output(self) -> bool {
        matches!(self, Direction::Out | Direction::InOut)
    }
}

/// A declared model parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamInfo {
    pub name: String,
    pub ty: ValueType,
    /// Static default; the kind's zero value when absent.
    pub default: Option<Scalar>,
    /// Connection whose port count sizes a defaulted array parameter.
    pub conn_ref: Option<String>,
}

impl ParamInfo {
    /// Declare a scalar parameter.
    pub fn scalar(name: impl Into<String>, kind: DataKind) -> Self {
        Self {
            name: name.into(),
            ty: ValueType::scalar(kind),
            default: None,
            conn_ref: None,
        }
    }

    /// Declare an array parameter sized by the named connection.
    pub fn array(name: impl Into<String>, kind: DataKind, conn_ref: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ValueType::array(kind),
            default: None,
            conn_ref: Some(conn_ref.into()),
        }
    }

    pub fn with_default(mut self, default: Scalar) -> Self {
        self.default = Some(default);
        self
    }

    /// The element used when the parameter is defaulted.
    pub fn default_element(&self) -> Scalar {
        self.default
            .clone()
            .unwrap_or_else(|| self.ty.kind.zero())
    }
}

/// A declared connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnInfo {
    pub name: String,
    pub direction: Direction,
    pub default_kind: PortKind,
    pub is_array: bool,
    pub null_allowed: bool,
}

impl ConnInfo {
    pub fn new(name: impl Into<String>, direction: Direction, default_kind: PortKind) -> Self {
        Self {
            name: name.into(),
            direction,
            default_kind,
            is_array: false,
            null_allowed: false,
        }
    }

    pub fn array(mut self) -> Self {
        self.is_array = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.null_allowed = true;
        self
    }
}

/// The interface of a code model, shared by all its models.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CodeModelInfo {
    pub name: String,
    pub description: String,
    params: Vec<ParamInfo>,
    conns: Vec<ConnInfo>,
}

impl CodeModelInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_param(mut self, param: ParamInfo) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_conn(mut self, conn: ConnInfo) -> Self {
        self.conns.push(conn);
        self
    }

    pub fn params(&self) -> &[ParamInfo] {
        &self.params
    }

    pub fn conns(&self) -> &[ConnInfo] {
        &self.conns
    }

    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.params
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn conn_index(&self, name: &str) -> Option<usize> {
        self.conns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }
}
