//! JSON circuit descriptions.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use mixsim_core::{EquationTable, PortKind, ValueType};
use mixsim_model::{CodeModelInfo, ConnInfo, Direction, Model, ParamInfo};
use mixsim_parser::{Lexer, parse_value};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CircuitFile {
    #[serde(default)]
    pub title: Option<String>,
    /// Independent voltage sources whose currents `vnam` ports may sense.
    #[serde(default)]
    pub vsources: Vec<String>,
    pub code_models: Vec<CodeModelDef>,
    pub models: Vec<ModelDef>,
    #[serde(default)]
    pub instances: Vec<InstanceDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodeModelDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub params: Vec<ParamDef>,
    #[serde(default)]
    pub conns: Vec<ConnDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamDef {
    pub name: String,
    /// Declared type, e.g. `real` or `int[]`.
    #[serde(rename = "type")]
    pub ty: String,
    /// Default element, in card syntax.
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub conn_ref: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnDef {
    pub name: String,
    pub direction: Direction,
    /// Default port kind prefix, e.g. `v` or `vnam`.
    pub kind: String,
    #[serde(default)]
    pub array: bool,
    #[serde(default)]
    pub null_allowed: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelDef {
    pub name: String,
    pub code_model: String,
    /// Parameter text by name.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstanceDef {
    pub name: String,
    pub model: String,
    /// Connection text, one per declared connection.
    pub connections: Vec<String>,
}

/// A circuit ready for setup.
#[derive(Debug)]
pub struct Circuit {
    pub title: Option<String>,
    pub equations: EquationTable,
    pub models: Vec<Model>,
}

impl ParamDef {
    fn to_info(&self) -> Result<ParamInfo> {
        let ty: ValueType = self
            .ty
            .parse()
            .with_context(|| format!("parameter {}", self.name))?;
        let default = match &self.default {
            Some(text) => {
                let mut lexer = Lexer::new(text);
                let value = parse_value(&mut lexer, ValueType::scalar(ty.kind))
                    .and_then(|value| lexer.finish().map(|()| value))
                    .with_context(|| format!("default of parameter {}", self.name))?;
                value.elements().first().cloned()
            }
            None => None,
        };
        Ok(ParamInfo {
            name: self.name.clone(),
            ty,
            default,
            conn_ref: self.conn_ref.clone(),
        })
    }
}

impl ConnDef {
    fn to_info(&self) -> Result<ConnInfo> {
        let default_kind = PortKind::from_prefix(&self.kind)
            .ok_or_else(|| anyhow!("connection {}: unknown port kind {}", self.name, self.kind))?;
        Ok(ConnInfo {
            name: self.name.clone(),
            direction: self.direction,
            default_kind,
            is_array: self.array,
            null_allowed: self.null_allowed,
        })
    }
}

impl CodeModelDef {
    fn to_info(&self) -> Result<CodeModelInfo> {
        let mut info = CodeModelInfo::new(&self.name).with_description(&self.description);
        for param in &self.params {
            info = info.with_param(param.to_info()?);
        }
        for conn in &self.conns {
            info = info.with_conn(conn.to_info()?);
        }
        Ok(info)
    }
}

impl CircuitFile {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("invalid circuit description")
    }

    /// Number nodes, bind model parameters and link instances.
    pub fn build(&self) -> Result<Circuit> {
        let mut equations = EquationTable::new();
        for source in &self.vsources {
            equations
                .add_vsource(source)
                .with_context(|| format!("voltage source {source}"))?;
        }

        let mut infos: BTreeMap<&str, Arc<CodeModelInfo>> = BTreeMap::new();
        for def in &self.code_models {
            let info = def
                .to_info()
                .with_context(|| format!("code model {}", def.name))?;
            if infos.insert(def.name.as_str(), Arc::new(info)).is_some() {
                bail!("code model {} defined twice", def.name);
            }
        }

        let mut models: Vec<Model> = Vec::with_capacity(self.models.len());
        for def in &self.models {
            let info = infos
                .get(def.code_model.as_str())
                .ok_or_else(|| {
                    anyhow!("model {}: unknown code model {}", def.name, def.code_model)
                })?;
            if models.iter().any(|m| m.name() == def.name) {
                bail!("model {} defined twice", def.name);
            }
            let mut model = Model::new(&def.name, Arc::clone(info));
            for (name, text) in &def.params {
                model
                    .set_param_text(name, text)
                    .with_context(|| format!("model {}: parameter {name} = {text}", def.name))?;
            }
            models.push(model);
        }

        for def in &self.instances {
            let model = models
                .iter_mut()
                .find(|m| m.name() == def.model)
                .ok_or_else(|| anyhow!("instance {}: unknown model {}", def.name, def.model))?;
            let connections: Vec<&str> = def.connections.iter().map(String::as_str).collect();
            model
                .add_instance_text(&def.name, &connections, &mut equations)
                .with_context(|| format!("instance {}", def.name))?;
        }

        log::info!(
            "built circuit: {} models, {} instances, {} equations",
            models.len(),
            self.instances.len(),
            equations.len()
        );
        Ok(Circuit {
            title: self.title.clone(),
            equations,
            models,
        })
    }
}
