//! Registry of event node types by name.

use std::sync::OnceLock;

use indexmap::IndexMap;

use crate::digital::DigitalType;
use crate::error::{Error, Result};
use crate::int::IntType;
use crate::node_type::EventNodeType;
use crate::real::RealType;

/// Ordered table of event node types.
///
/// Indices are stable: a type keeps the index it was registered at.
#[derive(Debug, Default)]
pub struct EventTypeRegistry {
    types: IndexMap<String, Box<dyn EventNodeType>>,
}

impl EventTypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `real`, `int` and `digital`, in that order.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for node_type in [
            Box::new(RealType) as Box<dyn EventNodeType>,
            Box::new(IntType),
            Box::new(DigitalType),
        ] {
            registry.types.insert(node_type.name().to_string(), node_type);
        }
        registry
    }

    /// Add a node type, returning its index.
    pub fn register(&mut self, node_type: Box<dyn EventNodeType>) -> Result<usize> {
        let name = node_type.name().to_string();
        if self.types.contains_key(&name) {
            return Err(Error::DuplicateType(name));
        }
        log::debug!("registered event node type {} at {}", name, self.types.len());
        let (index, _) = self.types.insert_full(name, node_type);
        Ok(index)
    }

    /// Look up a node type by name.
    pub fn get(&self, name: &str) -> Result<&dyn EventNodeType> {
        self.types
            .get(name)
            .map(|t| t.as_ref())
            .ok_or_else(|| Error::UnknownType(name.to_string()))
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.types.get_index_of(name)
    }

    pub fn by_index(&self, index: usize) -> Option<&dyn EventNodeType> {
        self.types.get_index(index).map(|(_, t)| t.as_ref())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn EventNodeType> {
        self.types.values().map(|t| t.as_ref())
    }
}

/// The process-wide registry of built-in types.
pub fn global() -> &'static EventTypeRegistry {
    static GLOBAL: OnceLock<EventTypeRegistry> = OnceLock::new();
    GLOBAL.get_or_init(EventTypeRegistry::builtin)
}
