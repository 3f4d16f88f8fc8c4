//! Node and branch equation numbering.

use indexmap::IndexMap;

use crate::error::{Error, Result};

/// Equation number of the ground node.
pub const GROUND: usize = 0;

/// What an equation's unknown represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquationKind {
    /// The reference node; never part of the solved system.
    Ground,
    /// A node voltage.
    Voltage,
    /// An auxiliary branch current.
    Current,
}

/// Allocator of branch (current) equations.
///
/// Setup calls this to add an auxiliary current unknown for voltage-like
/// outputs and current-sensing inputs, and to locate the branch of an
/// independent voltage source referenced by name.
pub trait BranchAllocator {
    /// Create the branch equation `"{owner}#{suffix}"` and return its number.
    fn make_branch(&mut self, owner: &str, suffix: &str) -> Result<usize>;

    /// Find the branch equation of a named voltage source.
    fn find_branch(&self, name: &str) -> Option<usize>;
}

#[derive(Debug, Clone)]
struct Equation {
    name: String,
    kind: EquationKind,
}

/// Ordered table of node and branch equations.
///
/// Equation numbers are positions in the table; ground is always 0.
/// Names are matched case-insensitively.
#[derive(Debug, Clone)]
pub struct EquationTable {
    equations: IndexMap<String, Equation>,
    limit: Option<usize>,
}

impl Default for EquationTable {
    fn default() -> Self {
        Self::new()
    }
}

impl EquationTable {
    /// Create a table holding only the ground node.
    pub fn new() -> Self {
        let mut equations = IndexMap::new();
        equations.insert(
            "0".to_string(),
            Equation {
                name: "0".to_string(),
                kind: EquationKind::Ground,
            },
        );
        Self {
            equations,
            limit: None,
        }
    }

    /// Create a table that refuses to grow past `limit` equations.
    pub fn with_equation_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::new()
        }
    }

    fn key(name: &str) -> String {
        let key = name.to_lowercase();
        if key == "gnd" { "0".to_string() } else { key }
    }

    fn push(&mut self, key: String, name: String, kind: EquationKind) -> Result<usize> {
        if self.limit.is_some_and(|limit| self.equations.len() >= limit) {
            return Err(Error::OutOfMemory {
                what: format!("equation {name}"),
            });
        }
        let (index, _) = self.equations.insert_full(key, Equation { name, kind });
        Ok(index)
    }

    /// Get or create the voltage equation for a named node.
    pub fn node(&mut self, name: &str) -> Result<usize> {
        let key = Self::key(name);
        if let Some(index) = self.equations.get_index_of(&key) {
            return Ok(index);
        }
        self.push(key, name.to_string(), EquationKind::Voltage)
    }

    /// Look up a node without creating it.
    pub fn find_node(&self, name: &str) -> Option<usize> {
        self.equations
            .get_full(&Self::key(name))
            .filter(|(_, _, eq)| eq.kind != EquationKind::Current)
            .map(|(index, _, _)| index)
    }

    /// Add the branch equation of an independent voltage source.
    pub fn add_vsource(&mut self, name: &str) -> Result<usize> {
        self.make_branch(name, "branch")
    }

    /// Total number of equations, including ground.
    pub fn len(&self) -> usize {
        self.equations.len()
    }

    /// True when only ground is present.
    pub fn is_empty(&self) -> bool {
        self.equations.len() <= 1
    }

    /// Number of branch (current) equations.
    pub fn num_branches(&self) -> usize {
        self.equations
            .values()
            .filter(|eq| eq.kind == EquationKind::Current)
            .count()
    }

    /// Name of an equation.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.equations
            .get_index(index)
            .map(|(_, eq)| eq.name.as_str())
    }

    /// Kind of an equation.
    pub fn kind(&self, index: usize) -> Option<EquationKind> {
        self.equations.get_index(index).map(|(_, eq)| eq.kind)
    }

    /// Iterate over `(number, name, kind)` in equation order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str, EquationKind)> {
        self.equations
            .values()
            .enumerate()
            .map(|(i, eq)| (i, eq.name.as_str(), eq.kind))
    }
}

impl BranchAllocator for EquationTable {
    fn make_branch(&mut self, owner: &str, suffix: &str) -> Result<usize> {
        let name = format!("{owner}#{suffix}");
        let key = Self::key(&name);
        if self.equations.contains_key(&key) {
            return Err(Error::DuplicateEquation(name));
        }
        let index = self.push(key, name, EquationKind::Current)?;
        log::debug!("created branch equation {} for {}", index, owner);
        Ok(index)
    }

    fn find_branch(&self, name: &str) -> Option<usize> {
        self.equations
            .get_full(&Self::key(&format!("{name}#branch")))
            .filter(|(_, _, eq)| eq.kind == EquationKind::Current)
            .map(|(index, _, _)| index)
    }
}
