//! Sparse matrix entry allocation.
//!
//! Setup never stores matrix values itself. It asks a [`MatrixAllocator`]
//! for a handle to the entry at each (row, column) it will load, and the
//! load phase later adds into those handles.

use indexmap::IndexSet;
use nalgebra::DMatrix;

use crate::node::GROUND;

/// Handle to one entry of the simulation matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryHandle(usize);

impl EntryHandle {
    /// Shared sink for entries in the ground row or column.
    pub const TRASH: EntryHandle = EntryHandle(0);

    /// Check if this handle points at the ground sink.
    pub fn is_trash(self) -> bool {
        self == Self::TRASH
    }
}

/// Allocator of matrix entries keyed by equation numbers.
pub trait MatrixAllocator {
    /// Get a handle to the entry at `(row, col)`, creating it if needed.
    ///
    /// Returns `None` when the matrix cannot grow any further.
    fn make_entry(&mut self, row: usize, col: usize) -> Option<EntryHandle>;
}

/// Structural pattern of a sparse matrix plus a value per entry.
///
/// Row and column numbers are equation numbers, with ground (0) excluded
/// from the structure: any request touching ground gets
/// [`EntryHandle::TRASH`].
#[derive(Debug, Clone)]
pub struct SparsePattern {
    /// Structural entries in creation order; handle `k` is position `k - 1`.
    positions: IndexSet<(usize, usize)>,
    /// Values indexed by handle, slot 0 is the trash sink.
    values: Vec<f64>,
    /// Maximum number of structural entries, if bounded.
    limit: Option<usize>,
    /// Number of `make_entry` calls served.
    requests: usize,
}

impl Default for SparsePattern {
    fn default() -> Self {
        Self::new()
    }
}

impl SparsePattern {
    /// Create an unbounded, empty pattern.
    pub fn new() -> Self {
        Self {
            positions: IndexSet::new(),
            values: vec![0.0],
            limit: None,
            requests: 0,
        }
    }

    /// Create a pattern that fails allocation past `limit` structural entries.
    pub fn with_capacity_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::new()
        }
    }

    /// Number of structural (non-ground) entries.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of entry requests served, including ground and repeated ones.
    pub fn requests(&self) -> usize {
        self.requests
    }

    /// Find the handle of an existing entry.
    pub fn get(&self, row: usize, col: usize) -> Option<EntryHandle> {
        if row == GROUND || col == GROUND {
            return Some(EntryHandle::TRASH);
        }
        self.positions
            .get_index_of(&(row, col))
            .map(|i| EntryHandle(i + 1))
    }

    /// Position of a handle, `None` for the trash sink.
    pub fn position(&self, handle: EntryHandle) -> Option<(usize, usize)> {
        if handle.is_trash() {
            return None;
        }
        self.positions.get_index(handle.0 - 1).copied()
    }

    /// Add a value into an entry.
    pub fn add(&mut self, handle: EntryHandle, value: f64) {
        if let Some(slot) = self.values.get_mut(handle.0) {
            *slot += value;
        }
    }

    /// Current value of an entry.
    pub fn value(&self, handle: EntryHandle) -> f64 {
        self.values.get(handle.0).copied().unwrap_or(0.0)
    }

    /// Zero all values, keeping the structure.
    pub fn clear_values(&mut self) {
        self.values.fill(0.0);
    }

    /// Assemble a dense matrix over the non-ground equations.
    ///
    /// Equation `k` maps to row/column `k - 1`. The matrix is at least
    /// `size` square and grows to cover every structural entry.
    pub fn to_dense(&self, size: usize) -> DMatrix<f64> {
        let n = self
            .positions
            .iter()
            .map(|&(r, c)| r.max(c))
            .max()
            .unwrap_or(0)
            .max(size);
        let mut dense = DMatrix::zeros(n, n);
        for (i, &(r, c)) in self.positions.iter().enumerate() {
            dense[(r - 1, c - 1)] += self.values[i + 1];
        }
        dense
    }
}

impl MatrixAllocator for SparsePattern {
    fn make_entry(&mut self, row: usize, col: usize) -> Option<EntryHandle> {
        self.requests += 1;
        if row == GROUND || col == GROUND {
            return Some(EntryHandle::TRASH);
        }
        if let Some(index) = self.positions.get_index_of(&(row, col)) {
            return Some(EntryHandle(index + 1));
        }
        if self.limit.is_some_and(|limit| self.positions.len() >= limit) {
            return None;
        }
        let (index, _) = self.positions.insert_full((row, col));
        self.values.push(0.0);
        Some(EntryHandle(index + 1))
    }
}
