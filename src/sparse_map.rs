//! Sparse grid storage keyed by integer coordinates.
//!
//! Only occupied coordinates are stored. Iteration follows raster order
//! (row-major), which is what serializers and renderers expect.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// A grid coordinate (column, row).
///
/// Ordering is row-major: rows compare first, then columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Coord {
    pub col: i32,
    pub row: i32,
}

impl Coord {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }
}

impl Ord for Coord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row.cmp(&other.row).then(self.col.cmp(&other.col))
    }
}

impl PartialOrd for Coord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

impl From<(i32, i32)> for Coord {
    fn from((col, row): (i32, i32)) -> Self {
        Self { col, row }
    }
}

/// Payload stored per grid coordinate.
///
/// `Default` is the empty cell handed out by [`SparseMap::cell_at`] for
/// unoccupied positions.
pub trait MergeCell: Clone + Default {
    /// Combine `other` into `self`.
    ///
    /// Must be idempotent: merging the same cell twice leaves the same result
    /// as merging it once.
    fn merge(&mut self, other: &Self);

    /// Whether the cell carries no content.
    fn is_empty(&self) -> bool;
}

/// An unbounded grid that only stores occupied coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMap<C> {
    cells: BTreeMap<Coord, C>,
}

impl<C> Default for SparseMap<C> {
    fn default() -> Self {
        Self { cells: BTreeMap::new() }
    }
}

impl<C: MergeCell> SparseMap<C> {
    /// Create an empty grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a cell is stored at `pos`.
    pub fn contains(&self, pos: Coord) -> bool {
        self.cells.contains_key(&pos)
    }

    /// Read-only access to the cell at `pos`, if any.
    pub fn get(&self, pos: Coord) -> Option<&C> {
        self.cells.get(&pos)
    }

    /// Mutable access to the cell at `pos`, inserting an empty cell first if
    /// nothing is stored there.
    pub fn cell_at(&mut self, pos: Coord) -> &mut C {
        self.cells.entry(pos).or_default()
    }

    /// Replace whatever is stored at `pos` with a copy of `cell`.
    pub fn overwrite(&mut self, pos: Coord, cell: &C) -> &mut C {
        let slot = self.cells.entry(pos).or_default();
        *slot = cell.clone();
        slot
    }

    /// Merge `cell` into the cell at `pos` using [`MergeCell::merge`].
    ///
    /// Behaves like [`overwrite`](Self::overwrite) when `pos` is unoccupied.
    pub fn merge(&mut self, pos: Coord, cell: &C) -> &mut C {
        self.merge_with(pos, cell, C::merge)
    }

    /// Merge `cell` into the cell at `pos` with a caller-supplied combine
    /// function. The function must be idempotent for `merge` semantics to
    /// hold.
    pub fn merge_with<F>(&mut self, pos: Coord, cell: &C, combine: F) -> &mut C
    where
        F: FnOnce(&mut C, &C),
    {
        use std::collections::btree_map::Entry;

        match self.cells.entry(pos) {
            Entry::Vacant(slot) => slot.insert(cell.clone()),
            Entry::Occupied(slot) => {
                let existing = slot.into_mut();
                combine(existing, cell);
                existing
            }
        }
    }

    /// Delete the cell at `pos`, returning it. No-op if nothing is stored.
    pub fn remove(&mut self, pos: Coord) -> Option<C> {
        self.cells.remove(&pos)
    }

    /// Drop the cell at `pos` if it has become empty.
    pub fn prune(&mut self, pos: Coord) {
        if self.cells.get(&pos).is_some_and(|cell| cell.is_empty()) {
            self.cells.remove(&pos);
        }
    }

    /// Iterate stored cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Coord, &C)> + '_ {
        self.cells.iter().map(|(pos, cell)| (*pos, cell))
    }

    /// Number of occupied coordinates.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Remove all cells.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Smallest rectangle covering all occupied coordinates, as
    /// `(top_left, bottom_right)` inclusive.
    pub fn bounds(&self) -> Option<(Coord, Coord)> {
        let mut keys = self.cells.keys();
        let first = *keys.next()?;
        let (mut min, mut max) = (first, first);
        for pos in keys {
            min.col = min.col.min(pos.col);
            max.col = max.col.max(pos.col);
            min.row = min.row.min(pos.row);
            max.row = max.row.max(pos.row);
        }
        Some((min, max))
    }
}
