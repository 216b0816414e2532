//! Pattern document: the stitch grid and its thread accounting.
//!
//! Every stitch lifecycle event goes through here so that the grid and the
//! usage tracker never disagree: placing merges a cell and acquires the
//! stitch's color, removing releases it and prunes the cell, recoloring
//! releases and re-acquires.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::color::Color;
use crate::registry::{ColorUsageTracker, UsageError};
use crate::sparse_map::{Coord, SparseMap};
use crate::stitch::{Element, ElementId, Stitch, StitchCell, StitchKind, WeightTable};

/// Error from a pattern edit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum PatternError {
    /// No stitch with this id is placed
    #[error("no stitch {0} in pattern")]
    UnknownStitch(ElementId),
    #[error(transparent)]
    Usage(#[from] UsageError),
}

#[derive(Debug, Clone)]
struct Placed {
    pos: Coord,
    stitch: Stitch,
}

/// A cross-stitch pattern document.
#[derive(Debug, Default)]
pub struct Pattern {
    grid: SparseMap<StitchCell>,
    usage: ColorUsageTracker,
    stitches: HashMap<ElementId, Placed>,
    weights: WeightTable,
    next_id: u64,
}

impl Pattern {
    /// Create an empty pattern using the given stitch weights.
    pub fn new(weights: WeightTable) -> Self {
        Self { weights, ..Default::default() }
    }

    /// Place a stitch. `None` uses the fallback color.
    ///
    /// # Errors
    ///
    /// Fails without placing anything if the color clashes with a different
    /// color already registered under the same palette and id.
    pub fn place(
        &mut self,
        pos: Coord,
        kind: StitchKind,
        color: Option<Arc<Color>>,
    ) -> Result<ElementId, PatternError> {
        let id = ElementId(self.next_id);
        let color = color.unwrap_or_else(Color::fallback);
        let stitch = Stitch::new(id, kind, color, &self.weights);

        self.usage.acquire(&stitch)?;
        self.next_id += 1;
        self.grid.merge(pos, &StitchCell::single(id, kind));
        self.stitches.insert(id, Placed { pos, stitch });
        Ok(id)
    }

    /// Remove a stitch. Returns false if it is not placed.
    pub fn remove_stitch(&mut self, id: ElementId) -> bool {
        let Some(placed) = self.stitches.remove(&id) else {
            return false;
        };
        self.usage.release(id);

        let stitches = &self.stitches;
        if self.grid.contains(placed.pos) {
            self.grid
                .cell_at(placed.pos)
                .remove_stitch(id, |other| stitches.get(&other).map(|p| p.stitch.kind()));
            self.grid.prune(placed.pos);
        }
        true
    }

    /// Remove every stitch in one cell, returning how many were removed.
    pub fn clear_cell(&mut self, pos: Coord) -> usize {
        let Some(cell) = self.grid.remove(pos) else {
            return 0;
        };
        for id in cell.stitches() {
            self.usage.release(*id);
            self.stitches.remove(id);
        }
        cell.stitches().len()
    }

    /// Change a stitch's color.
    ///
    /// # Errors
    ///
    /// `PatternError::UnknownStitch` if the id is not placed. If the new color
    /// cannot be acquired the stitch keeps its old color.
    pub fn recolor(&mut self, id: ElementId, color: Arc<Color>) -> Result<(), PatternError> {
        let placed = self.stitches.get_mut(&id).ok_or(PatternError::UnknownStitch(id))?;
        let previous = Arc::clone(placed.stitch.color());

        self.usage.release(id);
        placed.stitch.set_color(color);
        if let Err(e) = self.usage.acquire(&placed.stitch) {
            placed.stitch.set_color(previous);
            self.usage.acquire(&placed.stitch)?;
            return Err(e.into());
        }
        Ok(())
    }

    pub fn stitch(&self, id: ElementId) -> Option<&Stitch> {
        self.stitches.get(&id).map(|p| &p.stitch)
    }

    pub fn position_of(&self, id: ElementId) -> Option<Coord> {
        self.stitches.get(&id).map(|p| p.pos)
    }

    /// Stitches covering a cell, in placement order.
    pub fn stitches_at(&self, pos: Coord) -> impl Iterator<Item = &Stitch> + '_ {
        self.grid
            .get(pos)
            .map(StitchCell::stitches)
            .unwrap_or_default()
            .iter()
            .filter_map(|id| self.stitch(*id))
    }

    pub fn grid(&self) -> &SparseMap<StitchCell> {
        &self.grid
    }

    pub fn usage(&self) -> &ColorUsageTracker {
        &self.usage
    }

    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    /// Number of placed stitches.
    pub fn len(&self) -> usize {
        self.stitches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stitches.is_empty()
    }

    /// Drop every stitch and all usage accounting. The color list is kept.
    pub fn clear(&mut self) {
        self.grid.clear();
        self.stitches.clear();
        self.usage.reset_usage();
    }
}
