//! Ordered path of grid cells occupied by the tongue.

use std::collections::VecDeque;

use crate::{GridBounds, GridCoord};

/// Classification of an attempted head extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExtendOutcome {
    /// The cell was prepended as the new head.
    Extended,
    /// The cell is already part of the path; nothing was mutated.
    SelfIntersected {
        /// Index of the occurrence closest to the head (0 = head).
        at_index: usize,
    },
    /// The path already holds its maximum number of cells.
    MaxLengthReached,
    /// The cell lies outside the grid bounds.
    OutOfBounds,
}

/// Head-first sequence of distinct grid cells anchored at a spawn cell.
///
/// The anchor is the tail and is never removed, so the path is never empty.
#[derive(Clone, Debug)]
pub struct GridPath {
    cells: VecDeque<GridCoord>,
    bounds: GridBounds,
    max_segments: usize,
}

impl GridPath {
    /// Creates a path holding only the anchor cell.
    #[must_use]
    pub fn new(anchor: GridCoord, bounds: GridBounds, max_segments: usize) -> Self {
        let mut cells = VecDeque::new();
        cells.push_back(anchor);
        Self {
            cells,
            bounds,
            max_segments,
        }
    }

    /// Most recently added cell.
    #[must_use]
    pub fn head(&self) -> GridCoord {
        self.cells[0]
    }

    /// Spawn cell anchoring the tail of the path.
    #[must_use]
    pub fn anchor(&self) -> GridCoord {
        self.cells[self.cells.len() - 1]
    }

    /// Number of occupied cells, including the anchor.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the path holds no cells, which never happens once constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Reports whether the cell is part of the path.
    #[must_use]
    pub fn contains(&self, cell: GridCoord) -> bool {
        self.cells.contains(&cell)
    }

    /// Index of the occurrence of `cell` closest to the head.
    #[must_use]
    pub fn position(&self, cell: GridCoord) -> Option<usize> {
        self.cells.iter().position(|occupied| *occupied == cell)
    }

    /// Iterator over the cells in head-first order.
    pub fn iter(&self) -> impl Iterator<Item = GridCoord> + '_ {
        self.cells.iter().copied()
    }

    /// Snapshot of the cells in head-first order.
    #[must_use]
    pub fn cells(&self) -> Vec<GridCoord> {
        self.iter().collect()
    }

    /// Classifies an extension into `next` without mutating the path.
    ///
    /// Bounds are checked first, then self-intersection, then length.
    #[must_use]
    pub fn probe(&self, next: GridCoord) -> ExtendOutcome {
        if !self.bounds.contains(next) {
            return ExtendOutcome::OutOfBounds;
        }
        if let Some(at_index) = self.position(next) {
            return ExtendOutcome::SelfIntersected { at_index };
        }
        if self.cells.len() >= self.max_segments {
            return ExtendOutcome::MaxLengthReached;
        }
        ExtendOutcome::Extended
    }

    /// Prepends `next` as the new head when [`GridPath::probe`] allows it.
    pub fn extend_head(&mut self, next: GridCoord) -> ExtendOutcome {
        let outcome = self.probe(next);
        if outcome == ExtendOutcome::Extended {
            self.cells.push_front(next);
        }
        outcome
    }

    /// Removes the head cell. Returns `false` when only the anchor remains.
    pub fn retract_head(&mut self) -> bool {
        if self.cells.len() <= 1 {
            return false;
        }
        self.cells.pop_front().is_some()
    }

    /// Drops every cell except the anchor.
    pub fn reset(&mut self) {
        let anchor = self.anchor();
        self.cells.clear();
        self.cells.push_back(anchor);
    }
}
