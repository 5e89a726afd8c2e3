#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure loop detection system that isolates the cells enclosed by a self-intersecting tongue.

use anteater_core::{ExtendOutcome, GridCoord, GridPath, LoopResult};

/// Stateless system slicing a [`GridPath`] into the loop closed by a revisit.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoopDetector;

impl LoopDetector {
    /// Creates a new loop detector.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Slices the path from the head up to and including `at_index`.
    ///
    /// `at_index` is the value carried by [`ExtendOutcome::SelfIntersected`];
    /// an index past the tail is clamped to the anchor cell.
    #[must_use]
    pub fn detect(&self, path: &GridPath, at_index: usize) -> LoopResult {
        let last = at_index.min(path.len().saturating_sub(1));
        let loop_path: Vec<GridCoord> = path.iter().take(last + 1).collect();
        LoopResult::from_path(loop_path)
    }

    /// Reports the loop that stepping into `next` would close, if any.
    ///
    /// Out-of-bounds candidates never form a loop.
    #[must_use]
    pub fn check(&self, path: &GridPath, next: GridCoord) -> Option<LoopResult> {
        match path.probe(next) {
            ExtendOutcome::SelfIntersected { at_index } => Some(self.detect(path, at_index)),
            ExtendOutcome::Extended
            | ExtendOutcome::MaxLengthReached
            | ExtendOutcome::OutOfBounds => None,
        }
    }
}
