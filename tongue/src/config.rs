//! Tunable parameters of the tongue mechanic.

use anteater_core::{Direction, GridBounds, GridCoord};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration parameters required to construct a [`crate::Tongue`].
///
/// Every field has a default, so partial configuration files are accepted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of grid columns the tongue may occupy.
    pub columns: u32,
    /// Number of grid rows the tongue may occupy.
    pub rows: u32,
    /// Edge length of a grid cell in pixels.
    pub cell_size: f64,
    /// Spawn cell the tongue is anchored to.
    pub anchor: GridCoord,
    /// Heading restored whenever the tongue returns to its anchor.
    pub default_direction: Direction,
    /// Ticks between successive head moves while extending or retracting.
    pub move_cooldown: u32,
    /// Maximum number of cells the tongue may span, anchor included.
    pub max_segments: usize,
    /// Loops with fewer cells use the centroid fallback outline.
    pub min_loop_area: usize,
    /// Ticks a loop stays active before its capture fires.
    pub capture_delay: u32,
    /// Drops loops that trap nothing instead of running the countdown.
    pub release_empty_loops: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            columns: 40,
            rows: 30,
            cell_size: 20.0,
            anchor: GridCoord::new(20, 5),
            default_direction: Direction::South,
            move_cooldown: 5,
            max_segments: 40,
            min_loop_area: 2,
            capture_delay: 60,
            release_empty_loops: false,
        }
    }
}

impl Config {
    /// Grid extent described by the configuration.
    #[must_use]
    pub const fn bounds(&self) -> GridBounds {
        GridBounds::new(self.columns, self.rows)
    }

    /// Checks that the configuration describes a usable mechanic.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(ConfigError::EmptyGrid {
                columns: self.columns,
                rows: self.rows,
            });
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(ConfigError::InvalidCellSize(self.cell_size));
        }
        if self.move_cooldown == 0 {
            return Err(ConfigError::ZeroMoveCooldown);
        }
        if self.max_segments == 0 {
            return Err(ConfigError::ZeroMaxSegments);
        }
        if !self.bounds().contains(self.anchor) {
            return Err(ConfigError::AnchorOutOfBounds {
                column: self.anchor.column(),
                row: self.anchor.row(),
            });
        }
        Ok(())
    }
}

/// Reasons a [`Config`] is rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The grid has no cells.
    #[error("grid must have at least one cell, got {columns}x{rows}")]
    EmptyGrid {
        /// Configured column count.
        columns: u32,
        /// Configured row count.
        rows: u32,
    },
    /// The cell size is not a positive finite number.
    #[error("cell size must be positive and finite, got {0}")]
    InvalidCellSize(f64),
    /// The head would never move.
    #[error("move cooldown must be at least one tick")]
    ZeroMoveCooldown,
    /// The tongue could not even hold its anchor.
    #[error("max segments must be at least one")]
    ZeroMaxSegments,
    /// The anchor lies outside the grid.
    #[error("anchor ({column}, {row}) lies outside the grid")]
    AnchorOutOfBounds {
        /// Anchor column.
        column: i32,
        /// Anchor row.
        row: i32,
    },
}
