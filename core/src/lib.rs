#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Anteater engine.
//!
//! This crate defines the vocabulary that connects the tongue state machine,
//! the pure geometry systems and the adapters driving them. Adapters submit
//! [`Command`] values describing player intent, the tongue executes those
//! commands via its `apply` entry point, and then reports [`Event`] values
//! describing what happened during the tick. Systems consume immutable
//! snapshots such as [`GridPath`] and [`EntityView`] and return plain values.

mod path;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub use path::{ExtendOutcome, GridPath};

/// Points awarded for every entity removed by a completed capture.
pub const POINTS_PER_CAPTURE: u32 = 10;

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Components are signed so that a step leaving the grid through its top or
/// left edge remains representable and can be rejected explicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    column: i32,
    row: i32,
}

impl GridCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Returns the cell adjacent to this one in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            column: self.column.saturating_add(dx),
            row: self.row.saturating_add(dy),
        }
    }

    /// Pixel position of the cell's upper-left corner.
    #[must_use]
    pub fn origin(self, cell_size: f64) -> Point {
        Point::new(
            f64::from(self.column) * cell_size,
            f64::from(self.row) * cell_size,
        )
    }

    /// Pixel position of the cell's centre.
    #[must_use]
    pub fn center(self, cell_size: f64) -> Point {
        let origin = self.origin(cell_size);
        Point::new(origin.x + cell_size / 2.0, origin.y + cell_size / 2.0)
    }
}

/// Cardinal directions the tongue may travel in.
///
/// Rows grow downward, matching screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Unit step applied to `(column, row)` when moving in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// Direction pointing the exact opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Reports whether turning from `self` to `other` would be a 180° reversal.
    #[must_use]
    pub fn reverses(self, other: Direction) -> bool {
        self.opposite() == other
    }
}

/// Rectangular extent of the play grid measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridBounds {
    columns: u32,
    rows: u32,
}

impl GridBounds {
    /// Creates bounds spanning the provided number of columns and rows.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the coordinate addresses a cell inside the grid.
    #[must_use]
    pub fn contains(&self, cell: GridCoord) -> bool {
        let column_ok = u32::try_from(cell.column()).map_or(false, |c| c < self.columns);
        let row_ok = u32::try_from(cell.row()).map_or(false, |r| r < self.rows);
        column_ok && row_ok
    }
}

/// Continuous position expressed in pixel units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal component, growing to the right.
    pub x: f64,
    /// Vertical component, growing downward.
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Unique identifier assigned to a free-roaming entity by the game loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Immutable representation of a single entity supplied by the game loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntitySnapshot {
    /// Identifier allocated to the entity by the game loop.
    pub id: EntityId,
    /// Centre of the entity in pixel units.
    pub position: Point,
    /// Half the side length of the entity's axis-aligned bounding box.
    pub half_extent: f64,
}

/// Read-only snapshot of every entity the tongue may interact with on a tick.
#[derive(Clone, Debug, Default)]
pub struct EntityView {
    snapshots: Vec<EntitySnapshot>,
}

impl EntityView {
    /// Creates a new entity view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EntitySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured entity snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EntitySnapshot> {
        self.snapshots.iter()
    }

    /// Number of entities contained in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view contains no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EntitySnapshot> {
        self.snapshots
    }
}

/// Lifecycle phase of the tongue mechanic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TongueState {
    /// Only the anchor cell is occupied and nothing moves.
    Idle,
    /// The head advances one cell per move cooldown.
    Extending,
    /// A loop formed; the path is frozen while the capture countdown runs.
    LoopActive,
    /// The head is removed one cell per move cooldown.
    Retracting,
}

/// Reasons an extension stopped without forming a loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HaltReason {
    /// The next cell lies outside the configured grid.
    OutOfBounds,
    /// The path already holds the configured maximum number of cells.
    MaxLengthReached,
    /// The player released the extend control.
    Released,
}

/// Sub-path isolated when the tongue revisits one of its own cells.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopResult {
    loop_path: Vec<GridCoord>,
    loop_cells: BTreeSet<GridCoord>,
}

impl LoopResult {
    /// Builds a loop result from an ordered head-first sub-path.
    #[must_use]
    pub fn from_path(loop_path: Vec<GridCoord>) -> Self {
        let loop_cells = loop_path.iter().copied().collect();
        Self {
            loop_path,
            loop_cells,
        }
    }

    /// Ordered cells from the head up to and including the revisited cell.
    #[must_use]
    pub fn loop_path(&self) -> &[GridCoord] {
        &self.loop_path
    }

    /// Deduplicated set of cells forming the loop.
    #[must_use]
    pub fn loop_cells(&self) -> &BTreeSet<GridCoord> {
        &self.loop_cells
    }
}

/// Distinguishes how a [`BoundaryPolygon`] was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolygonKind {
    /// Outline obtained by walking the exposed edges of the cell set.
    Traced,
    /// Cell centres sorted by angle around their centroid; not a true boundary.
    CentroidFallback,
    /// No boundary exists; nothing can be captured.
    Empty,
}

/// Ordered, implicitly closed outline in pixel units.
///
/// The start point is not repeated at the end.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundaryPolygon {
    kind: PolygonKind,
    points: Vec<Point>,
}

impl BoundaryPolygon {
    /// Polygon produced by the boundary walk.
    #[must_use]
    pub fn traced(points: Vec<Point>) -> Self {
        Self {
            kind: PolygonKind::Traced,
            points,
        }
    }

    /// Approximate star-shaped outline used for degenerate loops.
    #[must_use]
    pub fn centroid_fallback(points: Vec<Point>) -> Self {
        Self {
            kind: PolygonKind::CentroidFallback,
            points,
        }
    }

    /// Polygon without any vertices.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            kind: PolygonKind::Empty,
            points: Vec::new(),
        }
    }

    /// How the polygon was produced.
    #[must_use]
    pub const fn kind(&self) -> PolygonKind {
        self.kind
    }

    /// Vertices in walk order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Reports whether the polygon has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Reports whether the polygon can enclose anything (three or more vertices).
    #[must_use]
    pub fn is_capturable(&self) -> bool {
        self.points.len() >= 3
    }

    /// Average of the vertices, or `None` for an empty polygon.
    #[must_use]
    pub fn centroid(&self) -> Option<Point> {
        if self.points.is_empty() {
            return None;
        }
        let count = self.points.len() as f64;
        let (sum_x, sum_y) = self
            .points
            .iter()
            .fold((0.0, 0.0), |(x, y), point| (x + point.x, y + point.y));
        Some(Point::new(sum_x / count, sum_y / count))
    }
}

/// Outcome of a completed capture countdown.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaptureEvent {
    /// Polygon the membership test ran against.
    pub polygon: BoundaryPolygon,
    /// Entities found inside the polygon on the capture tick, in id order.
    pub captured: Vec<EntityId>,
}

impl CaptureEvent {
    /// Score earned by the capture at the provided rate per entity.
    #[must_use]
    pub fn score(&self, points_per_entity: u32) -> u32 {
        let count = u32::try_from(self.captured.len()).unwrap_or(u32::MAX);
        count.saturating_mul(points_per_entity)
    }
}

/// Commands that express all permissible tongue mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Starts (or resumes) extending the tongue.
    BeginExtend,
    /// Stops extending and starts pulling the tongue back.
    EndExtend,
    /// Buffers a turn that applies when the head next moves.
    SetNextDirection {
        /// Requested heading.
        direction: Direction,
    },
    /// Discards all progress and returns to the anchor cell.
    Reset,
    /// Advances the mechanic by one logical tick.
    Tick,
}

/// Events reported after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// The tongue left the idle state and began extending.
    ExtendStarted,
    /// A buffered turn was rejected because it reversed the current heading.
    DirectionRejected {
        /// Heading that was refused.
        requested: Direction,
    },
    /// The head moved into a new cell.
    HeadAdvanced {
        /// Cell the head occupied before moving.
        from: GridCoord,
        /// Cell the head occupies after moving.
        to: GridCoord,
    },
    /// Extension stopped and retraction began.
    ExtensionHalted {
        /// Why the extension stopped.
        reason: HaltReason,
    },
    /// The head revisited one of its own cells, closing a loop.
    LoopFormed {
        /// Distance from the head to the revisited cell.
        at_index: usize,
        /// Number of distinct cells in the loop.
        cell_count: usize,
        /// Entities inside the capture region when the loop closed.
        trapped: Vec<EntityId>,
    },
    /// A loop that trapped nothing was dropped without a countdown.
    LoopReleased,
    /// The capture countdown elapsed.
    Captured(CaptureEvent),
    /// The head cell was removed while retracting.
    HeadRetracted {
        /// Cell that was removed.
        removed: GridCoord,
    },
    /// The tongue is back at its anchor cell.
    FullyRetracted,
    /// A reset discarded all in-progress state.
    ResetPerformed,
}

#[cfg(test)]
mod tests {
    use super::{
        BoundaryPolygon, CaptureEvent, Direction, EntityId, GridBounds, GridCoord, Point,
        PolygonKind,
    };

    #[test]
    fn steps_follow_screen_convention() {
        let origin = GridCoord::new(3, 3);
        assert_eq!(origin.step(Direction::North), GridCoord::new(3, 2));
        assert_eq!(origin.step(Direction::East), GridCoord::new(4, 3));
        assert_eq!(origin.step(Direction::South), GridCoord::new(3, 4));
        assert_eq!(origin.step(Direction::West), GridCoord::new(2, 3));
    }

    #[test]
    fn only_opposites_count_as_reversals() {
        assert!(Direction::North.reverses(Direction::South));
        assert!(Direction::West.reverses(Direction::East));
        assert!(!Direction::North.reverses(Direction::East));
        assert!(!Direction::South.reverses(Direction::South));
    }

    #[test]
    fn bounds_reject_negative_and_overflowing_cells() {
        let bounds = GridBounds::new(40, 30);
        assert!(bounds.contains(GridCoord::new(0, 0)));
        assert!(bounds.contains(GridCoord::new(39, 29)));
        assert!(!bounds.contains(GridCoord::new(-1, 0)));
        assert!(!bounds.contains(GridCoord::new(0, -1)));
        assert!(!bounds.contains(GridCoord::new(40, 0)));
        assert!(!bounds.contains(GridCoord::new(0, 30)));
    }

    #[test]
    fn cell_centre_sits_half_a_cell_from_origin() {
        let cell = GridCoord::new(2, 5);
        assert_eq!(cell.origin(20.0), Point::new(40.0, 100.0));
        assert_eq!(cell.center(20.0), Point::new(50.0, 110.0));
    }

    #[test]
    fn centroid_averages_vertices() {
        let polygon = BoundaryPolygon::traced(vec![
            Point::new(0.0, 0.0),
            Point::new(20.0, 0.0),
            Point::new(20.0, 20.0),
            Point::new(0.0, 20.0),
        ]);
        assert_eq!(polygon.kind(), PolygonKind::Traced);
        assert_eq!(polygon.centroid(), Some(Point::new(10.0, 10.0)));
        assert_eq!(BoundaryPolygon::empty().centroid(), None);
    }

    #[test]
    fn capture_score_scales_with_captured_count() {
        let event = CaptureEvent {
            polygon: BoundaryPolygon::empty(),
            captured: vec![EntityId::new(1), EntityId::new(4), EntityId::new(9)],
        };
        assert_eq!(event.score(super::POINTS_PER_CAPTURE), 30);
    }

    #[test]
    fn capture_event_round_trips_through_bincode() {
        let event = CaptureEvent {
            polygon: BoundaryPolygon::centroid_fallback(vec![Point::new(30.0, 30.0)]),
            captured: vec![EntityId::new(7)],
        };
        let bytes = bincode::serialize(&event).expect("serialize");
        let restored: CaptureEvent = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, event);
    }
}
