#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Boundary tracing system that outlines a set of grid cells as a polygon.
//!
//! Every exposed cell side contributes one edge to an undirected corner graph.
//! The outline is recovered by walking that graph from its top-most, then
//! left-most corner, preferring not to step straight back to the corner just
//! left. The walk is a heuristic: cell sets whose boundary branches (diagonal
//! pinches, disconnected islands) may be traced only partially, and the step
//! bound of three times the edge count is what guarantees termination.
//!
//! Loops smaller than the configured minimum area bypass the walk entirely and
//! use the centroid fallback, which sorts cell centres by angle.

use std::collections::{BTreeMap, BTreeSet};

use anteater_core::{BoundaryPolygon, GridCoord, Point};

/// Walk steps allowed per boundary edge before the trace gives up.
const STEP_BOUND_PER_EDGE: usize = 3;

/// Configuration parameters required to construct the tracer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    cell_size: f64,
    min_loop_area: usize,
}

impl Config {
    /// Creates a new configuration using the provided cell edge length and
    /// minimum loop area (in cells).
    #[must_use]
    pub const fn new(cell_size: f64, min_loop_area: usize) -> Self {
        Self {
            cell_size,
            min_loop_area,
        }
    }
}

/// Pure system turning a loop's cell set into a [`BoundaryPolygon`].
#[derive(Clone, Copy, Debug)]
pub struct BoundaryTracer {
    config: Config,
}

impl BoundaryTracer {
    /// Creates a new tracer using the supplied configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Outlines the provided cells.
    ///
    /// Returns the centroid fallback below the minimum loop area and an empty
    /// polygon when no cell side is exposed.
    #[must_use]
    pub fn trace(&self, cells: &BTreeSet<GridCoord>) -> BoundaryPolygon {
        if cells.len() < self.config.min_loop_area {
            return self.centroid_fallback(cells);
        }

        let edges = boundary_edges(cells);
        if edges.is_empty() {
            return BoundaryPolygon::empty();
        }

        let corners = walk(&edges);
        let points = corners
            .into_iter()
            .map(|corner| corner.to_point(self.config.cell_size))
            .collect();
        BoundaryPolygon::traced(points)
    }

    /// Sorts cell centres by angle around their centroid.
    ///
    /// The result is a star-shaped approximation, not a boundary.
    #[must_use]
    pub fn centroid_fallback(&self, cells: &BTreeSet<GridCoord>) -> BoundaryPolygon {
        if cells.is_empty() {
            return BoundaryPolygon::empty();
        }

        let mut centres: Vec<Point> = cells
            .iter()
            .map(|cell| cell.center(self.config.cell_size))
            .collect();
        let count = centres.len() as f64;
        let centroid_x = centres.iter().map(|p| p.x).sum::<f64>() / count;
        let centroid_y = centres.iter().map(|p| p.y).sum::<f64>() / count;

        centres.sort_by(|a, b| {
            let angle_a = (a.y - centroid_y).atan2(a.x - centroid_x);
            let angle_b = (b.y - centroid_y).atan2(b.x - centroid_x);
            angle_a.total_cmp(&angle_b)
        });
        BoundaryPolygon::centroid_fallback(centres)
    }
}

/// Corner on the integer lattice of cell corners.
///
/// Field order makes the derived ordering row-major: smallest `y`, then `x`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Corner {
    y: i64,
    x: i64,
}

impl Corner {
    const fn new(x: i64, y: i64) -> Self {
        Self { y, x }
    }

    fn to_point(self, cell_size: f64) -> Point {
        Point::new(self.x as f64 * cell_size, self.y as f64 * cell_size)
    }
}

type Edge = (Corner, Corner);

/// Emits one edge per cell side whose neighbour lies outside the set.
///
/// Cells are visited in ascending `(column, row)` order and sides in the order
/// up, right, down, left so adjacency lists are reproducible.
fn boundary_edges(cells: &BTreeSet<GridCoord>) -> Vec<Edge> {
    let mut edges = Vec::new();
    for cell in cells {
        let x0 = i64::from(cell.column());
        let y0 = i64::from(cell.row());
        let corners = [
            Corner::new(x0, y0),
            Corner::new(x0 + 1, y0),
            Corner::new(x0 + 1, y0 + 1),
            Corner::new(x0, y0 + 1),
        ];
        let neighbours = [
            GridCoord::new(cell.column(), cell.row() - 1),
            GridCoord::new(cell.column() + 1, cell.row()),
            GridCoord::new(cell.column(), cell.row() + 1),
            GridCoord::new(cell.column() - 1, cell.row()),
        ];

        for (side, neighbour) in neighbours.iter().enumerate() {
            if !cells.contains(neighbour) {
                edges.push((corners[side], corners[(side + 1) % 4]));
            }
        }
    }
    edges
}

fn walk(edges: &[Edge]) -> Vec<Corner> {
    let mut adjacency: BTreeMap<Corner, Vec<Corner>> = BTreeMap::new();
    for &(a, b) in edges {
        adjacency.entry(a).or_default().push(b);
        adjacency.entry(b).or_default().push(a);
    }

    let Some(&start) = adjacency.keys().next() else {
        return Vec::new();
    };

    let mut polygon = vec![start];
    let mut current = start;
    let mut previous: Option<Corner> = None;
    let max_steps = edges.len() * STEP_BOUND_PER_EDGE;
    let mut steps = 0;
    let mut closed = false;

    while steps < max_steps {
        steps += 1;
        let Some(candidates) = adjacency.get(&current) else {
            break;
        };
        let Some(&fallback) = candidates.first() else {
            break;
        };
        let next = candidates
            .iter()
            .copied()
            .find(|candidate| Some(*candidate) != previous)
            .unwrap_or(fallback);

        if next == start {
            closed = true;
            break;
        }
        polygon.push(next);
        previous = Some(current);
        current = next;
    }

    if !closed {
        tracing::warn!(
            steps,
            edges = edges.len(),
            "boundary walk stopped at its step bound without closing"
        );
    }
    polygon
}
