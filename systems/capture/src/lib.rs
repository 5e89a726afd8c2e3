#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Capture system deciding which entities are trapped by the tongue.
//!
//! Membership is a ray-casting parity test over an immutable polygon, so
//! batched queries fan out across threads without coordination.

use anteater_core::{BoundaryPolygon, EntityId, EntityView, GridCoord, Point};
use rayon::prelude::*;

/// Added to the edge height in the crossing formula so horizontal edges never divide by zero.
pub const RAY_EPSILON: f64 = 1e-9;

/// Reports whether `point` lies inside the polygon using ray-casting parity.
///
/// Polygons with fewer than three vertices never contain anything.
#[must_use]
pub fn contains(polygon: &[Point], point: Point) -> bool {
    let count = polygon.len();
    if count < 3 {
        return false;
    }

    let mut inside = false;
    for index in 0..count {
        let a = polygon[index];
        let b = polygon[(index + 1) % count];
        if (a.y > point.y) != (b.y > point.y)
            && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y + RAY_EPSILON) + a.x
        {
            inside = !inside;
        }
    }
    inside
}

/// Immutable capture region derived from a loop's traced polygon.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptureRegion {
    polygon: BoundaryPolygon,
}

impl CaptureRegion {
    /// Wraps the provided polygon.
    #[must_use]
    pub const fn new(polygon: BoundaryPolygon) -> Self {
        Self { polygon }
    }

    /// Polygon backing the region.
    #[must_use]
    pub const fn polygon(&self) -> &BoundaryPolygon {
        &self.polygon
    }

    /// Consumes the region, yielding its polygon.
    #[must_use]
    pub fn into_polygon(self) -> BoundaryPolygon {
        self.polygon
    }

    /// Reports whether the region can hold anything at all.
    #[must_use]
    pub fn is_capturable(&self) -> bool {
        self.polygon.is_capturable()
    }

    /// Membership test for a single point.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        contains(self.polygon.points(), point)
    }

    /// Membership test for a batch of points, preserving input order.
    #[must_use]
    pub fn contains_all(&self, points: &[Point]) -> Vec<bool> {
        if !self.is_capturable() {
            return vec![false; points.len()];
        }
        let polygon = self.polygon.points();
        points
            .par_iter()
            .map(|point| contains(polygon, *point))
            .collect()
    }

    /// Identifiers of the entities whose centre lies inside the region, in id order.
    #[must_use]
    pub fn entities_inside(&self, entities: &EntityView) -> Vec<EntityId> {
        let positions: Vec<Point> = entities.iter().map(|entity| entity.position).collect();
        let inside = self.contains_all(&positions);
        entities
            .iter()
            .zip(inside)
            .filter_map(|(entity, inside)| inside.then_some(entity.id))
            .collect()
    }
}

/// Identifiers of entities whose bounding box overlaps any of the provided cells.
///
/// Touching edges do not count as overlap.
#[must_use]
pub fn touching_tongue(
    cells: &[GridCoord],
    cell_size: f64,
    entities: &EntityView,
) -> Vec<EntityId> {
    entities
        .iter()
        .filter(|entity| {
            cells.iter().any(|cell| {
                let origin = cell.origin(cell_size);
                let left = entity.position.x - entity.half_extent;
                let right = entity.position.x + entity.half_extent;
                let top = entity.position.y - entity.half_extent;
                let bottom = entity.position.y + entity.half_extent;
                left < origin.x + cell_size
                    && right > origin.x
                    && top < origin.y + cell_size
                    && bottom > origin.y
            })
        })
        .map(|entity| entity.id)
        .collect()
}
