//! Free-slot search for new objects.
//!
//! Candidates are centres on a square grid around the target point. Every
//! grid point within the search radius is collected ring by ring, then stably
//! sorted by Euclidean distance so equal distances keep ring order. The first
//! candidate whose padded rectangle touches no occupied rectangle wins.

#[cfg(test)]
#[path = "placement_test.rs"]
mod placement_test;

use crate::camera::{Point, Rect};
use crate::consts::{MAX_PLACEMENT_RINGS, PLACEMENT_GRID_STEP, PLACEMENT_PADDING};

/// Tunables for `find_free_slot`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementParams {
    /// Grid spacing in world units.
    pub grid_step: f64,
    /// Clearance required around the placed rectangle.
    pub padding: f64,
    /// Maximum candidate distance from the target. `None` derives it with
    /// `search_radius`, using the bounds of the occupied set as the view.
    pub search_radius: Option<f64>,
}

impl Default for PlacementParams {
    fn default() -> Self {
        Self { grid_step: PLACEMENT_GRID_STEP, padding: PLACEMENT_PADDING, search_radius: None }
    }
}

/// Radius covering the visible world plus room for the largest object.
#[must_use]
pub fn search_radius(view: Rect, occupied: &[Rect], width: f64, height: f64) -> f64 {
    let largest = occupied.iter().map(|r| r.width.max(r.height)).fold(0.0_f64, f64::max);
    view.width.max(view.height) + largest + width.max(height)
}

/// Find the rectangle of size `width`×`height` nearest `target` that, padded,
/// overlaps nothing in `occupied`. Falls back to centring on `target`.
#[must_use]
pub fn find_free_slot(occupied: &[Rect], width: f64, height: f64, target: Point, params: &PlacementParams) -> Rect {
    let fallback = Rect::centered(target, width, height);
    let step = params.grid_step;
    if !(step.is_finite() && step > 0.0) {
        return fallback;
    }

    let radius = params.search_radius.unwrap_or_else(|| {
        let bounds = occupied.iter().fold(fallback, |acc, r| acc.union(r));
        search_radius(bounds, occupied, width, height)
    });
    for center in candidates(target, step, radius) {
        let rect = Rect::centered(center, width, height);
        if is_free(&rect, occupied, params.padding) {
            return rect;
        }
    }
    fallback
}

/// Whether `rect`, grown by `padding`, stays clear of every occupied rect.
#[must_use]
pub fn is_free(rect: &Rect, occupied: &[Rect], padding: f64) -> bool {
    let padded = rect.inflate(padding);
    occupied.iter().all(|r| !padded.intersects(r))
}

/// Grid centres within `radius` of `target`, nearest first.
fn candidates(target: Point, step: f64, radius: f64) -> Vec<Point> {
    #[allow(clippy::cast_possible_truncation)]
    let rings = ((radius / step).ceil() as i32).clamp(0, MAX_PLACEMENT_RINGS);
    let mut points: Vec<(f64, Point)> = Vec::new();
    for ring in 0..=rings {
        for (i, j) in ring_offsets(ring) {
            let offset = Point::new(f64::from(i) * step, f64::from(j) * step);
            let dist = offset.x.hypot(offset.y);
            if dist <= radius {
                points.push((dist, Point::new(target.x + offset.x, target.y + offset.y)));
            }
        }
    }
    points.sort_by(|a, b| a.0.total_cmp(&b.0));
    points.into_iter().map(|(_, p)| p).collect()
}

/// Integer offsets on the square ring at Chebyshev distance `ring`.
fn ring_offsets(ring: i32) -> Vec<(i32, i32)> {
    if ring == 0 {
        return vec![(0, 0)];
    }
    let mut out = Vec::with_capacity(usize::try_from(ring * 8).unwrap_or(0));
    for i in -ring..=ring {
        out.push((i, -ring));
        out.push((i, ring));
    }
    for j in (-ring + 1)..ring {
        out.push((-ring, j));
        out.push((ring, j));
    }
    out
}
