//! Hit testing: which object, or which resize handle, is under a world point.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Camera, Point, Rect};
use crate::consts::HANDLE_RADIUS_PX;
use crate::doc::{DocStore, ObjectId};
use crate::resize::Corner;

/// Which part of an object was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(Corner),
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub object_id: ObjectId,
    pub part: HitPart,
}

/// Test what is under `world_pt`.
///
/// Corner handles of the primary selection win over everything; otherwise the
/// topmost visible object whose bounds contain the point is hit. Handle slop
/// is constant in screen pixels, so it shrinks in world units as zoom grows.
#[must_use]
pub fn hit_test(world_pt: Point, doc: &DocStore, camera: &Camera, primary: Option<ObjectId>) -> Option<Hit> {
    if let Some(id) = primary {
        if let Some(obj) = doc.get(&id).filter(|o| !o.hidden && !o.locked) {
            if let Some(corner) = handle_at(world_pt, &obj.rect(), camera.screen_dist_to_world(HANDLE_RADIUS_PX)) {
                return Some(Hit { object_id: id, part: HitPart::ResizeHandle(corner) });
            }
        }
    }

    doc.objects()
        .iter()
        .rev()
        .find(|o| !o.hidden && o.rect().contains(world_pt))
        .map(|o| Hit { object_id: o.id, part: HitPart::Body })
}

/// Corner of `rect` within `radius` (world units) of `world_pt`.
#[must_use]
pub fn handle_at(world_pt: Point, rect: &Rect, radius: f64) -> Option<Corner> {
    Corner::ALL
        .into_iter()
        .find(|c| c.point(rect).distance(world_pt) <= radius)
}

/// Visible objects whose bounds intersect `world_rect`, in z-order.
#[must_use]
pub fn objects_in_rect(doc: &DocStore, world_rect: &Rect) -> Vec<ObjectId> {
    doc.objects()
        .iter()
        .filter(|o| !o.hidden && o.rect().intersects(world_rect))
        .map(|o| o.id)
        .collect()
}
