//! Corner resize with aspect lock and a shrink-direction cone.
//!
//! DESIGN
//! ======
//! A `ResizeSession` holds the pre-drag rectangle and pointer; every frame is
//! recomputed from the total pointer delta (÷ zoom) so rounding never
//! accumulates. The corner opposite the dragged one stays fixed.
//!
//! Aspect-locked shrinking is jittery when the pointer wanders sideways, so a
//! frame that would shrink below the pre-drag size is accepted only if the
//! pointer moved roughly along the diagonal toward the fixed corner. The
//! direction is measured per frame (pointer now minus pointer at the last
//! accepted frame). A rejected frame leaves the previous geometry untouched.
//! Frames that grow the rectangle are never rejected.

#[cfg(test)]
#[path = "resize_test.rs"]
mod resize_test;

use crate::camera::{Point, Rect};
use crate::consts::{CONE_TOLERANCE_DEG, MIN_OBJECT_SIZE};

/// Corner handle being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    Nw,
    Ne,
    Se,
    Sw,
}

impl Corner {
    pub const ALL: [Corner; 4] = [Corner::Nw, Corner::Ne, Corner::Se, Corner::Sw];

    /// +1 when the corner is on the east edge, -1 on the west edge.
    fn sx(self) -> f64 {
        match self {
            Self::Ne | Self::Se => 1.0,
            Self::Nw | Self::Sw => -1.0,
        }
    }

    /// +1 when the corner is on the south edge, -1 on the north edge.
    fn sy(self) -> f64 {
        match self {
            Self::Se | Self::Sw => 1.0,
            Self::Nw | Self::Ne => -1.0,
        }
    }

    /// World position of this corner on `rect`.
    #[must_use]
    pub fn point(self, rect: &Rect) -> Point {
        let x = if self.sx() > 0.0 { rect.right() } else { rect.x };
        let y = if self.sy() > 0.0 { rect.bottom() } else { rect.y };
        Point::new(x, y)
    }

    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Nw => Self::Se,
            Self::Ne => Self::Sw,
            Self::Se => Self::Nw,
            Self::Sw => Self::Ne,
        }
    }
}

/// Tunables for the resize engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeParams {
    pub min_size: f64,
    pub cone_tolerance_deg: f64,
}

impl Default for ResizeParams {
    fn default() -> Self {
        Self { min_size: MIN_OBJECT_SIZE, cone_tolerance_deg: CONE_TOLERANCE_DEG }
    }
}

/// Outcome of one pointer-move frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeFrame {
    pub rect: Rect,
    /// `false` when the cone rejected the frame and `rect` is the previous geometry.
    pub accepted: bool,
}

/// State of one in-progress corner drag.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeSession {
    corner: Corner,
    orig: Rect,
    start: Point,
    aspect: Option<f64>,
    last: Rect,
    last_pointer: Point,
}

impl ResizeSession {
    /// Start dragging `corner` of `rect` from screen point `pointer`.
    /// `aspect` (w/h) enables the aspect lock.
    #[must_use]
    pub fn begin(corner: Corner, rect: Rect, pointer: Point, aspect: Option<f64>) -> Self {
        let aspect = aspect.filter(|a| a.is_finite() && *a > 0.0);
        Self { corner, orig: rect, start: pointer, aspect, last: rect, last_pointer: pointer }
    }

    #[must_use]
    pub fn corner(&self) -> Corner {
        self.corner
    }

    /// Geometry before the drag started.
    #[must_use]
    pub fn original(&self) -> Rect {
        self.orig
    }

    /// Geometry of the last accepted frame.
    #[must_use]
    pub fn current(&self) -> Rect {
        self.last
    }

    #[must_use]
    pub fn is_aspect_locked(&self) -> bool {
        self.aspect.is_some()
    }

    /// Process a pointer move at screen point `pointer` under `zoom`.
    pub fn update(&mut self, pointer: Point, zoom: f64, params: &ResizeParams) -> ResizeFrame {
        let zoom = if zoom > 0.0 { zoom } else { 1.0 };
        let dx = (pointer.x - self.start.x) / zoom;
        let dy = (pointer.y - self.start.y) / zoom;
        let next = self.geometry(dx, dy, params.min_size);

        if self.aspect.is_some() && self.rejected_by_cone(&next, pointer, params.cone_tolerance_deg) {
            return ResizeFrame { rect: self.last, accepted: false };
        }
        self.last = next;
        self.last_pointer = pointer;
        ResizeFrame { rect: next, accepted: true }
    }

    fn geometry(&self, dx: f64, dy: f64, min_size: f64) -> Rect {
        let (sx, sy) = (self.corner.sx(), self.corner.sy());
        let mut w = self.orig.width + sx * dx;
        let mut h = self.orig.height + sy * dy;

        match self.aspect {
            Some(aspect) => {
                // Height carries the dominant axis; width follows the aspect.
                let driven = if dx.abs() >= dy.abs() { w / aspect } else { h };
                h = driven.max(min_size).max(min_size / aspect);
                w = h * aspect;
            }
            None => {
                w = w.max(min_size);
                h = h.max(min_size);
            }
        }

        let fixed = self.corner.opposite().point(&self.orig);
        let x = if sx > 0.0 { fixed.x } else { fixed.x - w };
        let y = if sy > 0.0 { fixed.y } else { fixed.y - h };
        Rect::new(x, y, w, h)
    }

    fn rejected_by_cone(&self, next: &Rect, pointer: Point, tolerance_deg: f64) -> bool {
        let shrinks = next.width < self.orig.width || next.height < self.orig.height;
        let grows = next.width >= self.last.width && next.height >= self.last.height;
        if !shrinks || grows {
            return false;
        }

        let vx = pointer.x - self.last_pointer.x;
        let vy = pointer.y - self.last_pointer.y;
        let len = vx.hypot(vy);
        if len == 0.0 {
            return false;
        }
        // Diagonal from the dragged corner toward the fixed corner.
        let (sx, sy) = (self.corner.sx(), self.corner.sy());
        let diag_x = -sx * self.orig.width;
        let diag_y = -sy * self.orig.height;
        let diag_len = diag_x.hypot(diag_y);
        if diag_len == 0.0 {
            return false;
        }
        let cos = (vx * diag_x + vy * diag_y) / (len * diag_len);
        cos < tolerance_deg.to_radians().cos()
    }
}
