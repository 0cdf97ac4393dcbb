//! Camera math: points, rectangles, and the world/screen transform.
//!
//! The transform is `screen = world * zoom + pan`. `pan_x` / `pan_y` are in
//! screen pixels, so panning never depends on the current zoom.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_ZOOM, MIN_ZOOM};

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Axis-aligned rectangle; `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle of the given size centred on `center`.
    #[must_use]
    pub fn centered(center: Point, width: f64, height: f64) -> Self {
        Self { x: center.x - width * 0.5, y: center.y - height * 0.5, width, height }
    }

    /// Normalized rectangle spanning two arbitrary corners.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self { x: a.x.min(b.x), y: a.y.min(b.y), width: (a.x - b.x).abs(), height: (a.y - b.y).abs() }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Grow the rectangle by `pad` on every side.
    #[must_use]
    pub fn inflate(&self, pad: f64) -> Self {
        Self { x: self.x - pad, y: self.y - pad, width: self.width + pad * 2.0, height: self.height + pad * 2.0 }
    }

    /// Whether the interiors overlap. Rectangles that only share an edge do not.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right() && other.x < self.right() && self.y < other.bottom() && other.y < self.bottom()
    }

    /// Whether `pt` lies inside or on the boundary.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x && pt.x <= self.right() && pt.y >= self.y && pt.y <= self.bottom()
    }

    /// Smallest rectangle covering both.
    #[must_use]
    pub fn union(&self, other: &Rect) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Self { x, y, width: self.right().max(other.right()) - x, height: self.bottom().max(other.bottom()) - y }
    }
}

/// Clamp a zoom factor into `[MIN_ZOOM, MAX_ZOOM]`. Non-finite input maps to 1.0.
#[must_use]
pub fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_finite() { zoom.clamp(MIN_ZOOM, MAX_ZOOM) } else { 1.0 }
}

/// Camera state for pan/zoom on the infinite canvas.
///
/// Serializes to the viewport wire format `{z, x, y}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    #[serde(rename = "x")]
    pub pan_x: f64,
    #[serde(rename = "y")]
    pub pan_y: f64,
    #[serde(rename = "z")]
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    /// Convert a screen-space point (CSS pixels) to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point { x: (screen.x - self.pan_x) / self.zoom, y: (screen.y - self.pan_y) / self.zoom }
    }

    /// Convert a world-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point { x: world.x * self.zoom + self.pan_x, y: world.y * self.zoom + self.pan_y }
    }

    /// Convert a screen-space distance (pixels) to world-space distance.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }

    /// Convert a screen-space rectangle to world space.
    #[must_use]
    pub fn screen_rect_to_world(&self, rect: Rect) -> Rect {
        let a = self.screen_to_world(Point::new(rect.x, rect.y));
        let b = self.screen_to_world(Point::new(rect.right(), rect.bottom()));
        Rect::from_corners(a, b)
    }

    /// Change zoom while keeping the world point under `screen` fixed.
    pub fn zoom_at(&mut self, screen: Point, next_zoom: f64) {
        let anchor = self.screen_to_world(screen);
        self.zoom = clamp_zoom(next_zoom);
        self.pan_x = screen.x - anchor.x * self.zoom;
        self.pan_y = screen.y - anchor.y * self.zoom;
    }

    /// Camera showing `center` (world) at the middle of a `vw`×`vh` viewport.
    #[must_use]
    pub fn centered_on(center: Point, zoom: f64, vw: f64, vh: f64) -> Self {
        let zoom = clamp_zoom(zoom);
        Self { pan_x: vw * 0.5 - center.x * zoom, pan_y: vh * 0.5 - center.y * zoom, zoom }
    }

    /// Camera that fits `rect` inside a `vw`×`vh` viewport with `padding_px`
    /// on each side, never zooming in beyond `max_zoom`.
    #[must_use]
    pub fn fit_rect(rect: Rect, vw: f64, vh: f64, padding_px: f64, max_zoom: f64) -> Self {
        let avail_w = (vw - padding_px * 2.0).max(1.0);
        let avail_h = (vh - padding_px * 2.0).max(1.0);
        let zx = if rect.width > 0.0 { avail_w / rect.width } else { max_zoom };
        let zy = if rect.height > 0.0 { avail_h / rect.height } else { max_zoom };
        let zoom = zx.min(zy).min(max_zoom);
        Self::centered_on(rect.center(), zoom, vw, vh)
    }

    /// Linear interpolation between two cameras at `t` in `[0, 1]`.
    #[must_use]
    pub fn lerp(&self, to: &Camera, t: f64) -> Self {
        Self {
            pan_x: self.pan_x + (to.pan_x - self.pan_x) * t,
            pan_y: self.pan_y + (to.pan_y - self.pan_y) * t,
            zoom: self.zoom + (to.zoom - self.zoom) * t,
        }
    }
}
