//! Viewport engine: the engine-owned transform target plus frame pacing.
//!
//! Pointer gestures write straight into the target camera. Two guards keep
//! that cheap:
//!
//! - `request_frame` coalesces any number of writes into one visual update per
//!   animation frame; the host only schedules a frame when it returns `true`.
//! - `take_snapshot` republishes zoom/camera to slower UI consumers (status
//!   bar, viewport persistence) at most once per `VIEW_PUBLISH_INTERVAL_MS`.
//!
//! Time is passed in explicitly as milliseconds so the engine stays testable.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use crate::camera::{Camera, Point, Rect, clamp_zoom};
use crate::consts::{FIT_ANIMATION_MS, FIT_MAX_ZOOM, FIT_PADDING_PX, VIEW_PUBLISH_INTERVAL_MS, WHEEL_ZOOM_STEP};

/// Read-only copy of the view exported to the rest of the system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSnapshot {
    pub camera: Camera,
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// World point at the middle of the viewport.
    pub center_world: Point,
}

#[derive(Debug, Clone, Copy)]
struct CameraAnimation {
    from: Camera,
    to: Camera,
    start_ms: f64,
    duration_ms: f64,
}

/// Cubic ease-out on `t` in `[0, 1]`.
#[must_use]
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Owns the live camera and decides when it is worth redrawing or republishing.
#[derive(Debug, Clone)]
pub struct ViewportEngine {
    target: Camera,
    width: f64,
    height: f64,
    frame_pending: bool,
    changed_since_publish: bool,
    last_publish_ms: Option<f64>,
    publish_interval_ms: f64,
    animation: Option<CameraAnimation>,
}

impl Default for ViewportEngine {
    fn default() -> Self {
        Self {
            target: Camera::default(),
            width: 0.0,
            height: 0.0,
            frame_pending: false,
            changed_since_publish: false,
            last_publish_ms: None,
            publish_interval_ms: VIEW_PUBLISH_INTERVAL_MS,
            animation: None,
        }
    }
}

impl ViewportEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- State ---

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.target
    }

    #[must_use]
    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Update the viewport's CSS size.
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.touch();
    }

    /// Replace the camera outright. Cancels any running animation.
    pub fn set_camera(&mut self, camera: Camera) {
        self.animation = None;
        self.target = Camera { zoom: clamp_zoom(camera.zoom), ..camera };
        self.touch();
    }

    /// Centre `center` (world) on screen at `zoom`.
    pub fn set_view(&mut self, center: Point, zoom: f64) {
        self.set_camera(Camera::centered_on(center, zoom, self.width, self.height));
    }

    /// World point at the viewport centre.
    #[must_use]
    pub fn world_center(&self) -> Point {
        self.target.screen_to_world(Point::new(self.width * 0.5, self.height * 0.5))
    }

    /// The visible world rectangle.
    #[must_use]
    pub fn visible_world_rect(&self) -> Rect {
        self.target.screen_rect_to_world(Rect::new(0.0, 0.0, self.width, self.height))
    }

    // --- High-frequency writes ---

    /// Pan by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.animation = None;
        self.target.pan_x += dx;
        self.target.pan_y += dy;
        self.touch();
    }

    /// Zoom to `next_zoom` keeping `screen` fixed.
    pub fn zoom_at(&mut self, screen: Point, next_zoom: f64) {
        self.animation = None;
        self.target.zoom_at(screen, next_zoom);
        self.touch();
    }

    /// Wheel zoom: each 100 px of downward delta zooms out by one step.
    pub fn wheel_zoom(&mut self, screen: Point, delta_y: f64) {
        let factor = WHEEL_ZOOM_STEP.powf(-delta_y / 100.0);
        self.zoom_at(screen, self.target.zoom * factor);
    }

    /// Start easing towards a camera that fits `rect`.
    pub fn animate_to_rect(&mut self, rect: Rect, now_ms: f64) {
        let to = Camera::fit_rect(rect, self.width, self.height, FIT_PADDING_PX, FIT_MAX_ZOOM);
        self.animation = Some(CameraAnimation { from: self.target, to, start_ms: now_ms, duration_ms: FIT_ANIMATION_MS });
        self.touch();
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    // --- Frame pacing ---

    /// Ask for a visual update. Returns `true` only when the caller must
    /// schedule a new animation frame; later calls within the same frame
    /// are absorbed.
    pub fn request_frame(&mut self) -> bool {
        if self.frame_pending {
            return false;
        }
        self.frame_pending = true;
        true
    }

    #[must_use]
    pub fn frame_pending(&self) -> bool {
        self.frame_pending
    }

    /// Run one animation frame. Advances the fit animation and returns the
    /// camera to draw with. When the animation is still running another frame
    /// is requested automatically, so the returned flag tells the host to keep
    /// scheduling.
    pub fn on_frame(&mut self, now_ms: f64) -> (Camera, bool) {
        self.frame_pending = false;
        if let Some(anim) = self.animation {
            let t = if anim.duration_ms > 0.0 { (now_ms - anim.start_ms) / anim.duration_ms } else { 1.0 };
            if t >= 1.0 {
                self.target = anim.to;
                self.animation = None;
            } else {
                self.target = anim.from.lerp(&anim.to, ease_out_cubic(t));
                self.frame_pending = true;
            }
            self.changed_since_publish = true;
        }
        (self.target, self.frame_pending)
    }

    // --- Throttled publish ---

    /// Return a snapshot when the view changed and the publish interval elapsed.
    pub fn take_snapshot(&mut self, now_ms: f64) -> Option<ViewSnapshot> {
        if !self.changed_since_publish {
            return None;
        }
        if let Some(last) = self.last_publish_ms {
            if now_ms - last < self.publish_interval_ms {
                return None;
            }
        }
        Some(self.publish(now_ms))
    }

    /// Whether a view change is waiting to be published.
    #[must_use]
    pub fn has_unpublished_changes(&self) -> bool {
        self.changed_since_publish
    }

    /// Publish regardless of the interval, e.g. when a gesture ends.
    pub fn flush_snapshot(&mut self, now_ms: f64) -> Option<ViewSnapshot> {
        if !self.changed_since_publish {
            return None;
        }
        Some(self.publish(now_ms))
    }

    /// Current view without touching publish bookkeeping.
    #[must_use]
    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            camera: self.target,
            viewport_width: self.width,
            viewport_height: self.height,
            center_world: self.world_center(),
        }
    }

    fn publish(&mut self, now_ms: f64) -> ViewSnapshot {
        self.changed_since_publish = false;
        self.last_publish_ms = Some(now_ms);
        self.snapshot()
    }

    fn touch(&mut self) {
        self.changed_since_publish = true;
    }
}
