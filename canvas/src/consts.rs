//! Shared numeric constants for the canvas crate.
//!
//! Interaction constants that were tuned by feel (grid step, cone tolerance)
//! are only defaults here; `PlacementParams` and `ResizeParams` carry the
//! values actually used so callers can override them.

// ── Viewport ────────────────────────────────────────────────────

/// Smallest zoom factor the viewport accepts.
pub const MIN_ZOOM: f64 = 0.05;

/// Largest zoom factor the viewport accepts.
pub const MAX_ZOOM: f64 = 3.0;

/// Zoom cap for `animate_to_rect`; fitting a tiny object never magnifies past this.
pub const FIT_MAX_ZOOM: f64 = 1.0;

/// Screen-space padding kept around a rectangle fitted by `animate_to_rect`.
pub const FIT_PADDING_PX: f64 = 96.0;

/// Duration of the fit-to-rect camera animation.
pub const FIT_ANIMATION_MS: f64 = 280.0;

/// Minimum spacing between republished view snapshots.
pub const VIEW_PUBLISH_INTERVAL_MS: f64 = 80.0;

/// Multiplicative zoom step per 100 px of wheel delta.
pub const WHEEL_ZOOM_STEP: f64 = 1.1;

// ── Hit-testing / gestures ──────────────────────────────────────

/// Screen-space hit slop in pixels for corner handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Pointer travel (screen px) below which a marquee drag counts as a click.
pub const CLICK_SLOP_PX: f64 = 3.0;

// ── Placement ───────────────────────────────────────────────────

/// Candidate grid spacing in world units.
pub const PLACEMENT_GRID_STEP: f64 = 48.0;

/// Gap kept between a placed rectangle and existing content.
pub const PLACEMENT_PADDING: f64 = 16.0;

/// Upper bound on grid rings searched, whatever the derived radius.
pub const MAX_PLACEMENT_RINGS: i32 = 160;

// ── Resize ──────────────────────────────────────────────────────

/// Minimum object width and height in world units.
pub const MIN_OBJECT_SIZE: f64 = 40.0;

/// Maximum angle between a shrinking drag and the resize diagonal.
pub const CONE_TOLERANCE_DEG: f64 = 25.0;

// ── Persistence ─────────────────────────────────────────────────

/// Current persisted canvas schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Hard cap on persisted elements.
pub const MAX_PERSISTED_ELEMENTS: usize = 200;

/// Default edge length of a new generation placeholder.
pub const DEFAULT_GENERATION_SIZE: f64 = 1024.0;
