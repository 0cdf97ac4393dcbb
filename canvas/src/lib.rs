//! Pure engine for the generation canvas.
//!
//! Everything here is synchronous and free of I/O: the viewport transform,
//! the object model and its persistence codec, placement, resizing,
//! selection, and the pointer/keyboard gesture machine. The async service
//! layer (`studio`) owns an `EngineCore` behind a lock and turns the
//! [`engine::Action`]s it returns into frames, saves and network calls.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::EngineCore`]: document, viewport, selection and gestures |
//! | [`viewport`] | Transform target, frame guard, throttled snapshots, fit animation |
//! | [`camera`] | Points, rectangles, and world/screen conversion |
//! | [`doc`] | Canvas object variants, the snapshot-replace store, and its reducer |
//! | [`codec`] | Versioned persisted form (`encode` / `decode` / `parse_state`) |
//! | [`placement`] | Nearest non-overlapping slot search |
//! | [`resize`] | Corner resize with aspect lock and the shrink cone |
//! | [`selection`] | Ordered selection with two-phase reference chips |
//! | [`refs`] | `@imgN` mentions and reference resolution |
//! | [`hit`] | Hit-testing against objects and resize handles |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`consts`] | Shared numeric constants (zoom limits, grid step, caps) |

pub mod camera;
pub mod codec;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod hit;
pub mod input;
pub mod placement;
pub mod refs;
pub mod resize;
pub mod selection;
pub mod viewport;
