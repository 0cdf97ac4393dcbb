//! Engine core: document, viewport, selection and gestures in one owner.
//!
//! DESIGN
//! ======
//! `EngineCore` is the single explicit application state for the canvas. Input
//! handlers mutate it synchronously and return `Action`s describing what the
//! host must do next (schedule a frame, autosave, refresh selection chrome,
//! republish the view). Nothing here blocks or performs I/O.
//!
//! Camera writes from gestures go to the viewport's transform target and are
//! coalesced per animation frame; the host drives `on_frame` with a clock.

use crate::camera::{Camera, Point, Rect};
use crate::doc::{CanvasObject, DocEvent, DocStore, ObjectBody, ObjectId, ObjectPatch};
use crate::hit::{HitPart, hit_test};
use crate::input::{Button, InputState, Key, Modifiers, WheelDelta};
use crate::placement::{PlacementParams, find_free_slot, search_radius};
use crate::refs::{self, ReferenceList};
use crate::resize::{ResizeParams, ResizeSession};
use crate::selection::Selection;
use crate::viewport::{ViewSnapshot, ViewportEngine};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Schedule one animation frame, then call `on_frame`.
    RequestFrame,
    /// Redraw overlay state (marquee, handles) without a camera change.
    RenderNeeded,
    /// The document changed; autosave should be notified.
    ObjectsChanged,
    SelectionChanged,
    /// Throttled view snapshot for UI display and viewport persistence.
    ViewChanged(ViewSnapshot),
}

/// Core engine state.
#[derive(Debug, Clone, Default)]
pub struct EngineCore {
    pub doc: DocStore,
    pub viewport: ViewportEngine,
    pub selection: Selection,
    pub input: InputState,
    pub placement: PlacementParams,
    pub resize: ResizeParams,
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with custom interaction tunables.
    #[must_use]
    pub fn with_params(placement: PlacementParams, resize: ResizeParams) -> Self {
        Self { placement, resize, ..Self::default() }
    }

    // --- Data inputs ---

    /// Replace the document with decoded objects.
    pub fn load_snapshot(&mut self, objects: Vec<CanvasObject>) {
        self.doc.load_snapshot(objects);
        self.selection.retain_existing(&self.doc);
        self.input = InputState::Idle;
    }

    /// Apply a mutation message. Deleted objects leave the selection.
    pub fn apply(&mut self, event: DocEvent) -> bool {
        let changed = self.doc.apply(event);
        if changed {
            self.selection.retain_existing(&self.doc);
        }
        changed
    }

    /// Nearest free rectangle for a new `width`×`height` object around
    /// `target` (default: the viewport's world centre).
    #[must_use]
    pub fn place(&self, width: f64, height: f64, target: Option<Point>) -> Rect {
        let target = target.unwrap_or_else(|| self.viewport.world_center());
        let occupied = self.doc.occupied_rects();
        let params = PlacementParams {
            search_radius: self
                .placement
                .search_radius
                .or_else(|| Some(search_radius(self.viewport.visible_world_rect(), &occupied, width, height))),
            ..self.placement
        };
        find_free_slot(&occupied, width, height, target, &params)
    }

    /// Place and insert a new object in one step so consecutive calls see
    /// each other's rectangles.
    pub fn insert_placed(&mut self, body: ObjectBody, width: f64, height: f64, target: Option<Point>) -> ObjectId {
        let rect = self.place(width, height, target);
        let obj = CanvasObject::new(rect, body);
        let id = obj.id;
        self.doc.insert(obj);
        id
    }

    /// Promote pending reference chips (composer focus / submit).
    pub fn confirm_references(&mut self) -> Vec<ObjectId> {
        self.selection.confirm()
    }

    /// Reference list for `prompt` plus the confirmed chips.
    #[must_use]
    pub fn references_for(&self, prompt: &str) -> ReferenceList {
        refs::resolve(&self.doc, prompt, self.selection.references())
    }

    // --- Viewport ---

    pub fn set_viewport_size(&mut self, width: f64, height: f64) -> Vec<Action> {
        self.viewport.set_size(width, height);
        self.frame_action()
    }

    /// Restore a persisted camera.
    pub fn restore_camera(&mut self, camera: Camera) -> Vec<Action> {
        self.viewport.set_camera(camera);
        self.frame_action()
    }

    /// Ease the camera to frame an object.
    pub fn focus_object(&mut self, id: &ObjectId, now_ms: f64) -> Vec<Action> {
        let Some(rect) = self.doc.get(id).map(CanvasObject::rect) else {
            return Vec::new();
        };
        self.viewport.animate_to_rect(rect, now_ms);
        self.frame_action()
    }

    /// Drive one animation frame. A view change still inside the publish
    /// interval keeps frames coming until its snapshot goes out.
    pub fn on_frame(&mut self, now_ms: f64) -> Vec<Action> {
        let (_, mut keep_going) = self.viewport.on_frame(now_ms);
        let mut actions = Vec::new();
        match self.viewport.take_snapshot(now_ms) {
            Some(snap) => actions.push(Action::ViewChanged(snap)),
            None => {
                if !keep_going && self.viewport.has_unpublished_changes() {
                    keep_going = self.viewport.request_frame();
                }
            }
        }
        if keep_going {
            actions.insert(0, Action::RequestFrame);
        }
        actions
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        match button {
            Button::Middle => {
                self.input = InputState::Panning { last_screen: screen };
                Vec::new()
            }
            Button::Secondary => Vec::new(),
            Button::Primary => self.primary_down(screen, modifiers),
        }
    }

    fn primary_down(&mut self, screen: Point, modifiers: Modifiers) -> Vec<Action> {
        let camera = self.viewport.camera();
        let world = camera.screen_to_world(screen);
        let hit = hit_test(world, &self.doc, &camera, self.selection.primary());

        let Some(hit) = hit else {
            self.input = InputState::Marquee { start_screen: screen, current_screen: screen, merge: modifiers.shift };
            return vec![Action::RenderNeeded];
        };

        if let HitPart::ResizeHandle(corner) = hit.part {
            let Some(obj) = self.doc.get(&hit.object_id) else {
                return Vec::new();
            };
            let aspect = if modifiers.shift { None } else { obj.locked_aspect() };
            let session = ResizeSession::begin(corner, obj.rect(), screen, aspect);
            self.input = InputState::Resizing { id: hit.object_id, session };
            return Vec::new();
        }

        let mut actions = Vec::new();
        if !self.selection.contains(&hit.object_id) {
            let is_image = self.doc.get(&hit.object_id).is_some_and(CanvasObject::is_image);
            let ids = [hit.object_id];
            if modifiers.shift {
                self.selection.add(&ids, &self.doc);
            } else if is_image {
                self.selection.replace(&ids, &self.doc);
            } else {
                self.selection.replace_without_reference(&ids);
            }
            actions.push(Action::SelectionChanged);
            actions.push(Action::RenderNeeded);
        }
        self.input = InputState::DraggingObjects { last_world: world, moved: false };
        actions
    }

    pub fn on_pointer_move(&mut self, screen: Point, _modifiers: Modifiers) -> Vec<Action> {
        match std::mem::take(&mut self.input) {
            InputState::Idle => Vec::new(),
            InputState::Panning { last_screen } => {
                self.viewport.pan_by(screen.x - last_screen.x, screen.y - last_screen.y);
                self.input = InputState::Panning { last_screen: screen };
                self.frame_action()
            }
            InputState::DraggingObjects { last_world, .. } => {
                let world = self.viewport.camera().screen_to_world(screen);
                let (dx, dy) = (world.x - last_world.x, world.y - last_world.y);
                let mut changed = false;
                for id in self.selection.ids().to_vec() {
                    let Some(obj) = self.doc.get(&id).filter(|o| !o.locked) else {
                        continue;
                    };
                    let patch = ObjectPatch { x: Some(obj.x + dx), y: Some(obj.y + dy), ..ObjectPatch::default() };
                    changed |= self.doc.apply_patch(&id, &patch);
                }
                self.input = InputState::DraggingObjects { last_world: world, moved: true };
                if changed { self.frame_action() } else { Vec::new() }
            }
            InputState::Resizing { id, mut session } => {
                let frame = session.update(screen, self.viewport.camera().zoom, &self.resize);
                let changed = frame.accepted && self.doc.apply_patch(&id, &ObjectPatch::rect(frame.rect));
                self.input = InputState::Resizing { id, session };
                if changed { self.frame_action() } else { Vec::new() }
            }
            InputState::Marquee { start_screen, merge, .. } => {
                self.input = InputState::Marquee { start_screen, current_screen: screen, merge };
                vec![Action::RenderNeeded]
            }
        }
    }

    pub fn on_pointer_up(&mut self, screen: Point, _button: Button, _modifiers: Modifiers) -> Vec<Action> {
        match std::mem::take(&mut self.input) {
            InputState::Idle | InputState::Panning { .. } => Vec::new(),
            InputState::DraggingObjects { moved, .. } => {
                if moved {
                    vec![Action::ObjectsChanged]
                } else {
                    Vec::new()
                }
            }
            InputState::Resizing { session, .. } => {
                if session.current() == session.original() {
                    Vec::new()
                } else {
                    vec![Action::ObjectsChanged]
                }
            }
            InputState::Marquee { start_screen, merge, .. } => {
                let before = self.selection.clone();
                let camera = self.viewport.camera();
                self.selection.marquee(&self.doc, &camera, start_screen, screen, merge);
                let mut actions = vec![Action::RenderNeeded];
                if self.selection != before {
                    actions.push(Action::SelectionChanged);
                }
                actions
            }
        }
    }

    pub fn on_wheel(&mut self, screen: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        if modifiers.shift {
            self.viewport.pan_by(-delta.dx, -delta.dy);
        } else {
            self.viewport.wheel_zoom(screen, delta.dy);
        }
        self.frame_action()
    }

    pub fn on_key_down(&mut self, key: &Key, _modifiers: Modifiers) -> Vec<Action> {
        if key.is("Escape") {
            self.input = InputState::Idle;
            if self.selection.is_empty() && self.selection.references().is_empty() {
                return Vec::new();
            }
            self.selection.clear();
            return vec![Action::SelectionChanged, Action::RenderNeeded];
        }
        if key.is("Delete") || key.is("Backspace") {
            return self.delete_selected();
        }
        Vec::new()
    }

    fn delete_selected(&mut self) -> Vec<Action> {
        let ids: Vec<ObjectId> = self
            .selection
            .ids()
            .iter()
            .copied()
            .filter(|id| self.doc.get(id).is_some_and(|o| !o.locked))
            .collect();
        if ids.is_empty() {
            return Vec::new();
        }
        for id in &ids {
            self.doc.remove(id);
        }
        self.selection.remove(&ids);
        vec![Action::ObjectsChanged, Action::SelectionChanged, Action::RenderNeeded]
    }

    // --- Queries ---

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.viewport.camera()
    }

    #[must_use]
    pub fn object(&self, id: &ObjectId) -> Option<&CanvasObject> {
        self.doc.get(id)
    }

    /// Current marquee rectangle in screen space, for overlay drawing.
    #[must_use]
    pub fn marquee_rect(&self) -> Option<Rect> {
        match self.input {
            InputState::Marquee { start_screen, current_screen, .. } => {
                Some(Rect::from_corners(start_screen, current_screen))
            }
            _ => None,
        }
    }

    fn frame_action(&mut self) -> Vec<Action> {
        if self.viewport.request_frame() { vec![Action::RequestFrame] } else { Vec::new() }
    }
}
