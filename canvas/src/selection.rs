//! Selection and the two-phase reference manager.
//!
//! DESIGN
//! ======
//! Selecting an image makes it a *pending* reference: a chip the user sees
//! next to the prompt box but hasn't committed to. `confirm` (composer focus
//! or submit) promotes pending chips to confirmed references. Deselecting or
//! clearing drops a chip in either phase. Non-image objects are selected
//! without ever touching the reference sets.
//!
//! Selection order is preserved; the first id is the primary selection that
//! owns the resize handles.

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use crate::camera::{Camera, Point, Rect};
use crate::consts::CLICK_SLOP_PX;
use crate::doc::{DocStore, ObjectId};
use crate::hit::objects_in_rect;

/// Per-object position in the selection state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Unselected,
    /// Selected without a reference (shapes, text, generators).
    Selected,
    /// Selected image whose reference chip is not yet confirmed.
    PendingReference,
    /// Image committed as a prompt reference.
    Confirmed,
}

/// Ordered selection plus pending and confirmed reference sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<ObjectId>,
    pending: Vec<ObjectId>,
    confirmed: Vec<ObjectId>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected ids, primary first.
    #[must_use]
    pub fn ids(&self) -> &[ObjectId] {
        &self.ids
    }

    #[must_use]
    pub fn primary(&self) -> Option<ObjectId> {
        self.ids.first().copied()
    }

    #[must_use]
    pub fn contains(&self, id: &ObjectId) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Unconfirmed reference chips.
    #[must_use]
    pub fn pending(&self) -> &[ObjectId] {
        &self.pending
    }

    /// Confirmed references in confirmation order.
    #[must_use]
    pub fn references(&self) -> &[ObjectId] {
        &self.confirmed
    }

    #[must_use]
    pub fn state_of(&self, id: &ObjectId) -> SelectionState {
        if self.confirmed.contains(id) {
            SelectionState::Confirmed
        } else if self.pending.contains(id) {
            SelectionState::PendingReference
        } else if self.ids.contains(id) {
            SelectionState::Selected
        } else {
            SelectionState::Unselected
        }
    }

    /// Replace the selection. Images become pending references; pending
    /// chips of images no longer selected are discarded.
    pub fn replace(&mut self, ids: &[ObjectId], doc: &DocStore) {
        self.ids.clear();
        push_unique(&mut self.ids, ids.iter().copied());
        self.pending.clear();
        let images: Vec<ObjectId> = self.images_needing_chip(ids, doc);
        push_unique(&mut self.pending, images);
    }

    /// Add to the selection; images become pending references.
    pub fn add(&mut self, ids: &[ObjectId], doc: &DocStore) {
        push_unique(&mut self.ids, ids.iter().copied());
        let images = self.images_needing_chip(ids, doc);
        push_unique(&mut self.pending, images);
    }

    /// Deselect; drops the objects' chips in either phase.
    pub fn remove(&mut self, ids: &[ObjectId]) {
        self.ids.retain(|id| !ids.contains(id));
        self.pending.retain(|id| !ids.contains(id));
        self.confirmed.retain(|id| !ids.contains(id));
    }

    /// Select without creating or clearing references.
    pub fn replace_without_reference(&mut self, ids: &[ObjectId]) {
        self.ids.clear();
        push_unique(&mut self.ids, ids.iter().copied());
    }

    /// Empty the selection and both reference sets.
    pub fn clear(&mut self) {
        self.ids.clear();
        self.pending.clear();
        self.confirmed.clear();
    }

    /// Promote pending chips to confirmed references. Returns the newly confirmed ids.
    pub fn confirm(&mut self) -> Vec<ObjectId> {
        let promoted = std::mem::take(&mut self.pending);
        push_unique(&mut self.confirmed, promoted.iter().copied());
        promoted
    }

    /// Drop ids that no longer exist in `doc`.
    pub fn retain_existing(&mut self, doc: &DocStore) -> bool {
        let before = (self.ids.len(), self.pending.len(), self.confirmed.len());
        self.ids.retain(|id| doc.contains(id));
        self.pending.retain(|id| doc.contains(id));
        self.confirmed.retain(|id| doc.contains(id));
        before != (self.ids.len(), self.pending.len(), self.confirmed.len())
    }

    /// Finish a marquee drag from `start` to `end` (screen points).
    ///
    /// Travel under the click slop is a plain click and clears the selection.
    /// Otherwise visible objects intersecting the world rectangle are selected,
    /// merged into the current selection when `merge` is set.
    pub fn marquee(&mut self, doc: &DocStore, camera: &Camera, start: Point, end: Point, merge: bool) {
        if start.distance(end) < CLICK_SLOP_PX {
            self.clear();
            return;
        }
        let world = camera.screen_rect_to_world(Rect::from_corners(start, end));
        let hits = objects_in_rect(doc, &world);
        if merge {
            self.add(&hits, doc);
        } else {
            self.replace(&hits, doc);
        }
    }

    fn images_needing_chip(&self, ids: &[ObjectId], doc: &DocStore) -> Vec<ObjectId> {
        ids.iter()
            .copied()
            .filter(|id| doc.get(id).is_some_and(|o| o.is_image()))
            .filter(|id| !self.confirmed.contains(id))
            .collect()
    }
}

fn push_unique(dst: &mut Vec<ObjectId>, ids: impl IntoIterator<Item = ObjectId>) {
    for id in ids {
        if !dst.contains(&id) {
            dst.push(id);
        }
    }
}
