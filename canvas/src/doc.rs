//! Document model: canvas objects, their variants, and the in-memory store.
//!
//! `CanvasObject` carries the fields every object shares (id, geometry,
//! flags) and a closed `ObjectBody` sum over the four kinds. Adding a kind
//! is a compile-time change: the codec, hit-testing and the reducer all
//! match exhaustively.
//!
//! `DocStore` keeps the object list behind an `Arc` and never edits it in
//! place. Every mutation builds the next list and swaps it in, so a snapshot
//! handed out earlier stays internally consistent. Z-order is list order:
//! index 0 is drawn first.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::Rect;

/// Unique identifier for a canvas object.
pub type ObjectId = Uuid;

/// Progress of an image produced (or being produced) by a generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenStatus {
    #[default]
    Idle,
    Running,
    Done,
    Error,
}

impl GenStatus {
    /// Running and Error images are durable metadata even without pixels.
    #[must_use]
    pub fn is_placeholder(self) -> bool {
        matches!(self, Self::Running | Self::Error)
    }
}

/// Whether an image's pixels have reached the asset service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    #[default]
    Pending,
    Synced,
    Failed,
}

/// Where an image's pixels come from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageSource {
    /// No pixels yet (generation placeholder).
    #[default]
    Empty,
    /// Uploaded, content-addressed asset.
    Asset { asset_id: String, url: String },
    /// Durable remote URL not owned by the asset service.
    Remote { url: String },
    /// Pixels held only by this client, keyed into a local blob table.
    Local { key: String },
}

impl ImageSource {
    /// Classify a URL: `http(s)` is durable, `blob:` / `data:` / anything else is local.
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        if is_durable_url(url) {
            Self::Remote { url: url.to_owned() }
        } else {
            Self::Local { key: url.to_owned() }
        }
    }

    /// The URL to draw from, if the source has one.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Asset { url, .. } | Self::Remote { url } => Some(url),
            Self::Empty | Self::Local { .. } => None,
        }
    }

    #[must_use]
    pub fn asset_id(&self) -> Option<&str> {
        match self {
            Self::Asset { asset_id, .. } => Some(asset_id),
            _ => None,
        }
    }

    /// Resolved asset or durable remote URL.
    #[must_use]
    pub fn is_durable(&self) -> bool {
        matches!(self, Self::Asset { .. } | Self::Remote { .. })
    }
}

/// Whether `url` survives a reload (http/https).
#[must_use]
pub fn is_durable_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("https://") || lower.starts_with("http://")
}

/// Image-specific fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageBody {
    pub src: ImageSource,
    /// Content hash reported by the asset service.
    pub content_hash: Option<String>,
    pub natural_width: Option<u32>,
    pub natural_height: Option<u32>,
    pub status: GenStatus,
    pub sync: SyncStatus,
    pub sync_error: Option<String>,
    /// Positive, canvas-unique number used by `@imgN` mentions.
    pub ref_id: Option<u32>,
    /// Prompt that produced this image, kept for retry.
    pub prompt: Option<String>,
    /// Content hashes of the reference images used by that prompt.
    pub ref_hashes: Vec<String>,
    pub run_id: Option<String>,
    /// Size the run service will actually produce for this placeholder.
    pub effective_size: Option<String>,
    pub size_adjusted: bool,
    pub ratio_adjusted: bool,
    /// Last generation failure message.
    pub error: Option<String>,
}

impl ImageBody {
    /// Natural aspect ratio (w/h) when both dimensions are known.
    #[must_use]
    pub fn natural_aspect(&self) -> Option<f64> {
        match (self.natural_width, self.natural_height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some(f64::from(w) / f64::from(h)),
            _ => None,
        }
    }
}

/// Empty frame awaiting a generation prompt.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeneratorBody {
    pub prompt: String,
    /// Size the user asked for, e.g. `"1024x1024"`.
    pub requested_size: String,
    /// Size the server will actually produce.
    pub effective_size: Option<String>,
    pub size_adjusted: bool,
    pub ratio_adjusted: bool,
}

/// Vector shape variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Rect,
    Circle,
    Triangle,
    Star,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShapeBody {
    pub shape: ShapeKind,
    pub fill: String,
    pub stroke: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextBody {
    pub text: String,
    pub font_size: f64,
    pub color: String,
}

/// Closed set of object kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectBody {
    Image(ImageBody),
    Generator(GeneratorBody),
    Shape(ShapeBody),
    Text(TextBody),
}

/// Discriminant of `ObjectBody`, for logging and filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Image,
    Generator,
    Shape,
    Text,
}

/// One entity on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasObject {
    pub id: ObjectId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub locked: bool,
    pub hidden: bool,
    pub body: ObjectBody,
}

impl CanvasObject {
    /// New unlocked, visible object with a fresh id.
    #[must_use]
    pub fn new(rect: Rect, body: ObjectBody) -> Self {
        Self::with_id(Uuid::new_v4(), rect, body)
    }

    #[must_use]
    pub fn with_id(id: ObjectId, rect: Rect, body: ObjectBody) -> Self {
        Self { id, x: rect.x, y: rect.y, width: rect.width, height: rect.height, locked: false, hidden: false, body }
    }

    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        match self.body {
            ObjectBody::Image(_) => ObjectKind::Image,
            ObjectBody::Generator(_) => ObjectKind::Generator,
            ObjectBody::Shape(_) => ObjectKind::Shape,
            ObjectBody::Text(_) => ObjectKind::Text,
        }
    }

    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.x = rect.x;
        self.y = rect.y;
        self.width = rect.width;
        self.height = rect.height;
    }

    #[must_use]
    pub fn image(&self) -> Option<&ImageBody> {
        match &self.body {
            ObjectBody::Image(img) => Some(img),
            _ => None,
        }
    }

    pub fn image_mut(&mut self) -> Option<&mut ImageBody> {
        match &mut self.body {
            ObjectBody::Image(img) => Some(img),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_image(&self) -> bool {
        matches!(self.body, ObjectBody::Image(_))
    }

    /// Aspect ratio the resize engine locks to: the image's natural ratio,
    /// else the current box for images and generators. `None` for free kinds.
    #[must_use]
    pub fn locked_aspect(&self) -> Option<f64> {
        let current = if self.height > 0.0 { Some(self.width / self.height) } else { None };
        match &self.body {
            ObjectBody::Image(img) => img.natural_aspect().or(current),
            ObjectBody::Generator(_) => current,
            ObjectBody::Shape(_) | ObjectBody::Text(_) => None,
        }
    }
}

/// Sparse geometry/flag update. Only present fields are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ObjectPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub locked: Option<bool>,
    pub hidden: Option<bool>,
}

impl ObjectPatch {
    /// Patch that moves and resizes to `rect`.
    #[must_use]
    pub fn rect(rect: Rect) -> Self {
        Self { x: Some(rect.x), y: Some(rect.y), width: Some(rect.width), height: Some(rect.height), ..Self::default() }
    }

    fn apply(&self, obj: &mut CanvasObject) {
        if let Some(x) = self.x {
            obj.x = x;
        }
        if let Some(y) = self.y {
            obj.y = y;
        }
        if let Some(w) = self.width {
            obj.width = w;
        }
        if let Some(h) = self.height {
            obj.height = h;
        }
        if let Some(locked) = self.locked {
            obj.locked = locked;
        }
        if let Some(hidden) = self.hidden {
            obj.hidden = hidden;
        }
    }
}

/// Final asset metadata delivered when a run finishes an image.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FinishedImage {
    pub url: String,
    pub asset_id: Option<String>,
    pub content_hash: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Immutable mutation message. Every change that does not originate in the
/// pointer engine (job lifecycle, uploads, sync results) flows through
/// `DocStore::apply` so overlapping jobs never interleave read-modify-write.
#[derive(Debug, Clone, PartialEq)]
pub enum DocEvent {
    Insert(CanvasObject),
    Patch { id: ObjectId, patch: ObjectPatch },
    Delete { id: ObjectId },
    /// Turn the target (generator or image) into a Running image placeholder.
    GenerationStarted { id: ObjectId, prompt: String, ref_hashes: Vec<String> },
    /// The run service accepted the job, possibly adjusting its size.
    RunAttached {
        id: ObjectId,
        run_id: String,
        effective_size: Option<String>,
        size_adjusted: bool,
        ratio_adjusted: bool,
    },
    ImageDone { id: ObjectId, image: FinishedImage },
    ImageFailed { id: ObjectId, message: String },
    SyncSucceeded { id: ObjectId, asset_id: String, url: String, content_hash: String },
    SyncFailed { id: ObjectId, reason: String },
}

/// In-memory store of canvas objects in z-order.
#[derive(Debug, Clone, Default)]
pub struct DocStore {
    objects: Arc<Vec<CanvasObject>>,
    revision: u64,
    next_ref_id: u32,
}

impl DocStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { objects: Arc::new(Vec::new()), revision: 0, next_ref_id: 1 }
    }

    /// Shared, immutable view of the current list.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Vec<CanvasObject>> {
        Arc::clone(&self.objects)
    }

    /// Objects in z-order (bottom first).
    #[must_use]
    pub fn objects(&self) -> &[CanvasObject] {
        &self.objects
    }

    /// Bumped on every mutation; cheap change detection for autosave.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn get(&self, id: &ObjectId) -> Option<&CanvasObject> {
        self.objects.iter().find(|o| &o.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &ObjectId) -> bool {
        self.get(id).is_some()
    }

    /// Z position of an object.
    #[must_use]
    pub fn index_of(&self, id: &ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| &o.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Bounding boxes of every visible object.
    #[must_use]
    pub fn occupied_rects(&self) -> Vec<Rect> {
        self.objects.iter().filter(|o| !o.hidden).map(CanvasObject::rect).collect()
    }

    /// Find the image carrying reference number `ref_id`.
    #[must_use]
    pub fn find_by_ref(&self, ref_id: u32) -> Option<&CanvasObject> {
        self.objects
            .iter()
            .find(|o| o.image().and_then(|img| img.ref_id) == Some(ref_id))
    }

    /// Replace all objects with a decoded snapshot. Reference numbering
    /// resumes above the largest reference id present. Later objects
    /// repeating an id are dropped; images with a missing or repeated
    /// reference id get a fresh one.
    pub fn load_snapshot(&mut self, objects: Vec<CanvasObject>) {
        let max_ref = objects
            .iter()
            .filter_map(|o| o.image().and_then(|img| img.ref_id))
            .max()
            .unwrap_or(0);
        self.next_ref_id = max_ref.saturating_add(1).max(self.next_ref_id.max(1));

        let mut ids = HashSet::new();
        let mut refs = HashSet::new();
        let mut next = Vec::with_capacity(objects.len());
        for mut obj in objects {
            if !ids.insert(obj.id) {
                continue;
            }
            let taken = obj.image().and_then(|img| img.ref_id).is_some_and(|r| !refs.insert(r));
            if taken {
                if let Some(img) = obj.image_mut() {
                    img.ref_id = None;
                }
            }
            if obj.image().is_some_and(|img| img.ref_id.is_none()) {
                let ref_id = self.take_ref_id();
                refs.insert(ref_id);
                if let Some(img) = obj.image_mut() {
                    img.ref_id = Some(ref_id);
                }
            }
            next.push(obj);
        }
        self.commit(next);
    }

    /// Add an object on top. Images without a reference id get the next one.
    /// Returns `false` (and changes nothing) when the id already exists.
    pub fn insert(&mut self, mut obj: CanvasObject) -> bool {
        if self.contains(&obj.id) {
            return false;
        }
        self.assign_ref_id(&mut obj);
        let mut next = self.objects.as_ref().clone();
        next.push(obj);
        self.commit(next);
        true
    }

    /// Apply a partial update. Returns false if the object doesn't exist.
    pub fn apply_patch(&mut self, id: &ObjectId, patch: &ObjectPatch) -> bool {
        self.update(id, |obj| patch.apply(obj))
    }

    /// Remove an object, returning it if it was present.
    pub fn remove(&mut self, id: &ObjectId) -> Option<CanvasObject> {
        let idx = self.index_of(id)?;
        let mut next = self.objects.as_ref().clone();
        let removed = next.remove(idx);
        self.commit(next);
        Some(removed)
    }

    /// Move an object to the top of the z-order.
    pub fn bring_to_front(&mut self, id: &ObjectId) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        if idx + 1 == self.objects.len() {
            return true;
        }
        let mut next = self.objects.as_ref().clone();
        let obj = next.remove(idx);
        next.push(obj);
        self.commit(next);
        true
    }

    /// Run `f` against a copy of one object and commit the new list.
    pub fn update<F>(&mut self, id: &ObjectId, f: F) -> bool
    where
        F: FnOnce(&mut CanvasObject),
    {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        let mut next = self.objects.as_ref().clone();
        f(&mut next[idx]);
        self.commit(next);
        true
    }

    /// Reducer for `DocEvent`. Returns whether anything changed.
    pub fn apply(&mut self, event: DocEvent) -> bool {
        match event {
            DocEvent::Insert(obj) => self.insert(obj),
            DocEvent::Patch { id, patch } => self.apply_patch(&id, &patch),
            DocEvent::Delete { id } => self.remove(&id).is_some(),
            DocEvent::GenerationStarted { id, prompt, ref_hashes } => {
                let ref_id = self.get(&id).and_then(|o| o.image().and_then(|img| img.ref_id));
                let ref_id = ref_id.or_else(|| Some(self.take_ref_id()));
                self.update(&id, |obj| {
                    obj.body = ObjectBody::Image(ImageBody {
                        status: GenStatus::Running,
                        prompt: Some(prompt),
                        ref_hashes,
                        ref_id,
                        ..ImageBody::default()
                    });
                })
            }
            DocEvent::RunAttached { id, run_id, effective_size, size_adjusted, ratio_adjusted } => {
                self.update(&id, |obj| match &mut obj.body {
                    ObjectBody::Image(img) => {
                        img.run_id = Some(run_id);
                        img.effective_size = effective_size;
                        img.size_adjusted = size_adjusted;
                        img.ratio_adjusted = ratio_adjusted;
                    }
                    ObjectBody::Generator(g) => {
                        g.effective_size = effective_size;
                        g.size_adjusted = size_adjusted;
                        g.ratio_adjusted = ratio_adjusted;
                    }
                    ObjectBody::Shape(_) | ObjectBody::Text(_) => {}
                })
            }
            DocEvent::ImageDone { id, image } => self.update_image(&id, |img| {
                img.src = match image.asset_id {
                    Some(asset_id) => ImageSource::Asset { asset_id, url: image.url },
                    None => ImageSource::from_url(&image.url),
                };
                img.content_hash = image.content_hash;
                img.natural_width = image.width.or(img.natural_width);
                img.natural_height = image.height.or(img.natural_height);
                img.status = GenStatus::Done;
                img.error = None;
                img.sync = if img.src.is_durable() { SyncStatus::Synced } else { SyncStatus::Pending };
            }),
            DocEvent::ImageFailed { id, message } => self.update_image(&id, |img| {
                img.status = GenStatus::Error;
                img.error = Some(message);
            }),
            DocEvent::SyncSucceeded { id, asset_id, url, content_hash } => self.update_image(&id, |img| {
                img.src = ImageSource::Asset { asset_id, url };
                img.content_hash = Some(content_hash);
                img.sync = SyncStatus::Synced;
                img.sync_error = None;
            }),
            DocEvent::SyncFailed { id, reason } => self.update_image(&id, |img| {
                img.sync = SyncStatus::Failed;
                img.sync_error = Some(reason);
            }),
        }
    }

    fn update_image<F>(&mut self, id: &ObjectId, f: F) -> bool
    where
        F: FnOnce(&mut ImageBody),
    {
        if !self.get(id).is_some_and(CanvasObject::is_image) {
            return false;
        }
        self.update(id, |obj| {
            if let Some(img) = obj.image_mut() {
                f(img);
            }
        })
    }

    fn assign_ref_id(&mut self, obj: &mut CanvasObject) {
        let needs_ref = obj.image().is_some_and(|img| img.ref_id.is_none());
        if needs_ref {
            let ref_id = self.take_ref_id();
            if let Some(img) = obj.image_mut() {
                img.ref_id = Some(ref_id);
            }
        } else if let Some(existing) = obj.image().and_then(|img| img.ref_id) {
            self.next_ref_id = self.next_ref_id.max(existing.saturating_add(1));
        }
    }

    fn take_ref_id(&mut self) -> u32 {
        let id = self.next_ref_id.max(1);
        self.next_ref_id = id.saturating_add(1);
        id
    }

    fn commit(&mut self, next: Vec<CanvasObject>) {
        self.objects = Arc::new(next);
        self.revision += 1;
    }
}
