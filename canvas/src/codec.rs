//! Persistence codec: versioned projection of the object list.
//!
//! DESIGN
//! ======
//! The persisted form is deliberately lossy. Pixels that exist only in this
//! client (blob / data URLs) cannot survive a reload, so `encode` drops those
//! images and counts them. Running and Error placeholders carry no pixels but
//! are kept: they hold the prompt needed for retry and show the user that a
//! job was in flight.
//!
//! `decode` is the mirror image. Asset ids are resolved against the current
//! asset table; images that resolve to nothing durable are dropped and
//! reported in `DecodeOutcome` so the caller can tell the user. Object ids
//! stay unique: a later element repeating an id is dropped.
//!
//! ERROR HANDLING
//! ==============
//! `parse_state` is the only fallible entry point. Any payload that isn't a
//! schema-1 document is a `CodecError`, which callers treat as a schema
//! mismatch and rebuild from the asset list.

#[cfg(test)]
#[path = "codec_test.rs"]
mod codec_test;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::camera::Rect;
use crate::consts::{MAX_PERSISTED_ELEMENTS, SCHEMA_VERSION};
use crate::doc::{
    CanvasObject, GenStatus, GeneratorBody, ImageBody, ImageSource, ObjectBody, ObjectId, ShapeBody, ShapeKind,
    SyncStatus, TextBody, is_durable_url,
};

/// Errors from parsing a persisted canvas payload.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("unsupported schema version: {0}")]
    UnsupportedVersion(u32),
    #[error("malformed canvas payload: {0}")]
    Malformed(String),
}

/// Top-level persisted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub schema_version: u32,
    #[serde(default)]
    pub meta: PersistedMeta,
    #[serde(default)]
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedMeta {
    #[serde(default)]
    pub skipped_local_only_images: u32,
}

/// On-disk projection of one canvas object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ObjectId,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub z: u32,
    #[serde(default, skip_serializing_if = "is_false")]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    #[serde(flatten)]
    pub body: ElementBody,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(v: &bool) -> bool {
    !*v
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ElementBody {
    Image(ImageElement),
    Generator(GeneratorElement),
    Shape(ShapeElement),
    Text(TextElement),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageElement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    /// Durable URL (http/https) for images not owned by the asset service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub natural_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub natural_height: Option<u32>,
    pub status: GenStatus,
    pub sync_status: SyncStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ref_hashes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_size: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub size_adjusted: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub ratio_adjusted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorElement {
    pub prompt: String,
    pub requested_size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_size: Option<String>,
    pub size_adjusted: bool,
    pub ratio_adjusted: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShapeElement {
    pub shape: ShapeKind,
    pub fill: String,
    pub stroke: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextElement {
    pub text: String,
    pub font_size: f64,
    pub color: String,
}

/// Asset id → URL lookup used when decoding.
#[derive(Debug, Clone, Default)]
pub struct AssetTable {
    urls: HashMap<String, String>,
}

impl AssetTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, asset_id: impl Into<String>, url: impl Into<String>) {
        self.urls.insert(asset_id.into(), url.into());
    }

    #[must_use]
    pub fn resolve(&self, asset_id: &str) -> Option<&str> {
        self.urls.get(asset_id).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AssetTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (k, v) in iter {
            table.insert(k, v);
        }
        table
    }
}

/// Result of `decode`: surviving objects plus what was lost.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodeOutcome {
    pub objects: Vec<CanvasObject>,
    /// Images whose asset id no longer resolves.
    pub missing_assets: u32,
    /// Images that never had a durable source.
    pub local_only_images: u32,
    /// Elements dropped because an earlier element already used their id.
    pub duplicate_ids: u32,
}

// =============================================================================
// ENCODE
// =============================================================================

/// Project the object list (z-order) into its persisted form.
#[must_use]
pub fn encode(objects: &[CanvasObject]) -> PersistedState {
    let mut elements = Vec::new();
    let mut skipped_local_only_images = 0u32;

    for obj in objects {
        if elements.len() >= MAX_PERSISTED_ELEMENTS {
            break;
        }
        let body = match &obj.body {
            ObjectBody::Image(img) => match encode_image(img) {
                Some(el) => ElementBody::Image(el),
                None => {
                    if matches!(img.src, ImageSource::Local { .. }) {
                        skipped_local_only_images += 1;
                    }
                    continue;
                }
            },
            ObjectBody::Generator(g) => ElementBody::Generator(GeneratorElement {
                prompt: g.prompt.clone(),
                requested_size: g.requested_size.clone(),
                effective_size: g.effective_size.clone(),
                size_adjusted: g.size_adjusted,
                ratio_adjusted: g.ratio_adjusted,
            }),
            ObjectBody::Shape(s) => {
                ElementBody::Shape(ShapeElement { shape: s.shape, fill: s.fill.clone(), stroke: s.stroke.clone() })
            }
            ObjectBody::Text(t) => {
                ElementBody::Text(TextElement { text: t.text.clone(), font_size: t.font_size, color: t.color.clone() })
            }
        };
        let z = u32::try_from(elements.len()).unwrap_or(u32::MAX);
        elements.push(Element {
            id: obj.id,
            x: obj.x,
            y: obj.y,
            w: obj.width,
            h: obj.height,
            z,
            locked: obj.locked,
            hidden: obj.hidden,
            body,
        });
    }

    PersistedState {
        schema_version: SCHEMA_VERSION,
        meta: PersistedMeta { skipped_local_only_images },
        elements,
    }
}

/// `None` when the image has nothing durable and isn't a placeholder.
fn encode_image(img: &ImageBody) -> Option<ImageElement> {
    let (asset_id, src) = match &img.src {
        ImageSource::Asset { asset_id, url } => (Some(asset_id.clone()), Some(url.clone())),
        ImageSource::Remote { url } => (None, Some(url.clone())),
        ImageSource::Empty | ImageSource::Local { .. } => {
            if !img.status.is_placeholder() {
                return None;
            }
            (None, None)
        }
    };
    Some(ImageElement {
        asset_id,
        src,
        content_hash: img.content_hash.clone(),
        natural_width: img.natural_width,
        natural_height: img.natural_height,
        status: img.status,
        sync_status: img.sync,
        sync_error: img.sync_error.clone(),
        ref_id: img.ref_id,
        prompt: img.prompt.clone(),
        ref_hashes: img.ref_hashes.clone(),
        run_id: img.run_id.clone(),
        effective_size: img.effective_size.clone(),
        size_adjusted: img.size_adjusted,
        ratio_adjusted: img.ratio_adjusted,
        error: img.error.clone(),
    })
}

/// Canonical string form used for save change detection.
#[must_use]
pub fn serialize(state: &PersistedState) -> String {
    serde_json::to_string(state).unwrap_or_default()
}

// =============================================================================
// DECODE
// =============================================================================

/// Parse and validate a persisted payload.
///
/// # Errors
///
/// Returns `CodecError::Malformed` for JSON that doesn't match the element
/// schema and `CodecError::UnsupportedVersion` for any version but the current.
pub fn parse_state(raw: &str) -> Result<PersistedState, CodecError> {
    let value: serde_json::Value = serde_json::from_str(raw).map_err(|e| CodecError::Malformed(e.to_string()))?;
    let version = value
        .get("schemaVersion")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| CodecError::Malformed("missing schemaVersion".into()))?;
    let version = u32::try_from(version).map_err(|_| CodecError::UnsupportedVersion(u32::MAX))?;
    if version != SCHEMA_VERSION {
        return Err(CodecError::UnsupportedVersion(version));
    }
    serde_json::from_value(value).map_err(|e| CodecError::Malformed(e.to_string()))
}

/// Rebuild objects from a persisted state, resolving asset ids.
#[must_use]
pub fn decode(state: &PersistedState, assets: &AssetTable) -> DecodeOutcome {
    let mut elements: Vec<&Element> = state.elements.iter().collect();
    elements.sort_by_key(|el| el.z);

    let mut outcome = DecodeOutcome::default();
    let mut seen_ids = HashSet::new();
    let mut seen_refs = HashSet::new();
    for el in elements {
        if !seen_ids.insert(el.id) {
            outcome.duplicate_ids += 1;
            continue;
        }
        let body = match &el.body {
            ElementBody::Image(img) => match decode_image(img, assets) {
                Ok(mut body) => {
                    // A repeated reference number is dropped; the store hands out a fresh one.
                    if body.ref_id.is_some_and(|r| !seen_refs.insert(r)) {
                        body.ref_id = None;
                    }
                    ObjectBody::Image(body)
                }
                Err(Lost::MissingAsset) => {
                    outcome.missing_assets += 1;
                    continue;
                }
                Err(Lost::LocalOnly) => {
                    outcome.local_only_images += 1;
                    continue;
                }
            },
            ElementBody::Generator(g) => ObjectBody::Generator(GeneratorBody {
                prompt: g.prompt.clone(),
                requested_size: g.requested_size.clone(),
                effective_size: g.effective_size.clone(),
                size_adjusted: g.size_adjusted,
                ratio_adjusted: g.ratio_adjusted,
            }),
            ElementBody::Shape(s) => {
                ObjectBody::Shape(ShapeBody { shape: s.shape, fill: s.fill.clone(), stroke: s.stroke.clone() })
            }
            ElementBody::Text(t) => {
                ObjectBody::Text(TextBody { text: t.text.clone(), font_size: t.font_size, color: t.color.clone() })
            }
        };
        let mut obj = CanvasObject::with_id(el.id, Rect::new(el.x, el.y, el.w, el.h), body);
        obj.locked = el.locked;
        obj.hidden = el.hidden;
        outcome.objects.push(obj);
    }
    outcome
}

enum Lost {
    MissingAsset,
    LocalOnly,
}

fn decode_image(el: &ImageElement, assets: &AssetTable) -> Result<ImageBody, Lost> {
    let durable_src = el.src.as_deref().filter(|s| is_durable_url(s));
    let resolved = el.asset_id.as_deref().and_then(|id| assets.resolve(id));
    let src = match (el.asset_id.as_deref(), resolved.or(durable_src)) {
        (Some(id), Some(url)) => ImageSource::Asset { asset_id: id.to_owned(), url: url.to_owned() },
        (None, Some(url)) => ImageSource::Remote { url: url.to_owned() },
        (asset_id, None) => {
            if !el.status.is_placeholder() {
                return Err(if asset_id.is_some() { Lost::MissingAsset } else { Lost::LocalOnly });
            }
            ImageSource::Empty
        }
    };
    Ok(ImageBody {
        src,
        content_hash: el.content_hash.clone(),
        natural_width: el.natural_width,
        natural_height: el.natural_height,
        status: el.status,
        sync: el.sync_status,
        sync_error: el.sync_error.clone(),
        ref_id: el.ref_id.filter(|id| *id > 0),
        prompt: el.prompt.clone(),
        ref_hashes: el.ref_hashes.clone(),
        run_id: el.run_id.clone(),
        effective_size: el.effective_size.clone(),
        size_adjusted: el.size_adjusted,
        ratio_adjusted: el.ratio_adjusted,
        error: el.error.clone(),
    })
}
