//! Prompt references: `@imgN` mentions and chip resolution.
//!
//! A job's reference list is the images mentioned in the prompt, in order of
//! first mention, followed by confirmed chips that weren't mentioned. The
//! request text sent to the generation service renumbers mentions to their
//! position in that list, so `@img7` becomes `@img1` when image 7 is the first
//! reference.

#[cfg(test)]
#[path = "refs_test.rs"]
mod refs_test;

use crate::doc::{DocStore, ImageSource, ObjectId};

const MENTION_PREFIX: &str = "@img";

/// One resolved reference image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceImage {
    pub object_id: ObjectId,
    pub ref_id: u32,
    pub asset_id: Option<String>,
    pub url: Option<String>,
    pub content_hash: Option<String>,
}

/// Ordered references for one prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceList {
    pub images: Vec<ReferenceImage>,
    /// Mentioned reference numbers that match no image on the canvas.
    pub unknown: Vec<u32>,
}

impl ReferenceList {
    /// Content hashes in reference order (images without one are skipped).
    #[must_use]
    pub fn content_hashes(&self) -> Vec<String> {
        self.images.iter().filter_map(|r| r.content_hash.clone()).collect()
    }

    fn position_of(&self, ref_id: u32) -> Option<usize> {
        self.images.iter().position(|r| r.ref_id == ref_id)
    }
}

/// A mention found in prompt text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Mention {
    start: usize,
    end: usize,
    ref_id: u32,
}

fn scan_mentions(text: &str) -> Vec<Mention> {
    let mut out = Vec::new();
    let mut cursor = 0;
    while let Some(found) = text[cursor..].find(MENTION_PREFIX) {
        let start = cursor + found;
        let digits_start = start + MENTION_PREFIX.len();
        let digits_len = text[digits_start..].bytes().take_while(u8::is_ascii_digit).count();
        let end = digits_start + digits_len;
        if digits_len > 0 {
            if let Ok(ref_id) = text[digits_start..end].parse::<u32>() {
                if ref_id > 0 {
                    out.push(Mention { start, end, ref_id });
                }
            }
        }
        cursor = end.max(digits_start);
    }
    out
}

/// Reference numbers mentioned in `text`, in order of first appearance.
#[must_use]
pub fn parse_mentions(text: &str) -> Vec<u32> {
    let mut ids = Vec::new();
    for m in scan_mentions(text) {
        if !ids.contains(&m.ref_id) {
            ids.push(m.ref_id);
        }
    }
    ids
}

/// Build the reference list for `prompt` plus confirmed chips.
#[must_use]
pub fn resolve(doc: &DocStore, prompt: &str, confirmed: &[ObjectId]) -> ReferenceList {
    let mut list = ReferenceList::default();

    for ref_id in parse_mentions(prompt) {
        match doc.find_by_ref(ref_id).and_then(|o| reference_of(doc, &o.id)) {
            Some(image) => list.images.push(image),
            None => list.unknown.push(ref_id),
        }
    }
    for id in confirmed {
        if list.images.iter().any(|r| &r.object_id == id) {
            continue;
        }
        if let Some(image) = reference_of(doc, id) {
            list.images.push(image);
        }
    }
    list
}

fn reference_of(doc: &DocStore, id: &ObjectId) -> Option<ReferenceImage> {
    let obj = doc.get(id)?;
    let img = obj.image()?;
    let ref_id = img.ref_id?;
    let (asset_id, url) = match &img.src {
        ImageSource::Asset { asset_id, url } => (Some(asset_id.clone()), Some(url.clone())),
        ImageSource::Remote { url } => (None, Some(url.clone())),
        ImageSource::Empty | ImageSource::Local { .. } => (None, None),
    };
    Some(ReferenceImage { object_id: obj.id, ref_id, asset_id, url, content_hash: img.content_hash.clone() })
}

/// Rewrite `@imgN` mentions to their 1-based position in `list`.
/// Mentions of unknown images are left as written.
#[must_use]
pub fn request_text(prompt: &str, list: &ReferenceList) -> String {
    let mut out = String::with_capacity(prompt.len());
    let mut cursor = 0;
    for m in scan_mentions(prompt) {
        out.push_str(&prompt[cursor..m.start]);
        match list.position_of(m.ref_id) {
            Some(pos) => {
                out.push_str(MENTION_PREFIX);
                out.push_str(&(pos + 1).to_string());
            }
            None => out.push_str(&prompt[m.start..m.end]),
        }
        cursor = m.end;
    }
    out.push_str(&prompt[cursor..]);
    out
}
