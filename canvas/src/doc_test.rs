#![allow(clippy::float_cmp)]

use super::*;

fn rect(x: f64, y: f64, w: f64, h: f64) -> Rect {
    Rect::new(x, y, w, h)
}

fn image_at(x: f64, y: f64) -> CanvasObject {
    CanvasObject::new(rect(x, y, 100.0, 80.0), ObjectBody::Image(ImageBody::default()))
}

fn generator() -> CanvasObject {
    CanvasObject::new(
        rect(0.0, 0.0, 512.0, 512.0),
        ObjectBody::Generator(GeneratorBody { requested_size: "1024x1024".into(), ..GeneratorBody::default() }),
    )
}

fn shape() -> CanvasObject {
    CanvasObject::new(rect(0.0, 0.0, 50.0, 50.0), ObjectBody::Shape(ShapeBody::default()))
}

// =============================================================
// ImageSource classification
// =============================================================

#[test]
fn from_url_http_is_remote() {
    assert_eq!(ImageSource::from_url("https://x/cat.png"), ImageSource::Remote { url: "https://x/cat.png".into() });
    assert!(ImageSource::from_url("HTTP://x/a.png").is_durable());
}

#[test]
fn from_url_blob_and_data_are_local() {
    assert!(matches!(ImageSource::from_url("blob:abc"), ImageSource::Local { .. }));
    assert!(matches!(ImageSource::from_url("data:image/png;base64,AAAA"), ImageSource::Local { .. }));
    assert!(!ImageSource::from_url("blob:abc").is_durable());
}

#[test]
fn source_accessors() {
    let asset = ImageSource::Asset { asset_id: "a1".into(), url: "https://x/a1".into() };
    assert_eq!(asset.asset_id(), Some("a1"));
    assert_eq!(asset.url(), Some("https://x/a1"));
    assert_eq!(ImageSource::Empty.url(), None);
    assert_eq!(ImageSource::Local { key: "blob:1".into() }.url(), None);
}

#[test]
fn gen_status_placeholder() {
    assert!(GenStatus::Running.is_placeholder());
    assert!(GenStatus::Error.is_placeholder());
    assert!(!GenStatus::Done.is_placeholder());
    assert!(!GenStatus::Idle.is_placeholder());
}

// =============================================================
// CanvasObject helpers
// =============================================================

#[test]
fn kind_matches_body() {
    assert_eq!(image_at(0.0, 0.0).kind(), ObjectKind::Image);
    assert_eq!(generator().kind(), ObjectKind::Generator);
    assert_eq!(shape().kind(), ObjectKind::Shape);
}

#[test]
fn locked_aspect_prefers_natural_size() {
    let mut obj = image_at(0.0, 0.0);
    assert_eq!(obj.locked_aspect(), Some(100.0 / 80.0));
    if let Some(img) = obj.image_mut() {
        img.natural_width = Some(400);
        img.natural_height = Some(200);
    }
    assert_eq!(obj.locked_aspect(), Some(2.0));
}

#[test]
fn locked_aspect_free_for_shapes() {
    assert_eq!(shape().locked_aspect(), None);
    assert_eq!(generator().locked_aspect(), Some(1.0));
}

// =============================================================
// DocStore basics
// =============================================================

#[test]
fn insert_assigns_increasing_ref_ids() {
    let mut doc = DocStore::new();
    let a = image_at(0.0, 0.0);
    let b = image_at(200.0, 0.0);
    let (a_id, b_id) = (a.id, b.id);
    assert!(doc.insert(a));
    assert!(doc.insert(b));
    let ra = doc.get(&a_id).and_then(|o| o.image()).and_then(|i| i.ref_id);
    let rb = doc.get(&b_id).and_then(|o| o.image()).and_then(|i| i.ref_id);
    assert_eq!(ra, Some(1));
    assert_eq!(rb, Some(2));
    assert_eq!(doc.find_by_ref(2).map(|o| o.id), Some(b_id));
}

#[test]
fn insert_does_not_give_shapes_ref_ids() {
    let mut doc = DocStore::new();
    doc.insert(shape());
    let img = image_at(0.0, 0.0);
    let id = img.id;
    doc.insert(img);
    assert_eq!(doc.get(&id).and_then(|o| o.image()).and_then(|i| i.ref_id), Some(1));
}

#[test]
fn insert_duplicate_id_rejected() {
    let mut doc = DocStore::new();
    let obj = shape();
    let dup = obj.clone();
    assert!(doc.insert(obj));
    let rev = doc.revision();
    assert!(!doc.insert(dup));
    assert_eq!(doc.len(), 1);
    assert_eq!(doc.revision(), rev);
}

#[test]
fn ref_ids_never_reused_after_delete() {
    let mut doc = DocStore::new();
    let a = image_at(0.0, 0.0);
    let a_id = a.id;
    doc.insert(a);
    doc.remove(&a_id);
    let b = image_at(0.0, 0.0);
    let b_id = b.id;
    doc.insert(b);
    assert_eq!(doc.get(&b_id).and_then(|o| o.image()).and_then(|i| i.ref_id), Some(2));
}

#[test]
fn load_snapshot_resumes_numbering() {
    let mut doc = DocStore::new();
    let mut img = image_at(0.0, 0.0);
    if let Some(body) = img.image_mut() {
        body.ref_id = Some(7);
    }
    doc.load_snapshot(vec![img]);
    let next = image_at(0.0, 0.0);
    let id = next.id;
    doc.insert(next);
    assert_eq!(doc.get(&id).and_then(|o| o.image()).and_then(|i| i.ref_id), Some(8));
}

#[test]
fn load_snapshot_drops_repeated_ids() {
    let mut doc = DocStore::new();
    let first = image_at(0.0, 0.0);
    let mut copy = image_at(50.0, 50.0);
    copy.id = first.id;
    doc.load_snapshot(vec![first.clone(), copy]);
    assert_eq!(doc.len(), 1);
    assert_eq!(doc.get(&first.id).map(CanvasObject::rect), Some(first.rect()));
}

#[test]
fn snapshot_is_unaffected_by_later_mutation() {
    let mut doc = DocStore::new();
    let obj = shape();
    let id = obj.id;
    doc.insert(obj);
    let before = doc.snapshot();
    doc.apply_patch(&id, &ObjectPatch { x: Some(500.0), ..ObjectPatch::default() });
    assert_eq!(before[0].x, 0.0);
    assert_eq!(doc.get(&id).map(|o| o.x), Some(500.0));
}

#[test]
fn revision_bumps_on_every_mutation() {
    let mut doc = DocStore::new();
    assert_eq!(doc.revision(), 0);
    let obj = shape();
    let id = obj.id;
    doc.insert(obj);
    doc.apply_patch(&id, &ObjectPatch { hidden: Some(true), ..ObjectPatch::default() });
    doc.remove(&id);
    assert_eq!(doc.revision(), 3);
}

#[test]
fn patch_missing_object_returns_false() {
    let mut doc = DocStore::new();
    assert!(!doc.apply_patch(&Uuid::new_v4(), &ObjectPatch::default()));
    assert_eq!(doc.revision(), 0);
}

#[test]
fn patch_rect_sets_geometry_only() {
    let mut doc = DocStore::new();
    let obj = shape();
    let id = obj.id;
    doc.insert(obj);
    doc.apply_patch(&id, &ObjectPatch::rect(rect(1.0, 2.0, 3.0, 4.0)));
    let got = doc.get(&id).map(CanvasObject::rect);
    assert_eq!(got, Some(rect(1.0, 2.0, 3.0, 4.0)));
    assert_eq!(doc.get(&id).map(|o| o.locked), Some(false));
}

#[test]
fn bring_to_front_reorders() {
    let mut doc = DocStore::new();
    let a = shape();
    let b = shape();
    let a_id = a.id;
    doc.insert(a);
    doc.insert(b);
    assert_eq!(doc.index_of(&a_id), Some(0));
    assert!(doc.bring_to_front(&a_id));
    assert_eq!(doc.index_of(&a_id), Some(1));
}

#[test]
fn occupied_rects_skip_hidden() {
    let mut doc = DocStore::new();
    let mut hidden = shape();
    hidden.hidden = true;
    doc.insert(hidden);
    doc.insert(image_at(10.0, 10.0));
    assert_eq!(doc.occupied_rects(), vec![rect(10.0, 10.0, 100.0, 80.0)]);
}

// =============================================================
// Reducer
// =============================================================

#[test]
fn generation_started_turns_generator_into_running_image() {
    let mut doc = DocStore::new();
    let g = generator();
    let id = g.id;
    doc.insert(g);
    assert!(doc.apply(DocEvent::GenerationStarted { id, prompt: "cat".into(), ref_hashes: vec!["h1".into()] }));
    let obj = doc.get(&id);
    let img = obj.and_then(CanvasObject::image);
    assert_eq!(img.map(|i| i.status), Some(GenStatus::Running));
    assert_eq!(img.and_then(|i| i.prompt.clone()), Some("cat".into()));
    assert_eq!(img.map(|i| i.ref_hashes.clone()), Some(vec!["h1".to_owned()]));
    assert_eq!(img.and_then(|i| i.ref_id), Some(1));
    assert_eq!(obj.map(CanvasObject::rect), Some(rect(0.0, 0.0, 512.0, 512.0)));
}

#[test]
fn generation_started_on_image_keeps_ref_id() {
    let mut doc = DocStore::new();
    doc.insert(image_at(0.0, 0.0));
    let img = image_at(200.0, 0.0);
    let id = img.id;
    doc.insert(img);
    doc.apply(DocEvent::GenerationStarted { id, prompt: "again".into(), ref_hashes: Vec::new() });
    assert_eq!(doc.get(&id).and_then(|o| o.image()).and_then(|i| i.ref_id), Some(2));
}

#[test]
fn image_done_with_asset_is_synced() {
    let mut doc = DocStore::new();
    let g = generator();
    let id = g.id;
    doc.insert(g);
    doc.apply(DocEvent::GenerationStarted { id, prompt: "cat".into(), ref_hashes: Vec::new() });
    doc.apply(DocEvent::ImageDone {
        id,
        image: FinishedImage {
            url: "https://x/cat.png".into(),
            asset_id: Some("as_1".into()),
            content_hash: Some("abc".into()),
            width: Some(1024),
            height: Some(1024),
        },
    });
    let img = doc.get(&id).and_then(CanvasObject::image).cloned().unwrap_or_default();
    assert_eq!(img.status, GenStatus::Done);
    assert_eq!(img.src.url(), Some("https://x/cat.png"));
    assert_eq!(img.src.asset_id(), Some("as_1"));
    assert_eq!(img.sync, SyncStatus::Synced);
    assert_eq!(img.natural_width, Some(1024));
    assert_eq!(img.prompt.as_deref(), Some("cat"));
}

#[test]
fn image_done_with_plain_url_is_remote() {
    let mut doc = DocStore::new();
    let obj = image_at(0.0, 0.0);
    let id = obj.id;
    doc.insert(obj);
    doc.apply(DocEvent::ImageDone { id, image: FinishedImage { url: "https://x/cat.png".into(), ..FinishedImage::default() } });
    let img = doc.get(&id).and_then(CanvasObject::image).cloned().unwrap_or_default();
    assert_eq!(img.src, ImageSource::Remote { url: "https://x/cat.png".into() });
    assert_eq!(img.status, GenStatus::Done);
}

#[test]
fn image_failed_sets_error() {
    let mut doc = DocStore::new();
    let obj = image_at(0.0, 0.0);
    let id = obj.id;
    doc.insert(obj);
    doc.apply(DocEvent::ImageFailed { id, message: "cancelled".into() });
    let img = doc.get(&id).and_then(CanvasObject::image).cloned().unwrap_or_default();
    assert_eq!(img.status, GenStatus::Error);
    assert_eq!(img.error.as_deref(), Some("cancelled"));
}

#[test]
fn image_events_ignore_non_images() {
    let mut doc = DocStore::new();
    let s = shape();
    let id = s.id;
    doc.insert(s);
    let rev = doc.revision();
    assert!(!doc.apply(DocEvent::ImageFailed { id, message: "x".into() }));
    assert_eq!(doc.revision(), rev);
}

#[test]
fn sync_events_update_status() {
    let mut doc = DocStore::new();
    let obj = image_at(0.0, 0.0);
    let id = obj.id;
    doc.insert(obj);
    doc.apply(DocEvent::SyncFailed { id, reason: "413".into() });
    let img = doc.get(&id).and_then(CanvasObject::image).cloned().unwrap_or_default();
    assert_eq!(img.sync, SyncStatus::Failed);
    assert_eq!(img.sync_error.as_deref(), Some("413"));

    doc.apply(DocEvent::SyncSucceeded { id, asset_id: "a".into(), url: "https://x/a".into(), content_hash: "h".into() });
    let img = doc.get(&id).and_then(CanvasObject::image).cloned().unwrap_or_default();
    assert_eq!(img.sync, SyncStatus::Synced);
    assert_eq!(img.sync_error, None);
    assert_eq!(img.content_hash.as_deref(), Some("h"));
}

#[test]
fn delete_event_removes() {
    let mut doc = DocStore::new();
    let s = shape();
    let id = s.id;
    doc.insert(s);
    assert!(doc.apply(DocEvent::Delete { id }));
    assert!(doc.is_empty());
    assert!(!doc.apply(DocEvent::Delete { id }));
}
