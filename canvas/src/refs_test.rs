use super::*;
use crate::camera::Rect;
use crate::doc::{CanvasObject, ImageBody, ObjectBody, ShapeBody};

fn image(doc: &mut DocStore, hash: &str) -> ObjectId {
    let obj = CanvasObject::new(
        Rect::new(0.0, 0.0, 10.0, 10.0),
        ObjectBody::Image(ImageBody {
            src: ImageSource::Asset { asset_id: format!("as_{hash}"), url: format!("https://cdn/{hash}") },
            content_hash: Some(hash.into()),
            ..ImageBody::default()
        }),
    );
    let id = obj.id;
    doc.insert(obj);
    id
}

// =============================================================
// parse_mentions
// =============================================================

#[test]
fn parses_in_order_without_duplicates() {
    assert_eq!(parse_mentions("mix @img2 with @img1 and @img2 again"), vec![2, 1]);
}

#[test]
fn ignores_bare_prefix_and_zero() {
    assert_eq!(parse_mentions("@img @img0 @imgx @img12!"), vec![12]);
}

#[test]
fn adjacent_mentions() {
    assert_eq!(parse_mentions("@img1@img3"), vec![1, 3]);
}

#[test]
fn non_ascii_text_is_safe() {
    assert_eq!(parse_mentions("猫 @img4 の写真 @img"), vec![4]);
}

// =============================================================
// resolve
// =============================================================

#[test]
fn mentions_come_before_chips() {
    let mut doc = DocStore::new();
    let first = image(&mut doc, "h1");
    let second = image(&mut doc, "h2");
    let third = image(&mut doc, "h3");
    let list = resolve(&doc, "like @img3", &[first, third, second]);
    let order: Vec<ObjectId> = list.images.iter().map(|r| r.object_id).collect();
    assert_eq!(order, vec![third, first, second]);
    assert_eq!(list.content_hashes(), vec!["h3", "h1", "h2"]);
    assert!(list.unknown.is_empty());
}

#[test]
fn unknown_mentions_are_reported() {
    let mut doc = DocStore::new();
    image(&mut doc, "h1");
    let list = resolve(&doc, "@img1 and @img9", &[]);
    assert_eq!(list.images.len(), 1);
    assert_eq!(list.unknown, vec![9]);
}

#[test]
fn non_images_never_resolve() {
    let mut doc = DocStore::new();
    let shape = CanvasObject::new(Rect::new(0.0, 0.0, 1.0, 1.0), ObjectBody::Shape(ShapeBody::default()));
    let id = shape.id;
    doc.insert(shape);
    assert!(resolve(&doc, "", &[id]).images.is_empty());
}

#[test]
fn reference_carries_asset_fields() {
    let mut doc = DocStore::new();
    image(&mut doc, "h1");
    let list = resolve(&doc, "@img1", &[]);
    let r = &list.images[0];
    assert_eq!(r.ref_id, 1);
    assert_eq!(r.asset_id.as_deref(), Some("as_h1"));
    assert_eq!(r.url.as_deref(), Some("https://cdn/h1"));
}

// =============================================================
// request_text
// =============================================================

#[test]
fn request_text_renumbers_by_position() {
    let mut doc = DocStore::new();
    image(&mut doc, "h1");
    image(&mut doc, "h2");
    let prompt = "put @img2 behind @img1, keep @img2 sharp";
    let list = resolve(&doc, prompt, &[]);
    assert_eq!(request_text(prompt, &list), "put @img1 behind @img2, keep @img1 sharp");
}

#[test]
fn request_text_keeps_unknown_mentions() {
    let list = ReferenceList::default();
    assert_eq!(request_text("see @img5.", &list), "see @img5.");
}
