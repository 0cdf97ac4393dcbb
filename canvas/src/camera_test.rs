#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

// --- Point / Rect ---

#[test]
fn point_distance() {
    assert!(approx_eq(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0));
}

#[test]
fn rect_from_corners_normalizes() {
    let r = Rect::from_corners(Point::new(10.0, 40.0), Point::new(-10.0, 0.0));
    assert_eq!(r, Rect::new(-10.0, 0.0, 20.0, 40.0));
}

#[test]
fn rect_centered_round_trips_center() {
    let r = Rect::centered(Point::new(100.0, 50.0), 40.0, 20.0);
    assert_eq!(r, Rect::new(80.0, 40.0, 40.0, 20.0));
    assert!(point_approx_eq(r.center(), Point::new(100.0, 50.0)));
}

#[test]
fn rect_intersects_overlap() {
    let a = Rect::new(0.0, 0.0, 100.0, 100.0);
    let b = Rect::new(50.0, 50.0, 100.0, 100.0);
    assert!(a.intersects(&b));
    assert!(b.intersects(&a));
}

#[test]
fn rect_touching_edges_do_not_intersect() {
    let a = Rect::new(0.0, 0.0, 100.0, 100.0);
    let b = Rect::new(100.0, 0.0, 100.0, 100.0);
    assert!(!a.intersects(&b));
}

#[test]
fn rect_inflate_grows_every_side() {
    let r = Rect::new(10.0, 10.0, 20.0, 20.0).inflate(5.0);
    assert_eq!(r, Rect::new(5.0, 5.0, 30.0, 30.0));
}

#[test]
fn rect_contains_boundary() {
    let r = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert!(r.contains(Point::new(10.0, 10.0)));
    assert!(!r.contains(Point::new(10.1, 5.0)));
}

#[test]
fn rect_union_covers_both() {
    let u = Rect::new(0.0, 0.0, 10.0, 10.0).union(&Rect::new(20.0, -5.0, 5.0, 5.0));
    assert_eq!(u, Rect::new(0.0, -5.0, 25.0, 15.0));
}

// --- Camera defaults and zoom clamp ---

#[test]
fn camera_default_is_identity() {
    let cam = Camera::default();
    assert_eq!(cam.pan_x, 0.0);
    assert_eq!(cam.pan_y, 0.0);
    assert_eq!(cam.zoom, 1.0);
}

#[test]
fn clamp_zoom_bounds() {
    assert_eq!(clamp_zoom(0.001), 0.05);
    assert_eq!(clamp_zoom(10.0), 3.0);
    assert_eq!(clamp_zoom(1.5), 1.5);
    assert_eq!(clamp_zoom(f64::NAN), 1.0);
}

// --- screen_to_world / world_to_screen ---

#[test]
fn screen_to_world_with_pan_and_zoom() {
    let cam = Camera { pan_x: 20.0, pan_y: 10.0, zoom: 2.0 };
    let world = cam.screen_to_world(Point::new(20.0, 10.0));
    assert!(point_approx_eq(world, Point::new(0.0, 0.0)));
}

#[test]
fn world_to_screen_with_pan_and_zoom() {
    let cam = Camera { pan_x: 20.0, pan_y: 10.0, zoom: 3.0 };
    let screen = cam.world_to_screen(Point::new(5.0, 5.0));
    // 5*3 + 20 = 35, 5*3 + 10 = 25
    assert!(point_approx_eq(screen, Point::new(35.0, 25.0)));
}

#[test]
fn round_trip_across_zoom_range() {
    let worlds = [Point::new(0.0, 0.0), Point::new(333.3, -999.9), Point::new(-12_345.6, 7_890.1)];
    let pans = [(0.0, 0.0), (13.7, -42.3), (-5_000.0, 2_500.0)];
    let mut zoom = 0.05;
    while zoom <= 3.0 {
        for (pan_x, pan_y) in pans {
            let cam = Camera { pan_x, pan_y, zoom };
            for world in worlds {
                let back = cam.screen_to_world(cam.world_to_screen(world));
                assert!((back.x - world.x).abs() < 1e-6, "x drift at zoom {zoom}");
                assert!((back.y - world.y).abs() < 1e-6, "y drift at zoom {zoom}");
            }
        }
        zoom += 0.05;
    }
}

#[test]
fn screen_dist_to_world_ignores_pan() {
    let cam = Camera { pan_x: 999.0, pan_y: -999.0, zoom: 4.0 };
    assert!(approx_eq(cam.screen_dist_to_world(8.0), 2.0));
}

#[test]
fn screen_rect_to_world_divides_by_zoom() {
    let cam = Camera { pan_x: 100.0, pan_y: 0.0, zoom: 2.0 };
    let r = cam.screen_rect_to_world(Rect::new(100.0, 0.0, 200.0, 100.0));
    assert_eq!(r, Rect::new(0.0, 0.0, 100.0, 50.0));
}

// --- zoom_at ---

#[test]
fn zoom_at_keeps_anchor_fixed() {
    let mut cam = Camera { pan_x: 37.0, pan_y: -12.0, zoom: 0.8 };
    let anchor_screen = Point::new(400.0, 300.0);
    let before = cam.screen_to_world(anchor_screen);
    cam.zoom_at(anchor_screen, 2.2);
    let after = cam.screen_to_world(anchor_screen);
    assert!(point_approx_eq(before, after));
    assert!(approx_eq(cam.zoom, 2.2));
}

#[test]
fn zoom_at_clamps() {
    let mut cam = Camera::default();
    let anchor_screen = Point::new(50.0, 50.0);
    let before = cam.screen_to_world(anchor_screen);
    cam.zoom_at(anchor_screen, 100.0);
    assert_eq!(cam.zoom, 3.0);
    assert!(point_approx_eq(before, cam.screen_to_world(anchor_screen)));
}

// --- centered_on / fit_rect / lerp ---

#[test]
fn centered_on_puts_point_mid_viewport() {
    let cam = Camera::centered_on(Point::new(500.0, -200.0), 0.5, 800.0, 600.0);
    let mid = cam.world_to_screen(Point::new(500.0, -200.0));
    assert!(point_approx_eq(mid, Point::new(400.0, 300.0)));
}

#[test]
fn fit_rect_fits_with_padding() {
    let rect = Rect::new(0.0, 0.0, 2000.0, 1000.0);
    let cam = Camera::fit_rect(rect, 1000.0, 1000.0, 100.0, 1.0);
    // Width is the binding axis: (1000 - 200) / 2000.
    assert!(approx_eq(cam.zoom, 0.4));
    let mid = cam.world_to_screen(rect.center());
    assert!(point_approx_eq(mid, Point::new(500.0, 500.0)));
}

#[test]
fn fit_rect_caps_zoom() {
    let cam = Camera::fit_rect(Rect::new(0.0, 0.0, 10.0, 10.0), 1000.0, 1000.0, 100.0, 1.0);
    assert!(approx_eq(cam.zoom, 1.0));
}

#[test]
fn lerp_endpoints() {
    let a = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 };
    let b = Camera { pan_x: 100.0, pan_y: -50.0, zoom: 2.0 };
    assert_eq!(a.lerp(&b, 0.0), a);
    assert_eq!(a.lerp(&b, 1.0), b);
    let mid = a.lerp(&b, 0.5);
    assert!(approx_eq(mid.pan_x, 50.0));
    assert!(approx_eq(mid.zoom, 1.5));
}

// --- wire format ---

#[test]
fn camera_serializes_to_viewport_wire_format() {
    let cam = Camera { pan_x: 12.5, pan_y: -4.0, zoom: 0.75 };
    let json = serde_json::to_value(cam).unwrap_or_default();
    assert_eq!(json, serde_json::json!({ "x": 12.5, "y": -4.0, "z": 0.75 }));
}

#[test]
fn camera_deserializes_from_viewport_wire_format() {
    let cam: Camera = serde_json::from_str(r#"{"z":2,"x":10,"y":20}"#).unwrap();
    assert_eq!(cam, Camera { pan_x: 10.0, pan_y: 20.0, zoom: 2.0 });
}
