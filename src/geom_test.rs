#![allow(clippy::float_cmp)]

use super::*;

// =============================================================
// Point
// =============================================================

#[test]
fn distance_is_euclidean() {
    assert_eq!(Point::new(0.0, 0.0).distance_to(Point::new(3.0, 4.0)), 5.0);
    assert_eq!(Point::new(-1.0, -1.0).distance_to(Point::new(-1.0, -1.0)), 0.0);
}

#[test]
fn distance_is_symmetric() {
    let a = Point::new(10.0, 2.0);
    let b = Point::new(-4.0, 7.5);
    assert_eq!(a.distance_to(b), b.distance_to(a));
}

// =============================================================
// Rect
// =============================================================

#[test]
fn contains_is_half_open() {
    let r = Rect::new(0.0, 0.0, 100.0, 20.0);
    assert!(r.contains(Point::new(0.0, 0.0)));
    assert!(r.contains(Point::new(99.9, 19.9)));
    assert!(!r.contains(Point::new(100.0, 10.0)));
    assert!(!r.contains(Point::new(50.0, 20.0)));
    assert!(!r.contains(Point::new(-0.1, 10.0)));
}

#[test]
fn stacked_rows_never_overlap_on_shared_edge() {
    let top = Rect::new(0.0, 0.0, 100.0, 20.0);
    let bottom = Rect::new(0.0, 20.0, 100.0, 20.0);
    let edge = Point::new(10.0, 20.0);
    assert!(!top.contains(edge));
    assert!(bottom.contains(edge));
}

#[test]
fn upper_half_splits_at_midpoint() {
    let r = Rect::new(0.0, 100.0, 50.0, 40.0);
    assert_eq!(r.mid_y(), 120.0);
    assert!(r.in_upper_half(Point::new(5.0, 101.0)));
    assert!(r.in_upper_half(Point::new(5.0, 119.9)));
    assert!(!r.in_upper_half(Point::new(5.0, 120.0)));
    assert!(!r.in_upper_half(Point::new(5.0, 139.0)));
}
