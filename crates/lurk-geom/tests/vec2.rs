use core::f64::consts::PI;

use lurk_geom::{signed_angle_diff, Vec2};
use proptest::prelude::*;

#[test]
fn basic_vector_algebra() {
    let a = Vec2::new(3.0, 4.0);
    assert_eq!(a.length(), 5.0);
    assert_eq!(a.unit(), Vec2::new(0.6, 0.8));
    assert_eq!(Vec2::ZERO.unit(), Vec2::ZERO);
    assert_eq!(a.perpendicular(), Vec2::new(-4.0, 3.0));
    assert_eq!(a.dot(Vec2::new(1.0, 0.0)), 3.0);
    assert_eq!(Vec2::new(1.0, 0.0).cross(Vec2::new(0.0, 1.0)), 1.0);
    assert_eq!(Vec2::new(1.0, -1.0).reflect(Vec2::new(0.0, 1.0)), Vec2::new(1.0, 1.0));
    assert_eq!(a.project_onto(Vec2::new(2.0, 0.0)), Vec2::new(3.0, 0.0));
}

#[test]
fn rotation_quarter_turn() {
    let r = Vec2::new(1.0, 0.0).rotate(PI / 2.0);
    assert!(r.approx_eq(Vec2::new(0.0, 1.0), 1e-12));
    assert!((Vec2::from_angle(PI, 2.0) - Vec2::new(-2.0, 0.0)).length() < 1e-12);
}

#[test]
fn angle_difference_wraps() {
    assert!((signed_angle_diff(0.1, -0.1) - 0.2).abs() < 1e-12);
    assert!((signed_angle_diff(PI - 0.1, -PI + 0.1) + 0.2).abs() < 1e-12);
    assert!((signed_angle_diff(-PI, 0.0) - PI).abs() < 1e-12);
}

proptest! {
    #[test]
    fn rotate_preserves_length(x in -1.0e3..1.0e3f64, y in -1.0e3..1.0e3f64, angle in -10.0..10.0f64) {
        let v = Vec2::new(x, y);
        prop_assert!((v.rotate(angle).length() - v.length()).abs() < 1e-9);
    }

    #[test]
    fn signed_angle_diff_stays_in_half_open_range(a in -50.0..50.0f64, b in -50.0..50.0f64) {
        let d = signed_angle_diff(a, b);
        prop_assert!(d > -PI - 1e-12 && d <= PI + 1e-12);
    }
}
