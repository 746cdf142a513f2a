use lurk_geom::clip::{self, ClipOp, DEFAULT_SCALE};
use lurk_geom::{GeometryError, Polygon, Vec2};

fn v(x: f64, y: f64) -> Vec2 {
    Vec2::new(x, y)
}

fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
    Polygon::rect(v(x0, y0), v(x1, y1))
}

/// Filled area: outer contours minus holes.
fn area(polys: &[Polygon]) -> f64 {
    polys
        .iter()
        .map(|p| {
            let holes: f64 = p
                .holes()
                .iter()
                .map(|h| Polygon::new(h.clone()).signed_area().abs())
                .sum();
            p.signed_area().abs() - holes
        })
        .sum()
}

#[test]
fn union_of_overlapping_squares_is_one_outline() {
    let out = clip::union(&[square(0.0, 0.0, 2.0, 2.0), square(1.0, 1.0, 3.0, 3.0)], DEFAULT_SCALE)
        .expect("union");
    assert_eq!(out.len(), 1);
    assert!(out[0].is_ccw());
    assert_eq!(out[0].points().len(), 8);
    assert!((area(&out) - 7.0).abs() < 1e-9);
}

#[test]
fn union_of_edge_sharing_squares_merges_and_drops_collinear_vertices() {
    let out = clip::union(&[square(0.0, 0.0, 1.0, 1.0), square(1.0, 0.0, 2.0, 1.0)], DEFAULT_SCALE)
        .expect("union");
    assert_eq!(out.len(), 1);
    assert!(out[0].approx_eq(&square(0.0, 0.0, 2.0, 1.0), 1e-9));
}

#[test]
fn disjoint_union_keeps_both_pieces() {
    let out = clip::union(&[square(0.0, 0.0, 1.0, 1.0), square(5.0, 5.0, 6.0, 6.0)], DEFAULT_SCALE)
        .expect("union");
    assert_eq!(out.len(), 2);
    assert!((area(&out) - 2.0).abs() < 1e-9);
}

#[test]
fn clockwise_input_is_filled_under_nonzero_rule() {
    let cw = square(0.0, 0.0, 2.0, 2.0).reversed();
    let out = clip::union(&[cw], DEFAULT_SCALE).expect("union");
    assert_eq!(out.len(), 1);
    assert!(out[0].is_ccw());
}

#[test]
fn difference_punches_a_hole() {
    let out = clip::difference(
        &[square(0.0, 0.0, 10.0, 10.0)],
        &[square(4.0, 4.0, 6.0, 6.0)],
        DEFAULT_SCALE,
    )
    .expect("difference");
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].holes().len(), 1);
    assert!(out[0].contains(v(1.0, 1.0)));
    assert!(!out[0].contains(v(5.0, 5.0)));
    assert!((area(&out) - 96.0).abs() < 1e-9);
}

#[test]
fn difference_that_cuts_through_splits_region() {
    let out = clip::difference(
        &[square(0.0, 0.0, 10.0, 2.0)],
        &[square(4.0, -1.0, 6.0, 3.0)],
        DEFAULT_SCALE,
    )
    .expect("difference");
    assert_eq!(out.len(), 2);
    assert!((area(&out) - 16.0).abs() < 1e-9);
}

#[test]
fn intersection_and_xor() {
    let a = [square(0.0, 0.0, 2.0, 2.0)];
    let b = [square(1.0, 1.0, 3.0, 3.0)];
    let inter = clip::intersection(&a, &b, DEFAULT_SCALE).expect("intersection");
    assert_eq!(inter.len(), 1);
    assert!(inter[0].approx_eq(&square(1.0, 1.0, 2.0, 2.0), 1e-9));

    let xor = clip::clip(&a, &b, ClipOp::Xor, DEFAULT_SCALE).expect("xor");
    assert!((area(&xor) - 6.0).abs() < 1e-9);
}

#[test]
fn coordinates_snap_to_the_precision_grid() {
    let out = clip::union(&[square(0.001, 0.0, 1.0, 1.0)], DEFAULT_SCALE).expect("union");
    assert!(out[0].points().iter().all(|p| p.x == 0.0 || p.x == 1.0));
}

#[test]
fn non_finite_input_is_rejected() {
    let bad = Polygon::new(vec![v(0.0, 0.0), v(f64::NAN, 0.0), v(0.0, 1.0)]);
    assert_eq!(clip::union(&[bad], DEFAULT_SCALE), Err(GeometryError::NonFinite));
}

#[test]
fn offset_grows_by_at_least_delta() {
    let out = clip::offset(&[square(0.0, 0.0, 4.0, 4.0)], 1.0, DEFAULT_SCALE).expect("offset");
    assert_eq!(out.len(), 1);
    let grown = &out[0];
    assert!(grown.contains(v(-0.95, 2.0)));
    assert!(grown.contains(v(2.0, 4.95)));
    // Corner joins reach roughly one unit diagonally.
    assert!(grown.contains(v(-0.6, -0.6)));
    assert!(!grown.contains(v(-1.2, 2.0)));
    assert!(!grown.contains(v(-1.0, -1.0)));
}

#[test]
fn negative_offset_shrinks() {
    let out = clip::offset(&[square(0.0, 0.0, 10.0, 10.0)], -1.0, DEFAULT_SCALE).expect("offset");
    assert_eq!(out.len(), 1);
    assert!(out[0].contains(v(5.0, 5.0)));
    assert!(out[0].contains(v(1.05, 5.0)));
    assert!(!out[0].contains(v(0.9, 5.0)));
}

#[test]
fn simplify_drops_near_duplicate_and_collinear_points() {
    let noisy = Polygon::new(vec![
        v(0.0, 0.0),
        v(0.05, 0.0),
        v(2.0, 0.0),
        v(2.0, 1.0),
        v(1.0, 1.02),
        v(0.0, 1.0),
    ]);
    let out = clip::simplify(&[noisy], 0.1);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].points().len(), 4);

    let sliver = Polygon::new(vec![v(0.0, 0.0), v(1.0, 0.0), v(0.5, 0.01)]);
    assert!(clip::simplify(&[sliver], 0.1).is_empty());
}
