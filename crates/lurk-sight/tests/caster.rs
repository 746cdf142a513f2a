use core::f64::consts::{FRAC_PI_2, PI};

use lurk_geom::{ParentId, Polygon, Segment, Vec2};
use lurk_sight::{CastQuery, CastRequest, Caster};
use proptest::prelude::*;

fn v(x: f64, y: f64) -> Vec2 {
    Vec2::new(x, y)
}

fn room() -> Polygon {
    Polygon::rect(v(0.0, 0.0), v(10.0, 10.0))
}

fn wall_caster() -> Caster {
    let mut caster = Caster::new();
    caster.rebuild_topology(&[Polygon::rect(v(5.0, 0.0), v(6.0, 10.0))]);
    caster
}

#[test]
fn topology_merges_shared_endpoints() {
    let mut caster = Caster::new();
    caster.rebuild_topology(&[
        Polygon::rect(v(0.0, 0.0), v(1.0, 1.0)),
        Polygon::rect(v(1.0, 0.0), v(2.0, 1.0)),
    ]);
    assert_eq!(caster.segment_count(), 8);
    // (1,0) and (1,1) are shared by both squares.
    assert_eq!(caster.point_count(), 6);
    let shared = caster
        .points()
        .iter()
        .find(|p| p.point == v(1.0, 0.0))
        .expect("shared corner");
    assert_eq!(shared.segments.len(), 4);
}

#[test]
fn empty_room_is_fully_visible() {
    let caster = Caster::new();
    for viewpoint in [v(5.0, 5.0), v(3.0, 4.0), v(0.5, 9.5)] {
        let result = caster.cast(&CastRequest::new(viewpoint, room()));
        let visible = result.visible.expect("visibility polygon");
        assert!(
            visible.approx_eq(&room(), 1e-6),
            "from {viewpoint:?}: {:?}",
            visible.points()
        );
        assert!(result.structures.is_empty());
    }
}

#[test]
fn wall_occludes_the_far_side() {
    let caster = wall_caster();
    let result = caster.cast(&CastRequest::new(v(1.0, 5.0), room()).with_structure());
    let visible = result.visible.as_ref().expect("visibility polygon");

    let max_x = visible
        .points()
        .iter()
        .map(|p| p.x)
        .fold(f64::NEG_INFINITY, f64::max);
    assert!(max_x <= 5.0 + 1e-9, "saw past the wall: {max_x}");
    assert!(result.sees(v(4.0, 9.0)));
    assert!(!result.sees(v(8.0, 5.0)));
    assert_eq!(result.structure_ids, vec![ParentId(0)]);
    assert_eq!(result.structures.len(), 1);
}

#[test]
fn partial_wall_casts_a_shadow() {
    let mut caster = Caster::new();
    caster.rebuild_topology(&[Polygon::rect(v(5.0, 4.0), v(6.0, 6.0))]);
    let result = caster.cast(&CastRequest::new(v(1.0, 5.0), room()));
    assert!(result.sees(v(9.0, 1.0)));
    assert!(result.sees(v(9.0, 9.0)));
    assert!(!result.sees(v(9.0, 5.0)));
    assert!(!result.sees(v(5.5, 5.0)));
}

#[test]
fn distant_viewpoint_sees_past_box_silhouette() {
    let mut caster = Caster::new();
    caster.rebuild_topology(&[Polygon::rect(v(600.0, 480.0), v(620.0, 520.0))]);
    let viewpoint = v(10.0, 500.0);
    let result = caster.cast(&CastRequest::new(
        viewpoint,
        Polygon::rect(v(0.0, 0.0), v(1000.0, 1000.0)),
    ));
    let visible = result.visible.as_ref().expect("visibility polygon");

    // Shadow edges graze the near corners and land on the far wall.
    let spread = 20.0 * 990.0 / 590.0;
    for y in [500.0 + spread, 500.0 - spread] {
        assert!(
            visible
                .points()
                .iter()
                .any(|p| p.approx_eq(v(1000.0, y), 1e-6)),
            "missing shadow vertex at y={y}: {:?}",
            visible.points()
        );
    }
    assert!(result.sees(v(990.0, 535.0)));
    assert!(result.sees(v(990.0, 465.0)));
    assert!(result.sees(v(700.0, 900.0)));
    assert!(!result.sees(v(990.0, 530.0)));
    assert!(!result.sees(v(990.0, 500.0)));
}

#[test]
fn cone_restricts_visibility() {
    let caster = Caster::new();
    let request = CastRequest::new(v(5.0, 5.0), room()).looking(0.0, FRAC_PI_2);
    let result = caster.cast(&request);
    let visible = result.visible.as_ref().expect("cone polygon");
    assert!(visible.points().contains(&v(5.0, 5.0)));
    assert!(visible.is_ccw());

    assert!(result.sees(v(9.0, 5.0)));
    assert!(result.sees(v(9.0, 8.0)));
    assert!(!result.sees(v(9.0, 9.5)));
    assert!(!result.sees(v(1.0, 5.0)));

    let behind = CastRequest::new(v(5.0, 5.0), room()).looking(PI, FRAC_PI_2);
    let result = caster.cast(&behind);
    assert!(result.sees(v(1.0, 5.0)));
    assert!(!result.sees(v(9.0, 5.0)));
}

#[test]
fn obstacles_outside_viewport_are_ignored() {
    let mut caster = Caster::new();
    caster.rebuild_topology(&[Polygon::rect(v(500.0, 500.0), v(510.0, 510.0))]);
    let result = caster.cast(&CastRequest::around(v(5.0, 5.0), 5.0).with_structure());
    assert!(result
        .visible
        .expect("visibility polygon")
        .approx_eq(&room(), 1e-6));
    assert!(result.structures.is_empty());
}

#[test]
fn scratch_reuse_gives_identical_results() {
    let caster = wall_caster();
    let request = CastRequest::new(v(1.0, 5.0), room());
    let mut query = CastQuery::default();
    let first = caster.cast_into(&request, &mut query);
    let second = caster.cast_into(&request, &mut query);
    assert_eq!(first, second);
    assert_eq!(first, caster.cast(&request));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn nothing_behind_the_wall_is_ever_visible(x in 0.5..4.5f64, y in 0.5..9.5f64) {
        let caster = wall_caster();
        let result = caster.cast(&CastRequest::new(v(x, y), room()));
        let visible = result.visible.expect("visibility polygon");
        prop_assert!(visible.points().iter().all(|p| p.x <= 5.0 + 1e-9));
        prop_assert!(visible.contains(v(x, y)));
    }
}

/// Non-overlapping boxes, at most one per cell of a 3x3 grid over the 100x100 room.
fn scattered_boxes(layout: &[(bool, f64, f64, f64, f64)]) -> Vec<Polygon> {
    let cell = 100.0 / 3.0;
    layout
        .iter()
        .enumerate()
        .filter(|(_, (present, ..))| *present)
        .map(|(i, &(_, ox, oy, w, h))| {
            let min = v((i % 3) as f64 * cell + ox, (i / 3) as f64 * cell + oy);
            Polygon::rect(min, min + v(w, h))
        })
        .collect()
}

fn exact_line_of_sight(a: Vec2, b: Vec2, walls: &[Segment]) -> bool {
    let line = Segment::new(a, b);
    walls.iter().all(|wall| line.intersection(wall).is_none())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn visible_area_matches_exact_line_of_sight(
        layout in prop::collection::vec(
            (any::<bool>(), 2.0..12.0f64, 2.0..12.0f64, 2.0..15.0f64, 2.0..15.0f64),
            9,
        ),
        x in 1.0..99.0f64,
        y in 1.0..99.0f64,
    ) {
        let boxes = scattered_boxes(&layout);
        let viewpoint = v(x, y);
        prop_assume!(boxes.iter().all(|b| {
            let bounds = b.bounds();
            x < bounds.min.x - 0.5
                || x > bounds.max.x + 0.5
                || y < bounds.min.y - 0.5
                || y > bounds.max.y + 0.5
        }));

        let mut caster = Caster::new();
        caster.rebuild_topology(&boxes);
        let result = caster.cast(&CastRequest::new(viewpoint, Polygon::rect(v(0.0, 0.0), v(100.0, 100.0))));
        prop_assert!(result.visible.is_some());

        let walls: Vec<Segment> = boxes.iter().flat_map(Polygon::segments).collect();
        let corners: Vec<Vec2> = boxes.iter().flat_map(|b| b.points().to_vec()).collect();
        for gx in 0..20 {
            for gy in 0..20 {
                let p = v(2.5 + 5.0 * gx as f64, 2.5 + 5.0 * gy as f64);
                let sight = Segment::new(viewpoint, p);
                let ambiguous = p.distance(viewpoint) < 0.05
                    || walls.iter().any(|w| w.distance_to(p) < 0.05)
                    || corners.iter().any(|c| sight.distance_to(*c) < 0.05);
                if ambiguous {
                    continue;
                }
                prop_assert_eq!(
                    result.sees(p),
                    exact_line_of_sight(viewpoint, p, &walls),
                    "viewpoint {:?}, point {:?}",
                    viewpoint,
                    p
                );
            }
        }
    }
}
