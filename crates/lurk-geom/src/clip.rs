//! Fixed-precision polygon boolean operations.
//!
//! Coordinates are scaled by `scale` and rounded onto an `i64` grid before any topology is
//! computed, so intersection points and shared vertices are exact. The result boundary is taken
//! from the arrangement of all input edges (split at every crossing): a piece of edge survives when
//! the fill state differs on its two sides under the nonzero rule. Surviving pieces are stitched
//! back into contours and scaled down.

use std::collections::{BTreeMap, BTreeSet};

use crate::polygon::{ring_contains, ring_signed_area};
use crate::{GeometryError, Polygon, Result, Vec2};

/// Scale applied by the navmesh pipeline (two decimal places of precision).
pub const DEFAULT_SCALE: f64 = 100.0;

/// Largest scaled coordinate accepted; keeps every cross product inside `i128`.
const MAX_COORD: f64 = (1u64 << 40) as f64;

/// Distance (in scaled units) of the side probes used to classify an edge piece.
const PROBE: f64 = 1e-2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClipOp {
    Union,
    Difference,
    Intersection,
    Xor,
}

impl ClipOp {
    fn keeps(self, in_subject: bool, in_clip: bool) -> bool {
        match self {
            ClipOp::Union => in_subject || in_clip,
            ClipOp::Difference => in_subject && !in_clip,
            ClipOp::Intersection => in_subject && in_clip,
            ClipOp::Xor => in_subject != in_clip,
        }
    }
}

pub fn union(subjects: &[Polygon], scale: f64) -> Result<Vec<Polygon>> {
    clip(subjects, &[], ClipOp::Union, scale)
}

pub fn difference(subjects: &[Polygon], clips: &[Polygon], scale: f64) -> Result<Vec<Polygon>> {
    clip(subjects, clips, ClipOp::Difference, scale)
}

pub fn intersection(subjects: &[Polygon], clips: &[Polygon], scale: f64) -> Result<Vec<Polygon>> {
    clip(subjects, clips, ClipOp::Intersection, scale)
}

/// Boolean operation between two polygon sets using the nonzero fill rule.
///
/// Output outer contours are counter-clockwise; holes are attached to the smallest outer contour
/// that encloses them.
pub fn clip(
    subjects: &[Polygon],
    clips: &[Polygon],
    op: ClipOp,
    scale: f64,
) -> Result<Vec<Polygon>> {
    let mut rings = Vec::new();
    for poly in subjects {
        push_polygon_rings(poly, Role::Subject, scale, &mut rings)?;
    }
    for poly in clips {
        push_polygon_rings(poly, Role::Clip, scale, &mut rings)?;
    }
    if rings.is_empty() {
        return Ok(Vec::new());
    }

    let pieces = split_edges(&rings);
    let boundary = classify(&rings, &pieces, op);
    let contours = stitch(&boundary)?;
    Ok(assemble(contours, scale))
}

/// Inflate (`delta > 0`) or deflate (`delta < 0`) polygons by `delta`.
///
/// Inflation is the union of the input with a rectangle swept outward from every edge and an
/// octagon around every vertex, which approximates round joins while never under-shooting the
/// requested clearance. Deflation subtracts the inward rectangles and octagons instead.
pub fn offset(polys: &[Polygon], delta: f64, scale: f64) -> Result<Vec<Polygon>> {
    if delta == 0.0 {
        return union(polys, scale);
    }
    if !delta.is_finite() {
        return Err(GeometryError::NonFinite);
    }

    let d = delta.abs();
    let mut sweeps = Vec::new();
    for poly in polys {
        for (idx, ring) in poly.rings().enumerate() {
            if ring.len() < 3 {
                continue;
            }
            // Orient so the filled side is on the left of every edge.
            let want_ccw = idx == 0;
            let mut ring = ring.to_vec();
            if (ring_signed_area(&ring) > 0.0) != want_ccw {
                ring.reverse();
            }
            let n = ring.len();
            for i in 0..n {
                let a = ring[i];
                let b = ring[(i + 1) % n];
                let dir = b - a;
                if dir.is_zero() {
                    continue;
                }
                let left = dir.perpendicular().unit() * d;
                let quad = if delta > 0.0 {
                    let out = -left;
                    vec![a, a + out, b + out, b]
                } else {
                    vec![a, b, b + left, a + left]
                };
                sweeps.push(Polygon::new(quad));
                sweeps.push(octagon(a, d));
            }
        }
    }

    if delta > 0.0 {
        let mut subjects = polys.to_vec();
        subjects.extend(sweeps);
        union(&subjects, scale)
    } else {
        difference(polys, &sweeps, scale)
    }
}

/// Remove vertices closer than `distance` to their predecessor or to the chord joining their
/// neighbours. Rings reduced below three points are dropped (an outer ring takes its holes with it).
pub fn simplify(polys: &[Polygon], distance: f64) -> Vec<Polygon> {
    let mut out = Vec::with_capacity(polys.len());
    for poly in polys {
        let Some(outer) = clean_ring(poly.points(), distance) else {
            continue;
        };
        let holes = poly
            .holes()
            .iter()
            .filter_map(|h| clean_ring(h, distance))
            .collect();
        out.push(Polygon::with_holes(outer, holes));
    }
    out
}

fn clean_ring(ring: &[Vec2], distance: f64) -> Option<Vec<Vec2>> {
    let mut pts = ring.to_vec();
    let d2 = distance * distance;
    loop {
        if pts.len() < 3 {
            return None;
        }
        let n = pts.len();
        let mut removed = None;
        for i in 0..n {
            let prev = pts[(i + n - 1) % n];
            let cur = pts[i];
            let next = pts[(i + 1) % n];
            if cur.distance_squared(prev) < d2 || point_chord_distance(cur, prev, next) < distance {
                removed = Some(i);
                break;
            }
        }
        match removed {
            Some(i) => {
                pts.remove(i);
            }
            None => return Some(pts),
        }
    }
}

fn point_chord_distance(p: Vec2, a: Vec2, b: Vec2) -> f64 {
    crate::Segment::new(a, b).distance_to(p)
}

fn octagon(center: Vec2, radius: f64) -> Polygon {
    // Circumscribed so that every edge stays at least `radius` from the center.
    let r = radius / (core::f64::consts::PI / 8.0).cos();
    let points = (0..8)
        .map(|i| center + Vec2::from_angle(core::f64::consts::PI / 8.0 + i as f64 * core::f64::consts::FRAC_PI_4, r))
        .collect();
    Polygon::new(points)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct IntPoint {
    x: i64,
    y: i64,
}

impl IntPoint {
    fn to_f64(self) -> Vec2 {
        Vec2::new(self.x as f64, self.y as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Subject,
    Clip,
}

struct Ring {
    role: Role,
    points: Vec<IntPoint>,
    min: Vec2,
    max: Vec2,
}

struct Edge {
    a: IntPoint,
    b: IntPoint,
}

/// A piece of an input edge between two consecutive split points.
struct Piece {
    a: IntPoint,
    b: IntPoint,
    /// Unrounded midpoint and unit left normal, both taken from the source edge.
    mid: Vec2,
    normal: Vec2,
}

fn push_polygon_rings(poly: &Polygon, role: Role, scale: f64, out: &mut Vec<Ring>) -> Result<()> {
    for (idx, ring) in poly.rings().enumerate() {
        if let Some(points) = to_int_ring(ring, scale, idx == 0)? {
            let fpts: Vec<Vec2> = points.iter().map(|p| p.to_f64()).collect();
            let (min, max) = fpts.iter().fold(
                (fpts[0], fpts[0]),
                |(lo, hi), p| {
                    (
                        Vec2::new(lo.x.min(p.x), lo.y.min(p.y)),
                        Vec2::new(hi.x.max(p.x), hi.y.max(p.y)),
                    )
                },
            );
            out.push(Ring {
                role,
                points,
                min,
                max,
            });
        }
    }
    Ok(())
}

fn to_int_ring(ring: &[Vec2], scale: f64, want_ccw: bool) -> Result<Option<Vec<IntPoint>>> {
    let mut pts: Vec<IntPoint> = Vec::with_capacity(ring.len());
    for p in ring {
        let x = p.x * scale;
        let y = p.y * scale;
        if !x.is_finite() || !y.is_finite() || x.abs() > MAX_COORD || y.abs() > MAX_COORD {
            return Err(GeometryError::NonFinite);
        }
        let q = IntPoint {
            x: x.round() as i64,
            y: y.round() as i64,
        };
        if pts.last() != Some(&q) {
            pts.push(q);
        }
    }
    while pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }
    if pts.len() < 3 {
        return Ok(None);
    }
    let area = int_area2(&pts);
    if area == 0 {
        return Ok(None);
    }
    if (area > 0) != want_ccw {
        pts.reverse();
    }
    Ok(Some(pts))
}

fn int_area2(ring: &[IntPoint]) -> i128 {
    let n = ring.len();
    let mut sum: i128 = 0;
    for i in 0..n {
        let p = ring[i];
        let q = ring[(i + 1) % n];
        sum += p.x as i128 * q.y as i128 - p.y as i128 * q.x as i128;
    }
    sum
}

fn cross_i(ax: i128, ay: i128, bx: i128, by: i128) -> i128 {
    ax * by - ay * bx
}

/// Round `num / den` to the nearest integer (`den > 0`).
fn round_div(num: i128, den: i128) -> i64 {
    (2 * num + den).div_euclid(2 * den) as i64
}

fn split_edges(rings: &[Ring]) -> Vec<Piece> {
    let mut edges = Vec::new();
    for ring in rings {
        let n = ring.points.len();
        for i in 0..n {
            let a = ring.points[i];
            let b = ring.points[(i + 1) % n];
            if a != b {
                edges.push(Edge { a, b });
            }
        }
    }

    let mut splits: Vec<Vec<(f64, IntPoint)>> = edges
        .iter()
        .map(|e| vec![(0.0, e.a), (1.0, e.b)])
        .collect();

    // Sweep over x-extents so only overlapping bounding boxes are tested.
    let mut order: Vec<usize> = (0..edges.len()).collect();
    order.sort_by_key(|&i| edges[i].a.x.min(edges[i].b.x));
    for (k, &i) in order.iter().enumerate() {
        let ei = &edges[i];
        let max_x = ei.a.x.max(ei.b.x);
        let (min_y, max_y) = (ei.a.y.min(ei.b.y), ei.a.y.max(ei.b.y));
        for &j in &order[k + 1..] {
            let ej = &edges[j];
            if ej.a.x.min(ej.b.x) > max_x {
                break;
            }
            if ej.a.y.max(ej.b.y) < min_y || ej.a.y.min(ej.b.y) > max_y {
                continue;
            }
            intersect_edges(i, j, &edges, &mut splits);
        }
    }

    let mut pieces = Vec::new();
    for (edge, mut cuts) in edges.iter().zip(splits) {
        cuts.sort_by(|l, r| l.0.total_cmp(&r.0));
        cuts.dedup_by(|l, r| l.1 == r.1);
        let fa = edge.a.to_f64();
        let dir = edge.b.to_f64() - fa;
        let normal = dir.perpendicular().unit();
        for w in cuts.windows(2) {
            let (t0, p0) = w[0];
            let (t1, p1) = w[1];
            if p0 == p1 {
                continue;
            }
            pieces.push(Piece {
                a: p0,
                b: p1,
                mid: fa + dir * ((t0 + t1) * 0.5),
                normal,
            });
        }
    }
    pieces
}

fn intersect_edges(i: usize, j: usize, edges: &[Edge], splits: &mut [Vec<(f64, IntPoint)>]) {
    let (e, f) = (&edges[i], &edges[j]);
    let (px, py) = (e.a.x as i128, e.a.y as i128);
    let (rx, ry) = ((e.b.x - e.a.x) as i128, (e.b.y - e.a.y) as i128);
    let (qx, qy) = (f.a.x as i128, f.a.y as i128);
    let (sx, sy) = ((f.b.x - f.a.x) as i128, (f.b.y - f.a.y) as i128);
    let (qpx, qpy) = (qx - px, qy - py);

    let denom = cross_i(rx, ry, sx, sy);
    if denom == 0 {
        if cross_i(qpx, qpy, rx, ry) != 0 {
            return;
        }
        // Collinear: each edge is split at the other's endpoints that fall strictly inside it.
        add_collinear_splits(e, f, &mut splits[i]);
        add_collinear_splits(f, e, &mut splits[j]);
        return;
    }

    let (mut t_num, mut u_num, mut den) = (cross_i(qpx, qpy, sx, sy), cross_i(qpx, qpy, rx, ry), denom);
    if den < 0 {
        t_num = -t_num;
        u_num = -u_num;
        den = -den;
    }
    if t_num < 0 || t_num > den || u_num < 0 || u_num > den {
        return;
    }

    let point = if t_num == 0 {
        e.a
    } else if t_num == den {
        e.b
    } else if u_num == 0 {
        f.a
    } else if u_num == den {
        f.b
    } else {
        IntPoint {
            x: round_div(px * den + rx * t_num, den),
            y: round_div(py * den + ry * t_num, den),
        }
    };

    if t_num > 0 && t_num < den {
        splits[i].push((t_num as f64 / den as f64, point));
    }
    if u_num > 0 && u_num < den {
        splits[j].push((u_num as f64 / den as f64, point));
    }
}

fn add_collinear_splits(target: &Edge, other: &Edge, out: &mut Vec<(f64, IntPoint)>) {
    let (ax, ay) = (target.a.x as i128, target.a.y as i128);
    let (dx, dy) = ((target.b.x - target.a.x) as i128, (target.b.y - target.a.y) as i128);
    let len2 = dx * dx + dy * dy;
    for p in [other.a, other.b] {
        let dot = (p.x as i128 - ax) * dx + (p.y as i128 - ay) * dy;
        if dot > 0 && dot < len2 {
            out.push((dot as f64 / len2 as f64, p));
        }
    }
}

fn winding(ring: &Ring, p: Vec2) -> i32 {
    if p.x < ring.min.x || p.x > ring.max.x || p.y < ring.min.y || p.y > ring.max.y {
        return 0;
    }
    let n = ring.points.len();
    let mut w = 0;
    for i in 0..n {
        let a = ring.points[i].to_f64();
        let b = ring.points[(i + 1) % n].to_f64();
        let side = (b - a).cross(p - a);
        if a.y <= p.y {
            if b.y > p.y && side > 0.0 {
                w += 1;
            }
        } else if b.y <= p.y && side < 0.0 {
            w -= 1;
        }
    }
    w
}

fn filled(rings: &[Ring], p: Vec2, op: ClipOp) -> bool {
    let (mut ws, mut wc) = (0, 0);
    for ring in rings {
        match ring.role {
            Role::Subject => ws += winding(ring, p),
            Role::Clip => wc += winding(ring, p),
        }
    }
    op.keeps(ws != 0, wc != 0)
}

/// Directed boundary pieces of the result, filled side on the left.
fn classify(rings: &[Ring], pieces: &[Piece], op: ClipOp) -> Vec<(IntPoint, IntPoint)> {
    let mut kept: BTreeSet<(IntPoint, IntPoint)> = BTreeSet::new();
    for piece in pieces {
        let left = filled(rings, piece.mid + piece.normal * PROBE, op);
        let right = filled(rings, piece.mid - piece.normal * PROBE, op);
        if left == right {
            continue;
        }
        let directed = if left {
            (piece.a, piece.b)
        } else {
            (piece.b, piece.a)
        };
        // Opposite pieces cancel: they bound a zero-width sliver.
        if !kept.remove(&(directed.1, directed.0)) {
            kept.insert(directed);
        }
    }
    kept.into_iter().collect()
}

fn stitch(edges: &[(IntPoint, IntPoint)]) -> Result<Vec<Vec<IntPoint>>> {
    let mut outgoing: BTreeMap<IntPoint, Vec<usize>> = BTreeMap::new();
    for (idx, (a, _)) in edges.iter().enumerate() {
        outgoing.entry(*a).or_default().push(idx);
    }

    let mut used = vec![false; edges.len()];
    let mut contours = Vec::new();
    for start_idx in 0..edges.len() {
        if used[start_idx] {
            continue;
        }
        let start = edges[start_idx].0;
        let mut contour = vec![start];
        let mut cur = start_idx;
        loop {
            used[cur] = true;
            let (a, b) = edges[cur];
            if b == start {
                break;
            }
            contour.push(b);

            let incoming = b.to_f64() - a.to_f64();
            let next = outgoing
                .get(&b)
                .into_iter()
                .flatten()
                .copied()
                .filter(|&e| !used[e])
                .max_by(|&l, &r| {
                    turn(incoming, edges[l]).total_cmp(&turn(incoming, edges[r]))
                });
            match next {
                Some(e) => cur = e,
                None => {
                    let p = b.to_f64();
                    return Err(GeometryError::OpenContour { x: p.x, y: p.y });
                }
            }
        }
        let contour = drop_collinear(contour);
        if contour.len() >= 3 && int_area2(&contour) != 0 {
            contours.push(contour);
        }
    }
    Ok(contours)
}

/// Signed turn from `incoming` onto `edge`; the sharpest left turn hugs the current region.
fn turn(incoming: Vec2, edge: (IntPoint, IntPoint)) -> f64 {
    let out = edge.1.to_f64() - edge.0.to_f64();
    incoming.cross(out).atan2(incoming.dot(out))
}

fn drop_collinear(mut pts: Vec<IntPoint>) -> Vec<IntPoint> {
    let mut changed = true;
    while changed && pts.len() >= 3 {
        changed = false;
        let n = pts.len();
        for i in 0..n {
            let prev = pts[(i + n - 1) % n];
            let cur = pts[i];
            let next = pts[(i + 1) % n];
            let c = cross_i(
                (cur.x - prev.x) as i128,
                (cur.y - prev.y) as i128,
                (next.x - cur.x) as i128,
                (next.y - cur.y) as i128,
            );
            if c == 0 || cur == prev {
                pts.remove(i);
                changed = true;
                break;
            }
        }
    }
    pts
}

fn assemble(contours: Vec<Vec<IntPoint>>, scale: f64) -> Vec<Polygon> {
    let inv = 1.0 / scale;
    let to_world = |ring: &[IntPoint]| -> Vec<Vec2> { ring.iter().map(|p| p.to_f64() * inv).collect() };

    let mut outers: Vec<(f64, Vec<Vec2>, Vec<Vec<Vec2>>)> = Vec::new();
    let mut holes: Vec<Vec<IntPoint>> = Vec::new();
    for contour in contours {
        let area = int_area2(&contour);
        if area > 0 {
            outers.push((area as f64, to_world(&contour), Vec::new()));
        } else {
            holes.push(contour);
        }
    }

    for hole in holes {
        // The filled region lies to the left of the hole's first edge.
        let a = hole[0].to_f64();
        let b = hole[1].to_f64();
        let probe = (a.lerp(b, 0.5) + (b - a).perpendicular().unit() * PROBE) * inv;
        let owner = outers
            .iter_mut()
            .filter(|(_, ring, _)| ring_contains(ring, probe))
            .min_by(|l, r| l.0.total_cmp(&r.0));
        if let Some((_, _, owned)) = owner {
            owned.push(to_world(&hole));
        }
    }

    outers
        .into_iter()
        .map(|(_, ring, holes)| Polygon::with_holes(ring, holes))
        .collect()
}
