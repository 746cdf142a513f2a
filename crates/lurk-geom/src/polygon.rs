use crate::{GeometryError, ParentId, Segment, Vec2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Square of half-size `half_extent` centered on `center`.
    pub fn around(center: Vec2, half_extent: f64) -> Self {
        let h = Vec2::new(half_extent, half_extent);
        Self::new(center - h, center + h)
    }

    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec2>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut out = Self::new(first, first);
        for p in iter {
            out.min.x = out.min.x.min(p.x);
            out.min.y = out.min.y.min(p.y);
            out.max.x = out.max.x.max(p.x);
            out.max.y = out.max.y.max(p.y);
        }
        Some(out)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn expanded(&self, margin: f64) -> Self {
        let m = Vec2::new(margin, margin);
        Self::new(self.min - m, self.max + m)
    }

    pub fn center(&self) -> Vec2 {
        self.min.lerp(self.max, 0.5)
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Counter-clockwise rectangle polygon covering the box.
    pub fn to_polygon(&self) -> Polygon {
        Polygon::rect(self.min, self.max)
    }
}

/// Simple polygon (not necessarily convex) with optional hole contours.
///
/// Holes must lie strictly inside the outer contour and must not self-intersect. The containment
/// test uses the even-odd rule over every ring, so hole orientation does not matter there; the
/// clipping module normalises orientation itself.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Polygon {
    points: Vec<Vec2>,
    #[cfg_attr(feature = "serde", serde(default))]
    holes: Vec<Vec<Vec2>>,
}

impl Polygon {
    pub fn new(points: Vec<Vec2>) -> Self {
        debug_assert!(points.len() >= 3, "polygon needs at least 3 points");
        Self {
            points,
            holes: Vec::new(),
        }
    }

    pub fn try_new(points: Vec<Vec2>) -> Result<Self, GeometryError> {
        if points.len() < 3 {
            return Err(GeometryError::TooFewPoints(points.len()));
        }
        Ok(Self {
            points,
            holes: Vec::new(),
        })
    }

    pub fn triangle(a: Vec2, b: Vec2, c: Vec2) -> Self {
        Self::new(vec![a, b, c])
    }

    /// Counter-clockwise axis-aligned rectangle.
    pub fn rect(min: Vec2, max: Vec2) -> Self {
        Self::new(vec![
            min,
            Vec2::new(max.x, min.y),
            max,
            Vec2::new(min.x, max.y),
        ])
    }

    pub fn with_holes(points: Vec<Vec2>, holes: Vec<Vec<Vec2>>) -> Self {
        let mut poly = Self::new(points);
        for hole in holes {
            poly.add_hole(hole);
        }
        poly
    }

    pub fn add_hole(&mut self, hole: Vec<Vec2>) {
        debug_assert!(hole.len() >= 3, "hole contour needs at least 3 points");
        self.holes.push(hole);
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn holes(&self) -> &[Vec<Vec2>] {
        &self.holes
    }

    /// Outer contour followed by every hole contour.
    pub fn rings(&self) -> impl Iterator<Item = &[Vec2]> + '_ {
        core::iter::once(self.points.as_slice()).chain(self.holes.iter().map(Vec::as_slice))
    }

    pub fn segments(&self) -> Vec<Segment> {
        let mut out = Vec::with_capacity(self.points.len());
        for ring in self.rings() {
            push_ring_segments(ring, None, &mut out);
        }
        out
    }

    pub fn segments_with_parent(&self, parent: ParentId) -> Vec<Segment> {
        let mut out = Vec::with_capacity(self.points.len());
        for ring in self.rings() {
            push_ring_segments(ring, Some(parent), &mut out);
        }
        out
    }

    pub fn bounds(&self) -> Aabb {
        // `new` guarantees a non-empty outer ring.
        Aabb::from_points(self.points.iter().copied())
            .unwrap_or_else(|| Aabb::new(Vec2::ZERO, Vec2::ZERO))
    }

    /// Signed area of the outer contour; positive when counter-clockwise.
    pub fn signed_area(&self) -> f64 {
        ring_signed_area(&self.points)
    }

    pub fn is_ccw(&self) -> bool {
        self.signed_area() > 0.0
    }

    pub fn centroid(&self) -> Vec2 {
        let area = self.signed_area();
        if area.abs() <= 1e-12 {
            let sum = self
                .points
                .iter()
                .fold(Vec2::ZERO, |acc, p| acc + *p);
            return sum / self.points.len().max(1) as f64;
        }
        let n = self.points.len();
        let mut c = Vec2::ZERO;
        for i in 0..n {
            let p = self.points[i];
            let q = self.points[(i + 1) % n];
            let w = p.cross(q);
            c += (p + q) * w;
        }
        c / (6.0 * area)
    }

    /// Even-odd containment over every ring.
    pub fn contains(&self, point: Vec2) -> bool {
        self.rings()
            .fold(false, |inside, ring| inside ^ ring_contains(ring, point))
    }

    /// True when both polygons share a boundary segment traversed in opposite directions.
    pub fn adjacent_to(&self, other: &Polygon) -> bool {
        let n = self.points.len();
        let m = other.points.len();
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            for j in 0..m {
                if other.points[j] == b && other.points[(j + 1) % m] == a {
                    return true;
                }
            }
        }
        false
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            points: self.points.iter().map(|p| *p + offset).collect(),
            holes: self
                .holes
                .iter()
                .map(|h| h.iter().map(|p| *p + offset).collect())
                .collect(),
        }
    }

    pub fn reversed(&self) -> Self {
        let mut out = self.clone();
        out.points.reverse();
        for hole in out.holes.iter_mut() {
            hole.reverse();
        }
        out
    }

    /// Outer contours equal within `tolerance`, allowing any starting vertex.
    pub fn approx_eq(&self, other: &Polygon, tolerance: f64) -> bool {
        let n = self.points.len();
        if n != other.points.len() {
            return false;
        }
        (0..n).any(|shift| {
            (0..n).all(|i| self.points[i].approx_eq(other.points[(i + shift) % n], tolerance))
        })
    }
}

pub(crate) fn ring_signed_area(ring: &[Vec2]) -> f64 {
    let n = ring.len();
    let mut sum = 0.0;
    for i in 0..n {
        sum += ring[i].cross(ring[(i + 1) % n]);
    }
    sum * 0.5
}

pub(crate) fn ring_contains(ring: &[Vec2], point: Vec2) -> bool {
    let mut inside = false;
    let n = ring.len();
    if n == 0 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (ring[i], ring[j]);
        let crosses = (pi.y > point.y) != (pj.y > point.y)
            && point.x < (pj.x - pi.x) * ((point.y - pi.y) / (pj.y - pi.y)) + pi.x;
        if crosses {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn push_ring_segments(ring: &[Vec2], parent: Option<ParentId>, out: &mut Vec<Segment>) {
    let n = ring.len();
    for i in 0..n {
        let (a, b) = (ring[i], ring[(i + 1) % n]);
        if a == b {
            continue;
        }
        out.push(Segment { a, b, parent });
    }
}
