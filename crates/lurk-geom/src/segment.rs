use crate::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tolerance used for on-segment tests and intersection parameters.
const EPS: f64 = 1e-9;

/// Non-owning tag naming the polygon a boundary segment was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParentId(pub u32);

/// Which side of a directed segment a point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Side {
    Left,
    Right,
    Collinear,
}

impl Side {
    pub fn sign(self) -> i8 {
        match self {
            Side::Left => 1,
            Side::Right => -1,
            Side::Collinear => 0,
        }
    }
}

/// How one segment relates to another.
///
/// - `Side`: the segment lies entirely on one side of the other's supporting line (or on it).
/// - `Point`: the segments cross; the crossing point is returned so callers can split.
/// - `NoIntersection`: the segment straddles the other's line but misses the other segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Relation {
    NoIntersection,
    Side(Side),
    Point(Vec2),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec2,
    /// Distance from the ray origin to `point`.
    pub distance: f64,
}

/// Directed segment `a -> b`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Segment {
    pub a: Vec2,
    pub b: Vec2,
    pub parent: Option<ParentId>,
}

impl Segment {
    pub fn new(a: Vec2, b: Vec2) -> Self {
        debug_assert!(a.is_finite() && b.is_finite(), "segment endpoints must be finite");
        Self { a, b, parent: None }
    }

    pub fn with_parent(mut self, parent: ParentId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn direction(&self) -> Vec2 {
        self.b - self.a
    }

    pub fn length(&self) -> f64 {
        self.direction().length()
    }

    pub fn midpoint(&self) -> Vec2 {
        self.a.lerp(self.b, 0.5)
    }

    /// Unit normal, counter-clockwise of the segment direction.
    pub fn normal(&self) -> Vec2 {
        self.direction().perpendicular().unit()
    }

    pub fn reversed(&self) -> Self {
        Self {
            a: self.b,
            b: self.a,
            parent: self.parent,
        }
    }

    /// Parameter `t` in `[0, 1]` of `point` along the segment, or `None` if the point is off it.
    pub fn contains(&self, point: Vec2) -> Option<f64> {
        let d = self.direction();
        let len2 = d.length_squared();
        if len2 == 0.0 {
            return (point == self.a).then_some(0.0);
        }
        let len = len2.sqrt();
        let rel = point - self.a;
        if d.cross(rel).abs() / len > EPS * len.max(1.0) {
            return None;
        }
        let t = rel.dot(d) / len2;
        let tol = EPS / len.min(1.0);
        if t < -tol || t > 1.0 + tol {
            return None;
        }
        Some(t.clamp(0.0, 1.0))
    }

    /// Split at `point` if it lies strictly inside the segment; otherwise return the segment as-is.
    pub fn split_at(&self, point: Vec2) -> Vec<Segment> {
        let Some(t) = self.contains(point) else {
            return vec![*self];
        };
        let mid = self.a.lerp(self.b, t);
        if mid == self.a || mid == self.b {
            return vec![*self];
        }
        vec![
            Segment {
                a: self.a,
                b: mid,
                parent: self.parent,
            },
            Segment {
                a: mid,
                b: self.b,
                parent: self.parent,
            },
        ]
    }

    /// Split both segments at their crossing point. Returns 2 to 4 segments, none of zero length.
    pub fn divide(&self, other: &Segment) -> Vec<Segment> {
        match self.relation_to(other) {
            Relation::Point(p) => {
                let mut out = self.split_at(p);
                out.extend(other.split_at(p));
                out
            }
            Relation::Side(_) | Relation::NoIntersection => vec![*self, *other],
        }
    }

    pub fn side(&self, point: Vec2, tolerance: f64) -> Side {
        let c = self.direction().cross(point - self.a);
        if c.abs() <= tolerance {
            Side::Collinear
        } else if c > 0.0 {
            Side::Left
        } else {
            Side::Right
        }
    }

    pub fn relation_to(&self, other: &Segment) -> Relation {
        let sa = other.side(self.a, 0.0);
        let sb = other.side(self.b, 0.0);
        match (sa, sb) {
            (Side::Collinear, Side::Collinear) => Relation::Side(Side::Collinear),
            (Side::Collinear, s) | (s, Side::Collinear) => Relation::Side(s),
            (sa, sb) if sa == sb => Relation::Side(sa),
            _ => match self.intersection(other) {
                Some(p) => Relation::Point(p),
                None => Relation::NoIntersection,
            },
        }
    }

    pub fn nearest_point(&self, point: Vec2) -> Vec2 {
        let d = self.direction();
        let len2 = d.length_squared();
        if len2 == 0.0 {
            return self.a;
        }
        let t = ((point - self.a).dot(d) / len2).clamp(0.0, 1.0);
        self.a + d * t
    }

    pub fn distance_to(&self, point: Vec2) -> f64 {
        self.nearest_point(point).distance(point)
    }

    /// Crossing point of two segments (endpoints inclusive). Parallel segments never intersect.
    pub fn intersection(&self, other: &Segment) -> Option<Vec2> {
        let r = self.direction();
        let s = other.direction();
        let denom = r.cross(s);
        if denom.abs() <= f64::EPSILON * r.length() * s.length() {
            return None;
        }
        let qp = other.a - self.a;
        let t = qp.cross(s) / denom;
        let u = qp.cross(r) / denom;
        let range = -1e-12..=1.0 + 1e-12;
        if range.contains(&t) && range.contains(&u) {
            Some(self.a + r * t)
        } else {
            None
        }
    }

    /// First point where the ray `origin + k * dir` (k >= 0) meets this segment.
    ///
    /// The segment parameter is tested exactly: a ray passing a hair beside an endpoint misses.
    pub fn ray_intersection(&self, origin: Vec2, dir: Vec2) -> Option<RayHit> {
        let s = self.direction();
        let denom = dir.cross(s);
        if denom == 0.0 {
            return None;
        }
        let qp = self.a - origin;
        let k = qp.cross(s) / denom;
        let u = qp.cross(dir) / denom;
        if k < 0.0 || !(0.0..=1.0).contains(&u) {
            return None;
        }
        let point = origin + dir * k;
        Some(RayHit {
            point,
            distance: k * dir.length(),
        })
    }

    /// Hash of the endpoint coordinates. Equal segments hash equally; different segments may collide.
    pub fn stable_hash(&self) -> u64 {
        let mut h: u64 = 0x243F_6A88_85A3_08D3;
        for v in [self.a.x, self.a.y, self.b.x, self.b.y] {
            // `+ 0.0` folds -0.0 into 0.0.
            h = mix64(h ^ (v + 0.0).to_bits());
        }
        h
    }
}

fn mix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58476D1CE4E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D049BB133111EB);
    x ^ (x >> 31)
}
