use lurk_geom::{ParentId, Polygon, Vec2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Field of view meaning "no cone restriction".
pub const FULL_CIRCLE: f64 = core::f64::consts::TAU;

/// Parameters of a single visibility cast.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CastRequest {
    pub viewpoint: Vec2,
    /// Bounding region; rays never travel past it.
    pub viewport: Polygon,
    /// Center of the view cone, radians.
    pub look_angle: f64,
    /// Full cone width, radians. Values `>= 2π` disable the cone.
    pub fov: f64,
    /// Also report which obstacles were struck.
    pub include_structure: bool,
}

impl CastRequest {
    pub fn new(viewpoint: Vec2, viewport: Polygon) -> Self {
        Self {
            viewpoint,
            viewport,
            look_angle: 0.0,
            fov: FULL_CIRCLE,
            include_structure: false,
        }
    }

    /// Square viewport of half-size `range` centered on the viewpoint.
    pub fn around(viewpoint: Vec2, range: f64) -> Self {
        let h = Vec2::new(range, range);
        Self::new(viewpoint, Polygon::rect(viewpoint - h, viewpoint + h))
    }

    pub fn looking(mut self, look_angle: f64, fov: f64) -> Self {
        self.look_angle = look_angle;
        self.fov = fov;
        self
    }

    pub fn with_structure(mut self) -> Self {
        self.include_structure = true;
        self
    }

    pub fn is_cone(&self) -> bool {
        self.fov < FULL_CIRCLE
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CastResult {
    /// Boundary of everything visible from the viewpoint; `None` when fewer than three rays hit.
    pub visible: Option<Polygon>,
    /// Obstacles struck by at least one ray, when requested.
    pub structures: Vec<Polygon>,
    pub structure_ids: Vec<ParentId>,
}

impl CastResult {
    pub fn sees(&self, point: Vec2) -> bool {
        self.visible.as_ref().is_some_and(|poly| poly.contains(point))
    }
}
