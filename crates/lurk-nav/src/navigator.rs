use lurk_geom::Vec2;

use crate::Result;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Straightened route returned by a path query.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavPath {
    /// Waypoints; `points[0]` is the requested start and the last point is the requested goal.
    pub points: Vec<Vec2>,
    /// Triangle corridor the route was pulled through.
    pub regions: Vec<NavRegionId>,
    /// Triangle containing the goal, used by followers to detect a stale route.
    pub destination: NavRegionId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavRaycastHit {
    pub point: Vec2,
}

/// Triangle identifier, stable for the lifetime of one baked mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavRegionId(pub u32);

/// Read-only navigation queries consumed by agents.
pub trait Navigator {
    fn find_path(&self, start: Vec2, goal: Vec2) -> Result<NavPath>;

    fn region_at(&self, point: Vec2) -> Option<NavRegionId>;

    fn region_contains(&self, region: NavRegionId, point: Vec2) -> bool;

    /// Centroid of the triangle whose centroid is closest to `point`.
    fn nearest_centroid(&self, point: Vec2) -> Option<Vec2>;

    /// Centroids of every triangle whose centroid lies within `range` of `center`.
    fn centroids_within(&self, center: Vec2, range: f64) -> Vec<Vec2>;

    fn contains(&self, point: Vec2) -> bool {
        self.region_at(point).is_some()
    }
}
