use lurk_geom::{GeometryError, Vec2};
use thiserror::Error;

/// Which end of a path query failed to locate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    Goal,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Start => f.write_str("start"),
            Endpoint::Goal => f.write_str("goal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NavError {
    /// The point lies outside every triangle. Happens transiently right after geometry changes.
    #[error("{endpoint} point ({}, {}) is not contained in the navmesh", point.x, point.y)]
    PointNotContained { endpoint: Endpoint, point: Vec2 },

    #[error("no route from ({}, {}) to ({}, {})", from.x, from.y, to.x, to.y)]
    Unreachable { from: Vec2, to: Vec2 },

    #[error("navmesh geometry failure: {0}")]
    Geometry(#[from] GeometryError),
}

pub type Result<T> = std::result::Result<T, NavError>;
