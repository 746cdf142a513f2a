//! Geometry primitives shared by every layer of the engine (vectors, segments, polygons,
//! fixed-precision clipping, constrained triangulation).

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod clip;
pub mod error;
pub mod polygon;
pub mod segment;
pub mod triangulate;
pub mod vec2;

pub use clip::ClipOp;
pub use error::{GeometryError, Result};
pub use polygon::{Aabb, Polygon};
pub use segment::{ParentId, RayHit, Relation, Segment, Side};
pub use triangulate::triangulate;
pub use vec2::{signed_angle_diff, Vec2};
