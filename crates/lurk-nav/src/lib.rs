//! Navigation primitives: the triangle navmesh, its adjacency graph, and path queries.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod error;
pub mod graph;
pub mod mesh;
pub mod navigator;

pub use error::{Endpoint, NavError, Result};
pub use graph::Graph;
pub use mesh::{NavMesh, NavMeshConfig, RebuildStats};
pub use navigator::{NavPath, NavRaycastHit, NavRegionId, Navigator};
