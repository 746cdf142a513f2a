//! Broad-phase spatial index: world cells hashed to the segments that touch them.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod index;
pub mod set;

pub use index::{SegmentId, SpatialIndex, SpatialIndexConfig};
pub use set::SegmentSet;
