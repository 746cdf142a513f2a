//! Visibility casting: what a viewpoint can see through a polygonal world.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod caster;
pub mod request;

pub use caster::{CastQuery, Caster, TopologyPoint};
pub use request::{CastRequest, CastResult, FULL_CIRCLE};
