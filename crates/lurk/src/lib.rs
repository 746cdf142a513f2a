//! Umbrella crate that re-exports the `lurk-*` building blocks.
//!
//! Geometry and clipping live in [`geom`], the broad-phase segment grid in [`index`], visibility
//! polygons in [`sight`], the navmesh in [`nav`], agent state machines in [`agent`] (with the tick
//! and event kernel in [`core`]), and the owning simulation in [`world`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

#[cfg(feature = "geom")]
#[cfg_attr(docsrs, doc(cfg(feature = "geom")))]
pub use lurk_geom as geom;

#[cfg(feature = "index")]
#[cfg_attr(docsrs, doc(cfg(feature = "index")))]
pub use lurk_index as index;

#[cfg(feature = "sight")]
#[cfg_attr(docsrs, doc(cfg(feature = "sight")))]
pub use lurk_sight as sight;

#[cfg(feature = "nav")]
#[cfg_attr(docsrs, doc(cfg(feature = "nav")))]
pub use lurk_nav as nav;

#[cfg(feature = "agent")]
#[cfg_attr(docsrs, doc(cfg(feature = "agent")))]
pub use lurk_core as core;

#[cfg(feature = "agent")]
#[cfg_attr(docsrs, doc(cfg(feature = "agent")))]
pub use lurk_agent as agent;

#[cfg(feature = "world")]
#[cfg_attr(docsrs, doc(cfg(feature = "world")))]
pub use lurk_world as world;
