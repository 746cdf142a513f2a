//! Deterministic kernel primitives shared by the lurk agent and world crates.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod entity;
pub mod event;
pub mod rng;
pub mod tick;

pub use entity::EntityId;
pub use event::{AgentEvent, EventQueue, Intent};
pub use rng::{DeterministicRng, SplitMix64};
pub use tick::TickContext;
