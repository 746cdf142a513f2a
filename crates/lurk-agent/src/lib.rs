//! Agents that follow navmesh routes and guards that notice, chase and shoot at targets.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod agent;
pub mod config;
pub mod guard;
pub mod state;
pub mod world;

pub use agent::{Agent, Behavior};
pub use config::{AgentConfig, Detection, GuardConfig, GuardMode};
pub use guard::Guard;
pub use state::{ActionState, MotionState, Target};
pub use world::AgentWorld;
