//! The single authority that owns obstacle geometry, derived perception and navigation state, and
//! the agents reading it.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod config;
pub mod level;
pub mod world;

pub use config::{MoverConfig, WorldConfig};
pub use level::{AgentData, EntityData, LevelData, ObstacleData};
pub use world::{Entity, Obstacle, ObstacleId, World};
