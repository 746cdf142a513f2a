use std::path::Path;

use anyhow::{Context, Result};
use lurk_agent::AgentConfig;
use lurk_index::SpatialIndexConfig;
use lurk_nav::NavMeshConfig;
use serde::{Deserialize, Serialize};

/// Applies move intents to agent positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoverConfig {
    /// World units per tick at timescale 1.
    pub speed: f64,
}

impl Default for MoverConfig {
    fn default() -> Self {
        Self { speed: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Seed for every agent RNG stream.
    pub seed: u64,
    pub index: SpatialIndexConfig,
    pub navmesh: NavMeshConfig,
    pub mover: MoverConfig,
    /// Used for agents spawned from level data.
    pub agent: AgentConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            index: SpatialIndexConfig::default(),
            navmesh: NavMeshConfig::default(),
            mover: MoverConfig::default(),
            agent: AgentConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Load from a YAML file; missing keys fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read world config from {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse world config from {}", path.display()))?;
        Ok(config)
    }

    /// Load `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
