use std::path::Path;

use anyhow::{bail, Context, Result};
use lurk_agent::GuardConfig;
use lurk_core::EntityId;
use lurk_geom::{Polygon, Vec2};
use serde::{Deserialize, Serialize};

/// Obstacle outline in local coordinates, placed at `position`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleData {
    pub points: Vec<Vec2>,
    #[serde(default)]
    pub position: Vec2,
}

/// A tracked entity such as the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityData {
    pub id: EntityId,
    pub position: Vec2,
    #[serde(default)]
    pub suspiciousness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentData {
    pub id: EntityId,
    pub position: Vec2,
    /// Present for guards.
    #[serde(default)]
    pub guard: Option<GuardConfig>,
    /// Entity a guard watches.
    #[serde(default)]
    pub watch: Option<EntityId>,
    /// Initial move target.
    #[serde(default)]
    pub target: Option<Vec2>,
}

/// Persisted level: world bounds, obstacle outlines, entities and agents.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelData {
    pub bounds: Vec<Vec2>,
    pub obstacles: Vec<ObstacleData>,
    pub entities: Vec<EntityData>,
    pub agents: Vec<AgentData>,
}

impl LevelData {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read level from {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to load level from {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let level: Self = serde_yaml::from_str(content).context("Failed to parse level YAML")?;
        level.bounds_polygon()?;
        for (i, obstacle) in level.obstacles.iter().enumerate() {
            obstacle
                .polygon()
                .with_context(|| format!("Invalid obstacle #{i}"))?;
        }
        Ok(level)
    }

    pub fn bounds_polygon(&self) -> Result<Polygon> {
        if self.bounds.iter().any(|p| !p.is_finite()) {
            bail!("Level bounds contain a non-finite point");
        }
        Polygon::try_new(self.bounds.clone()).context("Invalid level bounds")
    }
}

impl ObstacleData {
    /// Outline in local coordinates.
    pub fn polygon(&self) -> Result<Polygon> {
        if self.points.iter().any(|p| !p.is_finite()) || !self.position.is_finite() {
            bail!("Obstacle contains a non-finite point");
        }
        Ok(Polygon::try_new(self.points.clone())?)
    }
}
