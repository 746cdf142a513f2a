use core::ops::Range;

use lurk_geom::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AgentConfig {
    pub radius: f64,
    /// Distance covered per frame while walking back onto the mesh.
    pub return_step: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            radius: 4.0,
            return_step: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GuardMode {
    #[default]
    Wait,
    Wander,
    Patrol,
}

/// How a guard decides its target is close enough to grow suspicious.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Detection {
    /// Anything within `suspect_range`, walls or not.
    #[default]
    Proximity,
    /// Within `suspect_range` and inside the cone cast along the guard's facing.
    FieldOfView { fov: f64 },
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GuardConfig {
    pub mode: GuardMode,
    pub patrol_route: Vec<Vec2>,
    /// Wander destinations are centroids within this distance of the spawn point.
    pub wander_range: f64,
    pub suspect_range: f64,
    /// Weapon range.
    pub target_range: f64,
    /// Suspicion lost per second while the target is out of range.
    pub decay_rate: f64,
    pub target_fps: f64,
    /// Ticks between wander decisions, drawn uniformly per cycle.
    pub wander_interval: Range<f64>,
    /// Engaged guards give up once suspicion falls below this.
    pub disengage_threshold: f64,
    pub detection: Detection,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            mode: GuardMode::Wait,
            patrol_route: Vec::new(),
            wander_range: 64.0,
            suspect_range: 110.0,
            target_range: 90.0,
            decay_rate: 0.1,
            target_fps: 60.0,
            wander_interval: 20.0..120.0,
            disengage_threshold: 0.1,
            detection: Detection::Proximity,
        }
    }
}
