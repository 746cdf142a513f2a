use lurk_core::EntityId;
use lurk_geom::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::AgentWorld;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MotionState {
    #[default]
    Rest,
    /// Waiting on a path query.
    Reroute,
    Navigate,
    /// Walking straight back onto the mesh after a failed query.
    Return,
}

impl MotionState {
    pub fn can_transition(self, to: MotionState) -> bool {
        use MotionState::*;
        matches!(
            (self, to),
            (Rest, Reroute)
                | (Reroute, Navigate | Return | Rest)
                | (Navigate, Navigate | Reroute | Rest)
                | (Return, Rest)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ActionState {
    #[default]
    Idle,
    Attack,
}

impl ActionState {
    pub fn can_transition(self, to: ActionState) -> bool {
        matches!(
            (self, to),
            (ActionState::Idle, ActionState::Attack) | (ActionState::Attack, ActionState::Idle)
        )
    }
}

/// What an agent moves toward or shoots at. Entity targets are re-read every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Target {
    Point(Vec2),
    Entity(EntityId),
}

impl Target {
    pub fn resolve<W: AgentWorld + ?Sized>(&self, world: &W) -> Option<Vec2> {
        match *self {
            Target::Point(p) => Some(p),
            Target::Entity(id) => world.entity_position(id),
        }
    }
}

impl From<Vec2> for Target {
    fn from(p: Vec2) -> Self {
        Target::Point(p)
    }
}

impl From<EntityId> for Target {
    fn from(id: EntityId) -> Self {
        Target::Entity(id)
    }
}
