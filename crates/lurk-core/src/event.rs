use lurk_geom::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::EntityId;

/// Control input an agent asks its body to apply. Consumed by whatever moves entities.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Intent {
    /// Unit direction to move in; zero means stand still.
    Move(Vec2),
    /// Direction to face.
    Look(Vec2),
    Fire(bool),
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum AgentEvent {
    Intent { agent: EntityId, intent: Intent },
    RouteSuccess { agent: EntityId },
    RouteFail { agent: EntityId },
    RouteComplete { agent: EntityId },
    Engaged { agent: EntityId, target: EntityId },
    Disengaged { agent: EntityId },
}

impl AgentEvent {
    pub fn agent(&self) -> EntityId {
        match *self {
            AgentEvent::Intent { agent, .. }
            | AgentEvent::RouteSuccess { agent }
            | AgentEvent::RouteFail { agent }
            | AgentEvent::RouteComplete { agent }
            | AgentEvent::Engaged { agent, .. }
            | AgentEvent::Disengaged { agent } => agent,
        }
    }

    pub fn intent(&self) -> Option<Intent> {
        match *self {
            AgentEvent::Intent { intent, .. } => Some(intent),
            _ => None,
        }
    }

    /// Short stable name, used for logs and event tallies.
    pub fn kind(&self) -> &'static str {
        match self {
            AgentEvent::Intent {
                intent: Intent::Move(_),
                ..
            } => "move",
            AgentEvent::Intent {
                intent: Intent::Look(_),
                ..
            } => "look",
            AgentEvent::Intent {
                intent: Intent::Fire(_),
                ..
            } => "fire",
            AgentEvent::RouteSuccess { .. } => "route_success",
            AgentEvent::RouteFail { .. } => "route_fail",
            AgentEvent::RouteComplete { .. } => "route_complete",
            AgentEvent::Engaged { .. } => "engaged",
            AgentEvent::Disengaged { .. } => "disengaged",
        }
    }
}

/// FIFO buffer of events emitted during a frame.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<AgentEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: AgentEvent) {
        self.events.push(event);
    }

    pub fn intent(&mut self, agent: EntityId, intent: Intent) {
        self.push(AgentEvent::Intent { agent, intent });
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgentEvent> + '_ {
        self.events.iter()
    }

    /// Remove and return every queued event in emission order.
    pub fn drain(&mut self) -> Vec<AgentEvent> {
        core::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Extend<AgentEvent> for EventQueue {
    fn extend<T: IntoIterator<Item = AgentEvent>>(&mut self, iter: T) {
        self.events.extend(iter);
    }
}
