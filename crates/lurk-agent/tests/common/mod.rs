#![allow(dead_code)]

use std::collections::BTreeMap;

use lurk_agent::{Agent, AgentWorld};
use lurk_core::{AgentEvent, EntityId, EventQueue, Intent, TickContext};
use lurk_geom::{Polygon, Vec2};
use lurk_nav::{NavMesh, NavMeshConfig, Navigator};

pub const SPEED: f64 = 1.0;

pub fn v(x: f64, y: f64) -> Vec2 {
    Vec2::new(x, y)
}

/// 100x100 room with a 20x20 block in the middle.
pub struct TestWorld {
    pub mesh: NavMesh,
    pub entities: BTreeMap<EntityId, (Vec2, f64)>,
    pub visible: bool,
}

impl TestWorld {
    pub fn new() -> Self {
        let mut mesh = NavMesh::new(NavMeshConfig::default());
        mesh.rebuild(
            &[Polygon::rect(v(40.0, 40.0), v(60.0, 60.0))],
            &Polygon::rect(v(0.0, 0.0), v(100.0, 100.0)),
        )
        .expect("room bakes");
        Self {
            mesh,
            entities: BTreeMap::new(),
            visible: true,
        }
    }

    pub fn put(&mut self, id: EntityId, position: Vec2, suspiciousness: f64) {
        self.entities.insert(id, (position, suspiciousness));
    }
}

impl AgentWorld for TestWorld {
    fn navigator(&self) -> &dyn Navigator {
        &self.mesh
    }

    fn entity_position(&self, id: EntityId) -> Option<Vec2> {
        self.entities.get(&id).map(|(p, _)| *p)
    }

    fn suspiciousness(&self, id: EntityId) -> f64 {
        self.entities.get(&id).map_or(0.0, |(_, s)| *s)
    }

    fn line_of_sight(&self, a: Vec2, b: Vec2) -> bool {
        self.mesh.line_of_sight(a, b)
    }

    fn can_see(&self, _viewpoint: Vec2, _look: f64, _fov: f64, _range: f64, _target: Vec2) -> bool {
        self.visible
    }
}

/// Run `frames` frames, moving the agent by its move intents when `apply_moves` is set.
pub fn run(
    world: &TestWorld,
    agent: &mut Agent,
    frames: u64,
    ticks: f64,
    apply_moves: bool,
) -> Vec<AgentEvent> {
    let mut all = Vec::new();
    let mut queue = EventQueue::new();
    for tick in 0..frames {
        let ctx = TickContext::new(tick, 1.0, ticks, 7);
        agent.frame(&ctx, world, &mut queue);
        for event in queue.drain() {
            if let (true, Some(Intent::Move(dir))) = (apply_moves, event.intent()) {
                agent.set_position(agent.position() + dir * SPEED);
            }
            all.push(event);
        }
    }
    all
}

pub fn count(events: &[AgentEvent], kind: &str) -> usize {
    events.iter().filter(|e| e.kind() == kind).count()
}
