use std::collections::BTreeMap;

use lurk_agent::{Agent, AgentWorld};
use lurk_core::{AgentEvent, EntityId, EventQueue, Intent, TickContext};
use lurk_geom::{Polygon, Segment, Vec2};
use lurk_index::SpatialIndex;
use lurk_nav::{NavMesh, Navigator, RebuildStats};
use lurk_sight::{CastRequest, CastResult, Caster};

use crate::{LevelData, WorldConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObstacleId(pub u32);

/// Obstacle outline in local coordinates, placed at `position`.
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub polygon: Polygon,
    pub position: Vec2,
}

impl Obstacle {
    pub fn new(polygon: Polygon, position: Vec2) -> Self {
        Self { polygon, position }
    }

    /// Outline in world coordinates.
    pub fn world_polygon(&self) -> Polygon {
        self.polygon.translated(self.position)
    }
}

impl From<Polygon> for Obstacle {
    fn from(polygon: Polygon) -> Self {
        Self::new(polygon, Vec2::ZERO)
    }
}

/// Something agents can track but that this crate does not drive, such as the player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entity {
    pub position: Vec2,
    pub suspiciousness: f64,
}

/// Owns obstacle geometry, the structures derived from it, and the agents reading them.
///
/// Geometry changes mark the world dirty; the next [`World::frame`] rebuilds the spatial index,
/// then the caster, then the navmesh before any agent runs. A failed navmesh rebuild keeps the
/// previous mesh and leaves the world dirty.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    bounds: Polygon,
    obstacles: BTreeMap<ObstacleId, Obstacle>,
    next_obstacle: u32,
    index: SpatialIndex,
    caster: Caster,
    navmesh: NavMesh,
    agents: Vec<Agent>,
    entities: BTreeMap<EntityId, Entity>,
    tick: u64,
    dirty: bool,
}

impl World {
    pub fn new(config: WorldConfig, bounds: Polygon) -> Self {
        Self {
            index: SpatialIndex::new(config.index),
            caster: Caster::with_index_config(config.index),
            navmesh: NavMesh::new(config.navmesh),
            config,
            bounds,
            obstacles: BTreeMap::new(),
            next_obstacle: 0,
            agents: Vec::new(),
            entities: BTreeMap::new(),
            tick: 0,
            dirty: true,
        }
    }

    /// Populate a world from level data. Geometry is built on the first frame.
    pub fn from_level(config: WorldConfig, level: &LevelData) -> anyhow::Result<Self> {
        let mut world = Self::new(config, level.bounds_polygon()?);
        for obstacle in &level.obstacles {
            world.add_obstacle(Obstacle::new(obstacle.polygon()?, obstacle.position));
        }
        for entity in &level.entities {
            world.add_entity(entity.id, entity.position, entity.suspiciousness);
        }
        for data in &level.agents {
            let mut agent = match &data.guard {
                Some(guard) => {
                    Agent::guard(data.id, data.position, guard.clone(), world.config.agent)
                }
                None => Agent::new(data.id, data.position, world.config.agent),
            };
            if let Some(guard) = agent.guard_state_mut() {
                guard.set_target(data.watch);
            }
            if let Some(target) = data.target {
                agent.set_target(target);
            }
            world.add_agent(agent);
        }
        tracing::debug!(
            obstacles = world.obstacles.len(),
            entities = world.entities.len(),
            agents = world.agents.len(),
            "World loaded from level"
        );
        Ok(world)
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn bounds(&self) -> &Polygon {
        &self.bounds
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn add_obstacle(&mut self, obstacle: impl Into<Obstacle>) -> ObstacleId {
        let id = ObstacleId(self.next_obstacle);
        self.next_obstacle += 1;
        self.obstacles.insert(id, obstacle.into());
        self.dirty = true;
        id
    }

    pub fn remove_obstacle(&mut self, id: ObstacleId) -> Option<Obstacle> {
        let removed = self.obstacles.remove(&id);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    pub fn obstacles(&self) -> impl Iterator<Item = (ObstacleId, &Obstacle)> + '_ {
        self.obstacles.iter().map(|(id, o)| (*id, o))
    }

    /// Obstacle outlines in world coordinates, in id order.
    pub fn obstacle_polygons(&self) -> Vec<Polygon> {
        self.obstacles.values().map(Obstacle::world_polygon).collect()
    }

    pub fn add_entity(&mut self, id: EntityId, position: Vec2, suspiciousness: f64) {
        self.entities.insert(
            id,
            Entity {
                position,
                suspiciousness,
            },
        );
    }

    /// Move an existing entity; returns `false` when `id` is unknown.
    pub fn set_entity(&mut self, id: EntityId, position: Vec2) -> bool {
        match self.entities.get_mut(&id) {
            Some(entity) => {
                entity.position = position;
                true
            }
            None => false,
        }
    }

    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Agents are updated in id order; adding an existing id replaces that agent.
    pub fn add_agent(&mut self, agent: Agent) {
        match self.agents.binary_search_by_key(&agent.id(), Agent::id) {
            Ok(i) => self.agents[i] = agent,
            Err(i) => self.agents.insert(i, agent),
        }
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: EntityId) -> Option<&Agent> {
        self.agents
            .binary_search_by_key(&id, Agent::id)
            .ok()
            .map(|i| &self.agents[i])
    }

    pub fn agent_mut(&mut self, id: EntityId) -> Option<&mut Agent> {
        self.agents
            .binary_search_by_key(&id, Agent::id)
            .ok()
            .map(|i| &mut self.agents[i])
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn caster(&self) -> &Caster {
        &self.caster
    }

    pub fn navmesh(&self) -> &NavMesh {
        &self.navmesh
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Rebuild the spatial index, the caster and the navmesh, in that order.
    ///
    /// The index and caster always take the new geometry. A navmesh failure is returned after the
    /// previous mesh has been restored, and the world stays dirty so the next frame retries.
    pub fn rebuild_geometry(&mut self) -> lurk_nav::Result<RebuildStats> {
        let polygons = self.obstacle_polygons();

        let mut segments: Vec<Segment> = polygons.iter().flat_map(Polygon::segments).collect();
        segments.extend(self.bounds.segments());
        self.index.rebuild(segments);
        self.caster.rebuild_topology(&polygons);
        let stats = self.navmesh.rebuild(&polygons, &self.bounds)?;
        self.dirty = false;
        Ok(stats)
    }

    /// Advance one frame: pending geometry rebuilds, every agent in id order, then the mover.
    /// Returns the events emitted by agents this frame.
    pub fn frame(&mut self, timescale: f64, ticks: f64) -> Vec<AgentEvent> {
        if self.dirty {
            // Failures are logged by the navmesh; agents keep using the previous mesh until a
            // later frame rebuilds successfully.
            let _ = self.rebuild_geometry();
        }

        let ctx = TickContext::new(self.tick, timescale, ticks, self.config.seed);
        let mut agents = core::mem::take(&mut self.agents);
        let mut events = EventQueue::new();
        for agent in agents.iter_mut() {
            agent.frame(&ctx, &*self, &mut events);
        }

        let step = self.config.mover.speed * timescale;
        for event in events.iter() {
            let AgentEvent::Intent {
                agent,
                intent: Intent::Move(dir),
            } = *event
            else {
                continue;
            };
            if dir.is_zero() {
                continue;
            }
            if let Ok(i) = agents.binary_search_by_key(&agent, Agent::id) {
                let moved = agents[i].position() + dir.unit() * step;
                agents[i].set_position(moved);
            }
        }

        self.agents = agents;
        self.tick += 1;
        tracing::trace!(tick = ctx.tick, events = events.len(), "World frame");
        events.drain()
    }

    /// No obstacle or bounds segment crosses the straight line `a -> b`.
    pub fn line_of_sight(&self, a: Vec2, b: Vec2) -> bool {
        let line = Segment::new(a, b);
        self.index
            .segments_near_line(a, b)
            .iter()
            .all(|(_, segment)| line.intersection(segment).is_none())
    }

    /// First obstacle or bounds point hit by a ray within `max_distance`.
    pub fn raycast(&self, origin: Vec2, direction: Vec2, max_distance: f64) -> Option<Vec2> {
        let dir = direction.unit();
        if dir.is_zero() {
            return None;
        }
        self.index
            .raycast(origin, dir, max_distance)
            .iter()
            .filter_map(|(_, segment)| segment.ray_intersection(origin, dir))
            .filter(|hit| hit.distance <= max_distance)
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
            .map(|hit| hit.point)
    }

    pub fn cast(&self, request: &CastRequest) -> CastResult {
        self.caster.cast(request)
    }
}

impl AgentWorld for World {
    fn navigator(&self) -> &dyn Navigator {
        &self.navmesh
    }

    fn entity_position(&self, id: EntityId) -> Option<Vec2> {
        self.entities.get(&id).map(|e| e.position)
    }

    fn suspiciousness(&self, id: EntityId) -> f64 {
        self.entities.get(&id).map_or(0.0, |e| e.suspiciousness)
    }

    fn line_of_sight(&self, a: Vec2, b: Vec2) -> bool {
        World::line_of_sight(self, a, b)
    }

    fn can_see(&self, viewpoint: Vec2, look_angle: f64, fov: f64, range: f64, target: Vec2) -> bool {
        let request = CastRequest::around(viewpoint, range).looking(look_angle, fov);
        self.caster.cast(&request).sees(target)
    }
}
