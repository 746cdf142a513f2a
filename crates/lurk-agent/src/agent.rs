use std::collections::VecDeque;

use lurk_core::{AgentEvent, EntityId, EventQueue, Intent, TickContext};
use lurk_geom::Vec2;
use lurk_nav::{Endpoint, NavError, NavRegionId};

use crate::guard::{Decision, Guard};
use crate::{ActionState, AgentConfig, AgentWorld, GuardConfig, MotionState, Target};

/// Decision logic layered on top of the motion and action machines.
#[derive(Debug, Clone, PartialEq)]
pub enum Behavior {
    /// Only does what it is told through `set_target`, `set_route` and `attack`.
    Basic,
    Guard(Guard),
}

/// A moving entity driven by two independent state machines.
///
/// Motion: `Rest -> Reroute -> {Navigate | Return | Rest}`, `Navigate -> {Navigate | Reroute | Rest}`,
/// `Return -> Rest`. Action: `Idle <-> Attack`, where leaving `Attack` always emits `Fire(false)`.
///
/// Path queries complete inside the frame that issued them. Events accumulate in an outbox that
/// [`Agent::frame`] flushes, so state changes requested between frames still report their side
/// effects.
#[derive(Debug, Clone)]
pub struct Agent {
    id: EntityId,
    config: AgentConfig,
    position: Vec2,
    facing: Vec2,
    motion: MotionState,
    action: ActionState,
    motion_target: Option<Target>,
    action_target: Option<Target>,
    /// Remaining waypoints of the current leg.
    route: Vec<Vec2>,
    /// Manual waypoints still to be routed to after the current leg.
    pending: VecDeque<Vec2>,
    destination: Option<NavRegionId>,
    return_goal: Option<Vec2>,
    behavior: Behavior,
    outbox: EventQueue,
}

impl Agent {
    pub fn new(id: EntityId, position: Vec2, config: AgentConfig) -> Self {
        Self {
            id,
            config,
            position,
            facing: Vec2::new(1.0, 0.0),
            motion: MotionState::Rest,
            action: ActionState::Idle,
            motion_target: None,
            action_target: None,
            route: Vec::new(),
            pending: VecDeque::new(),
            destination: None,
            return_goal: None,
            behavior: Behavior::Basic,
            outbox: EventQueue::new(),
        }
    }

    /// A guard spawned at `position`, which is also the centre of its wander area.
    pub fn guard(
        id: EntityId,
        position: Vec2,
        guard_config: GuardConfig,
        agent_config: AgentConfig,
    ) -> Self {
        let mut agent = Self::new(id, position, agent_config);
        agent.behavior = Behavior::Guard(Guard::new(guard_config, position));
        agent
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn radius(&self) -> f64 {
        self.config.radius
    }

    /// Unit vector of the last move or look intent.
    pub fn facing(&self) -> Vec2 {
        self.facing
    }

    pub fn motion_state(&self) -> MotionState {
        self.motion
    }

    pub fn action_state(&self) -> ActionState {
        self.action
    }

    pub fn motion_target(&self) -> Option<Target> {
        self.motion_target
    }

    pub fn action_target(&self) -> Option<Target> {
        self.action_target
    }

    pub fn route(&self) -> &[Vec2] {
        &self.route
    }

    /// Triangle holding the end of the current leg.
    pub fn destination(&self) -> Option<NavRegionId> {
        self.destination
    }

    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    pub fn guard_state(&self) -> Option<&Guard> {
        match &self.behavior {
            Behavior::Guard(guard) => Some(guard),
            Behavior::Basic => None,
        }
    }

    pub fn guard_state_mut(&mut self) -> Option<&mut Guard> {
        match &mut self.behavior {
            Behavior::Guard(guard) => Some(guard),
            Behavior::Basic => None,
        }
    }

    pub fn is_moving(&self) -> bool {
        self.motion != MotionState::Rest
    }

    /// Move toward `target`, discarding any current route.
    pub fn set_target(&mut self, target: impl Into<Target>) {
        self.motion_target = Some(target.into());
        self.clear_route();
    }

    /// Visit `waypoints` in order, pathing to each. Clears the current target.
    pub fn set_route<I>(&mut self, waypoints: I)
    where
        I: IntoIterator<Item = Vec2>,
    {
        self.motion_target = None;
        self.clear_route();
        self.pending = waypoints.into_iter().collect();
    }

    /// Drop target and route; the agent comes to rest on its next frame.
    pub fn stop_moving(&mut self) {
        self.motion_target = None;
        self.clear_route();
    }

    pub fn attack(&mut self, target: impl Into<Target>) {
        self.action_target = Some(target.into());
        if self.action == ActionState::Idle {
            self.set_action(ActionState::Attack);
        }
    }

    pub fn stop_action(&mut self) {
        if self.action != ActionState::Idle {
            self.set_action(ActionState::Idle);
        }
    }

    /// Advance one frame: behavior decisions, then motion, then action. Emitted events are
    /// appended to `events`.
    pub fn frame<W>(&mut self, ctx: &TickContext, world: &W, events: &mut EventQueue)
    where
        W: AgentWorld + ?Sized,
    {
        self.think(ctx, world);
        self.update_motion(world);
        self.update_action(world);
        events.extend(self.outbox.drain());
    }

    fn think<W>(&mut self, ctx: &TickContext, world: &W)
    where
        W: AgentWorld + ?Sized,
    {
        let moving = self.is_moving();
        let Behavior::Guard(guard) = &mut self.behavior else {
            return;
        };
        let step = guard.think(
            ctx,
            world,
            self.id,
            self.position,
            self.facing,
            moving,
            &mut self.outbox,
        );

        if step.disengaged {
            self.stop_moving();
            self.stop_action();
        }
        match step.decision {
            Decision::Nothing => {}
            Decision::Hold => self.stop_moving(),
            Decision::Attack(target) => {
                self.stop_moving();
                self.attack(target);
            }
            Decision::Pursue(point) => {
                self.stop_action();
                self.set_route([point]);
            }
            Decision::Wander(point) => self.set_target(point),
            Decision::Patrol(route) => self.set_route(route),
        }
    }

    fn update_motion<W>(&mut self, world: &W)
    where
        W: AgentWorld + ?Sized,
    {
        match self.motion {
            MotionState::Rest => {
                self.outbox.intent(self.id, Intent::Move(Vec2::ZERO));
                if self.motion_target.is_some() || !self.pending.is_empty() {
                    self.set_motion(MotionState::Reroute, world);
                }
            }
            // Only entered transiently; the query runs on entry.
            MotionState::Reroute => self.set_motion(MotionState::Rest, world),
            MotionState::Navigate => self.navigate(world),
            MotionState::Return => self.walk_back(world),
        }
    }

    fn set_motion<W>(&mut self, to: MotionState, world: &W)
    where
        W: AgentWorld + ?Sized,
    {
        let valid = self.motion.can_transition(to);
        debug_assert!(valid, "invalid motion transition {:?} -> {:?}", self.motion, to);
        if !valid {
            tracing::error!(agent = %self.id, from = ?self.motion, to = ?to, "Invalid motion transition");
            return;
        }
        tracing::trace!(agent = %self.id, from = ?self.motion, to = ?to, "Motion transition");
        self.motion = to;
        if to == MotionState::Reroute {
            self.reroute(world);
        }
    }

    fn reroute<W>(&mut self, world: &W)
    where
        W: AgentWorld + ?Sized,
    {
        let goal = match self.motion_target {
            Some(target) => target.resolve(world),
            None => self.pending.front().copied(),
        };
        let Some(goal) = goal else {
            if self.motion_target.take().is_some() {
                tracing::debug!(agent = %self.id, "Motion target vanished");
            }
            self.set_motion(MotionState::Rest, world);
            return;
        };

        match world.navigator().find_path(self.position, goal) {
            Ok(path) => {
                if self.motion_target.is_none() {
                    self.pending.pop_front();
                }
                // The first point is our own position.
                self.route = path.points.into_iter().skip(1).collect();
                if self.route.is_empty() {
                    self.route.push(goal);
                }
                self.destination = Some(path.destination);
                self.outbox.push(AgentEvent::RouteSuccess { agent: self.id });
                self.set_motion(MotionState::Navigate, world);
            }
            Err(err) => {
                tracing::debug!(agent = %self.id, error = %err, "Route failed");
                // Only a stray start is recoverable; retry once back on the mesh.
                let retry = matches!(
                    err,
                    NavError::PointNotContained {
                        endpoint: Endpoint::Start,
                        ..
                    }
                );
                if !retry {
                    self.motion_target = None;
                }
                self.clear_route();
                self.outbox.push(AgentEvent::RouteFail { agent: self.id });
                self.set_motion(MotionState::Return, world);
            }
        }
    }

    fn route_is_valid<W>(&self, world: &W) -> bool
    where
        W: AgentWorld + ?Sized,
    {
        let Some(destination) = self.destination else {
            return false;
        };
        if self.route.is_empty() {
            return false;
        }
        match self.motion_target.map(|t| t.resolve(world)) {
            None => true,
            Some(Some(goal)) => world.navigator().region_contains(destination, goal),
            Some(None) => false,
        }
    }

    fn navigate<W>(&mut self, world: &W)
    where
        W: AgentWorld + ?Sized,
    {
        if !self.route_is_valid(world) {
            self.set_motion(MotionState::Reroute, world);
            return;
        }
        if let Some(goal) = self.motion_target.and_then(|t| t.resolve(world)) {
            if let Some(last) = self.route.last_mut() {
                *last = goal;
            }
        }

        let waypoint = self.route[0];
        let delta = waypoint - self.position;
        if delta.length() > self.config.radius {
            let dir = delta.unit();
            self.facing = dir;
            self.outbox.intent(self.id, Intent::Move(dir));
            self.outbox.intent(self.id, Intent::Look(dir));
            return;
        }

        self.route.remove(0);
        if !self.route.is_empty() {
            self.set_motion(MotionState::Navigate, world);
        } else if !self.pending.is_empty() {
            self.destination = None;
            self.set_motion(MotionState::Reroute, world);
        } else {
            // Arriving consumes the target.
            self.motion_target = None;
            self.destination = None;
            self.set_motion(MotionState::Rest, world);
            self.outbox.push(AgentEvent::RouteComplete { agent: self.id });
        }
    }

    fn walk_back<W>(&mut self, world: &W)
    where
        W: AgentWorld + ?Sized,
    {
        let navigator = world.navigator();
        if navigator.contains(self.position) {
            self.return_goal = None;
            self.set_motion(MotionState::Rest, world);
            return;
        }
        let goal = match self.return_goal {
            Some(goal) => goal,
            None => match navigator.nearest_centroid(self.position) {
                Some(goal) => {
                    self.return_goal = Some(goal);
                    goal
                }
                None => {
                    // Nothing to walk back to.
                    self.set_motion(MotionState::Rest, world);
                    return;
                }
            },
        };

        let delta = goal - self.position;
        if delta.length() <= self.config.return_step {
            self.position = goal;
        } else {
            self.position += delta.unit() * self.config.return_step;
        }
    }

    fn update_action<W>(&mut self, world: &W)
    where
        W: AgentWorld + ?Sized,
    {
        if self.action != ActionState::Attack {
            return;
        }
        let Some(target) = self.action_target.and_then(|t| t.resolve(world)) else {
            self.stop_action();
            return;
        };
        let look = target - self.position;
        if !look.is_zero() {
            self.facing = look.unit();
        }
        self.outbox.intent(self.id, Intent::Look(look));
        self.outbox.intent(self.id, Intent::Fire(true));
    }

    fn set_action(&mut self, to: ActionState) {
        let valid = self.action.can_transition(to);
        debug_assert!(valid, "invalid action transition {:?} -> {:?}", self.action, to);
        if !valid {
            tracing::error!(agent = %self.id, from = ?self.action, to = ?to, "Invalid action transition");
            return;
        }
        if self.action == ActionState::Attack {
            self.outbox.intent(self.id, Intent::Fire(false));
        }
        tracing::trace!(agent = %self.id, from = ?self.action, to = ?to, "Action transition");
        self.action = to;
    }

    fn clear_route(&mut self) {
        self.route.clear();
        self.pending.clear();
        self.destination = None;
    }
}
