use lurk_core::{AgentEvent, DeterministicRng, EntityId, EventQueue, TickContext};
use lurk_geom::Vec2;

use crate::{AgentWorld, Detection, GuardConfig, GuardMode};

/// RNG stream used for wander decisions.
const WANDER_STREAM: u64 = 0x5741_4e44;

/// What the guard wants its agent to do this frame.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Decision {
    Nothing,
    Hold,
    Attack(EntityId),
    Pursue(Vec2),
    Wander(Vec2),
    Patrol(Vec<Vec2>),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GuardStep {
    pub disengaged: bool,
    pub decision: Decision,
}

/// Suspicion and engagement state of a guard.
///
/// Suspicion rises while the target is detected, decays otherwise, and always stays in `[0, 1]`.
/// Reaching 1 engages; an engaged guard keeps suspicion pinned at 1 while the target stays within
/// `suspect_range` and disengages once it drops below `disengage_threshold`.
#[derive(Debug, Clone, PartialEq)]
pub struct Guard {
    config: GuardConfig,
    target: Option<EntityId>,
    home: Vec2,
    patrol_reversed: bool,
    engaged: bool,
    timer: f64,
    suspicion: f64,
}

impl Guard {
    pub fn new(config: GuardConfig, home: Vec2) -> Self {
        Self {
            config,
            target: None,
            home,
            patrol_reversed: false,
            engaged: false,
            timer: 0.0,
            suspicion: 0.0,
        }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn mode(&self) -> GuardMode {
        self.config.mode
    }

    pub fn set_mode(&mut self, mode: GuardMode) {
        self.config.mode = mode;
    }

    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    /// Entity this guard watches for.
    pub fn set_target(&mut self, target: Option<EntityId>) {
        self.target = target;
    }

    pub fn suspicion(&self) -> f64 {
        self.suspicion
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    /// Spawn point; wander destinations are chosen around it.
    pub fn home(&self) -> Vec2 {
        self.home
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn think<W>(
        &mut self,
        ctx: &TickContext,
        world: &W,
        me: EntityId,
        position: Vec2,
        facing: Vec2,
        moving: bool,
        events: &mut EventQueue,
    ) -> GuardStep
    where
        W: AgentWorld + ?Sized,
    {
        self.timer = (self.timer - ctx.ticks).max(0.0);

        let target = self
            .target
            .and_then(|id| world.entity_position(id).map(|p| (id, p)));
        let disengaged = self.update_suspicion(ctx, world, me, position, facing, target, events);

        let decision = match target {
            Some((id, at)) if self.engaged => self.engage(world, position, moving, id, at),
            _ => self.idle(ctx, world, me, moving),
        };
        GuardStep {
            disengaged,
            decision,
        }
    }

    /// Returns `true` when this update ended an engagement.
    #[allow(clippy::too_many_arguments)]
    fn update_suspicion<W>(
        &mut self,
        ctx: &TickContext,
        world: &W,
        me: EntityId,
        position: Vec2,
        facing: Vec2,
        target: Option<(EntityId, Vec2)>,
        events: &mut EventQueue,
    ) -> bool
    where
        W: AgentWorld + ?Sized,
    {
        let fps = self.config.target_fps.max(f64::EPSILON);
        let in_range = target
            .is_some_and(|(_, at)| at.distance(position) < self.config.suspect_range);

        if in_range && self.engaged {
            self.suspicion = 1.0;
        } else {
            let detected = match (target, self.config.detection) {
                (Some(_), Detection::Proximity) => in_range,
                (Some((_, at)), Detection::FieldOfView { fov }) => {
                    in_range
                        && world.can_see(
                            position,
                            facing.angle(),
                            fov,
                            self.config.suspect_range,
                            at,
                        )
                }
                (None, _) => false,
            };
            let delta = match target {
                Some((id, _)) if detected => {
                    let rate = world.suspiciousness(id);
                    let rate = if rate.is_finite() { rate } else { 0.0 };
                    rate * ctx.ticks / fps
                }
                _ => -self.config.decay_rate * ctx.ticks / fps,
            };
            if delta.is_finite() {
                self.suspicion += delta;
            }
        }
        self.suspicion = self.suspicion.clamp(0.0, 1.0);

        if !self.engaged && self.suspicion >= 1.0 {
            if let Some((id, _)) = target {
                self.engaged = true;
                tracing::debug!(guard = %me, target = %id, "Guard engaged");
                events.push(AgentEvent::Engaged {
                    agent: me,
                    target: id,
                });
            }
        }
        if self.engaged && self.suspicion < self.config.disengage_threshold {
            self.engaged = false;
            tracing::debug!(guard = %me, "Guard disengaged");
            events.push(AgentEvent::Disengaged { agent: me });
            return true;
        }
        false
    }

    fn engage<W>(&self, world: &W, position: Vec2, moving: bool, id: EntityId, at: Vec2) -> Decision
    where
        W: AgentWorld + ?Sized,
    {
        if at.distance(position) < self.config.target_range && world.line_of_sight(position, at) {
            Decision::Attack(id)
        } else if !moving {
            Decision::Pursue(at)
        } else {
            Decision::Nothing
        }
    }

    fn idle<W>(&mut self, ctx: &TickContext, world: &W, me: EntityId, moving: bool) -> Decision
    where
        W: AgentWorld + ?Sized,
    {
        match self.config.mode {
            GuardMode::Wait => Decision::Hold,
            GuardMode::Wander => {
                if moving || self.timer > 0.0 {
                    return Decision::Nothing;
                }
                let mut rng = ctx.rng_for_agent(me, WANDER_STREAM ^ ctx.tick);
                let interval = &self.config.wander_interval;
                self.timer = rng.next_range(interval.start, interval.end).floor();

                let points = world
                    .navigator()
                    .centroids_within(self.home, self.config.wander_range);
                match rng.next_index(points.len()) {
                    Some(i) => Decision::Wander(points[i]),
                    None => Decision::Nothing,
                }
            }
            GuardMode::Patrol => {
                if moving || self.config.patrol_route.is_empty() {
                    return Decision::Nothing;
                }
                let mut route = self.config.patrol_route.clone();
                if self.patrol_reversed {
                    route.reverse();
                }
                self.patrol_reversed = !self.patrol_reversed;
                Decision::Patrol(route)
            }
        }
    }
}
