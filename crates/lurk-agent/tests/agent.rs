mod common;

use common::{count, run, v, TestWorld};
use lurk_agent::{ActionState, Agent, AgentConfig, MotionState, Target};
use lurk_core::{AgentEvent, EntityId, EventQueue, Intent, TickContext};

#[test]
fn motion_transition_table() {
    use MotionState::*;
    assert!(Rest.can_transition(Reroute));
    assert!(Reroute.can_transition(Navigate));
    assert!(Reroute.can_transition(Return));
    assert!(Reroute.can_transition(Rest));
    assert!(Navigate.can_transition(Navigate));
    assert!(Navigate.can_transition(Reroute));
    assert!(Navigate.can_transition(Rest));
    assert!(Return.can_transition(Rest));

    assert!(!Rest.can_transition(Navigate));
    assert!(!Rest.can_transition(Return));
    assert!(!Return.can_transition(Navigate));
    assert!(!Navigate.can_transition(Return));
}

#[test]
fn point_target_is_reached_and_agent_rests() {
    let world = TestWorld::new();
    let mut agent = Agent::new(EntityId(1), v(10.0, 10.0), AgentConfig::default());
    agent.set_target(v(90.0, 90.0));

    let events = run(&world, &mut agent, 600, 1.0, true);

    assert_eq!(agent.motion_state(), MotionState::Rest);
    assert!(agent.motion_target().is_none());
    assert!(
        agent.position().distance(v(90.0, 90.0)) <= agent.radius() + 1e-9,
        "stopped at {:?}",
        agent.position()
    );
    assert_eq!(count(&events, "route_success"), 1);
    assert_eq!(count(&events, "route_complete"), 1);
    assert_eq!(count(&events, "route_fail"), 0);
}

#[test]
fn route_never_cuts_through_the_block() {
    let world = TestWorld::new();
    let mut agent = Agent::new(EntityId(1), v(10.0, 50.0), AgentConfig::default());
    agent.set_target(v(90.0, 50.0));

    let mut queue = EventQueue::new();
    for tick in 0..600 {
        agent.frame(&TickContext::new(tick, 1.0, 1.0, 0), &world, &mut queue);
        for event in queue.drain() {
            if let Some(Intent::Move(dir)) = event.intent() {
                agent.set_position(agent.position() + dir);
            }
        }
        let p = agent.position();
        assert!(
            !(p.x > 40.0 && p.x < 60.0 && p.y > 40.0 && p.y < 60.0),
            "walked into the block at {p:?}"
        );
    }
    assert_eq!(agent.motion_state(), MotionState::Rest);
}

#[test]
fn manual_route_paths_to_each_waypoint() {
    let world = TestWorld::new();
    let mut agent = Agent::new(EntityId(2), v(10.0, 10.0), AgentConfig::default());
    agent.set_route([v(20.0, 80.0), v(80.0, 80.0)]);
    assert!(agent.motion_target().is_none());

    let events = run(&world, &mut agent, 600, 1.0, true);

    assert_eq!(agent.motion_state(), MotionState::Rest);
    assert_eq!(count(&events, "route_success"), 2);
    assert_eq!(count(&events, "route_complete"), 1);
    assert!(agent.position().distance(v(80.0, 80.0)) <= agent.radius() + 1e-9);
}

#[test]
fn start_off_mesh_fails_then_walks_back_and_retries() {
    let world = TestWorld::new();
    let mut agent = Agent::new(EntityId(3), v(50.0, 50.0), AgentConfig::default());
    agent.set_target(v(90.0, 90.0));

    let first = run(&world, &mut agent, 1, 1.0, true);
    assert_eq!(count(&first, "route_fail"), 1);
    assert_eq!(agent.motion_state(), MotionState::Return);

    let rest = run(&world, &mut agent, 800, 1.0, true);
    assert_eq!(agent.motion_state(), MotionState::Rest);
    assert_eq!(count(&rest, "route_complete"), 1);
    assert!(world.mesh.contains(agent.position()));
}

#[test]
fn goal_off_mesh_drops_the_target() {
    let world = TestWorld::new();
    let mut agent = Agent::new(EntityId(4), v(10.0, 10.0), AgentConfig::default());
    agent.set_target(v(50.0, 50.0));

    let events = run(&world, &mut agent, 10, 1.0, true);
    assert_eq!(count(&events, "route_fail"), 1);
    assert!(agent.motion_target().is_none());
    assert_eq!(agent.motion_state(), MotionState::Rest);
}

#[test]
fn stop_moving_returns_to_rest() {
    let world = TestWorld::new();
    let mut agent = Agent::new(EntityId(5), v(10.0, 10.0), AgentConfig::default());
    agent.set_target(v(90.0, 10.0));
    run(&world, &mut agent, 5, 1.0, true);
    assert!(agent.is_moving());

    agent.stop_moving();
    let events = run(&world, &mut agent, 2, 1.0, true);
    assert!(!agent.is_moving());
    assert!(agent.route().is_empty());
    assert!(events
        .iter()
        .any(|e| e.intent() == Some(Intent::Move(lurk_geom::Vec2::ZERO))));
}

#[test]
fn attack_fires_every_frame_and_stops_on_exit() {
    let world = TestWorld::new();
    let mut agent = Agent::new(EntityId(6), v(10.0, 10.0), AgentConfig::default());
    agent.attack(v(30.0, 10.0));
    assert_eq!(agent.action_state(), ActionState::Attack);

    let events = run(&world, &mut agent, 3, 1.0, false);
    assert_eq!(
        events
            .iter()
            .filter(|e| e.intent() == Some(Intent::Fire(true)))
            .count(),
        3
    );
    assert!(events
        .iter()
        .any(|e| e.intent() == Some(Intent::Look(v(20.0, 0.0)))));

    agent.stop_action();
    assert_eq!(agent.action_state(), ActionState::Idle);
    let events = run(&world, &mut agent, 1, 1.0, false);
    assert_eq!(events.first().and_then(AgentEvent::intent), Some(Intent::Fire(false)));
    assert!(!events.iter().any(|e| e.intent() == Some(Intent::Fire(true))));
}

#[test]
fn attacking_a_vanished_entity_stops_firing() {
    let mut world = TestWorld::new();
    world.put(EntityId(99), v(30.0, 10.0), 0.0);
    let mut agent = Agent::new(EntityId(7), v(10.0, 10.0), AgentConfig::default());
    agent.attack(Target::Entity(EntityId(99)));
    run(&world, &mut agent, 1, 1.0, false);

    world.entities.clear();
    let events = run(&world, &mut agent, 1, 1.0, false);
    assert_eq!(agent.action_state(), ActionState::Idle);
    assert!(events.iter().any(|e| e.intent() == Some(Intent::Fire(false))));
}

#[test]
fn following_an_entity_reroutes_when_it_changes_triangle() {
    let mut world = TestWorld::new();
    world.put(EntityId(50), v(90.0, 10.0), 0.0);
    let mut agent = Agent::new(EntityId(8), v(10.0, 10.0), AgentConfig::default());
    agent.set_target(EntityId(50));

    let events = run(&world, &mut agent, 3, 1.0, true);
    assert_eq!(count(&events, "route_success"), 1);

    world.put(EntityId(50), v(10.0, 90.0), 0.0);
    let events = run(&world, &mut agent, 400, 1.0, true);
    assert!(count(&events, "route_success") >= 1);
    assert_eq!(agent.motion_state(), MotionState::Rest);
    assert!(agent.position().distance(v(10.0, 90.0)) <= agent.radius() + 1e-9);
}
