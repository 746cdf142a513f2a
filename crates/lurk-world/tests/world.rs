use lurk_agent::{Agent, AgentConfig, MotionState};
use lurk_core::{AgentEvent, EntityId};
use lurk_geom::{Polygon, Vec2};
use lurk_sight::CastRequest;
use lurk_world::{Obstacle, World, WorldConfig};

fn v(x: f64, y: f64) -> Vec2 {
    Vec2::new(x, y)
}

fn block_world() -> World {
    let mut world = World::new(
        WorldConfig::default(),
        Polygon::rect(v(0.0, 0.0), v(100.0, 100.0)),
    );
    world.add_obstacle(Obstacle::new(
        Polygon::rect(v(0.0, 0.0), v(20.0, 20.0)),
        v(40.0, 40.0),
    ));
    world
}

fn count(events: &[AgentEvent], kind: &str) -> usize {
    events.iter().filter(|e| e.kind() == kind).count()
}

#[test]
fn first_frame_builds_every_geometry_layer() {
    let mut world = block_world();
    assert!(world.is_dirty());
    assert_eq!(world.navmesh().triangle_count(), 0);

    world.frame(1.0, 1.0);

    assert!(!world.is_dirty());
    // Four obstacle edges plus four bounds edges.
    assert_eq!(world.index().len(), 8);
    assert_eq!(world.caster().segment_count(), 4);
    assert_eq!(world.caster().point_count(), 4);
    assert!(world.navmesh().triangle_count() > 0);
    assert!(!world.navmesh().contains(v(50.0, 50.0)));
    assert!(world.navmesh().contains(v(10.0, 10.0)));
}

#[test]
fn failed_navmesh_rebuild_is_retried_next_frame() {
    let mut world = block_world();
    world.frame(1.0, 1.0);
    let triangles = world.navmesh().triangle_count();
    assert!(!world.is_dirty());

    // Too far out for the fixed-precision clipper, but cheap for the index and caster.
    let far = world.add_obstacle(Polygon::new(vec![
        v(2.0e10, 0.0),
        v(2.0e10 + 10.0, 0.0),
        v(2.0e10, 10.0),
    ]));
    assert!(world.rebuild_geometry().is_err());
    assert!(world.is_dirty());
    assert_eq!(world.caster().segment_count(), 7);
    assert_eq!(world.navmesh().triangle_count(), triangles);
    assert!(!world.navmesh().contains(v(50.0, 50.0)));

    world.frame(1.0, 1.0);
    assert!(world.is_dirty(), "still failing, still pending");

    world.remove_obstacle(far);
    world.frame(1.0, 1.0);
    assert!(!world.is_dirty());
    assert_eq!(world.index().len(), 8);
    assert_eq!(world.navmesh().triangle_count(), triangles);
}

#[test]
fn removing_an_obstacle_reopens_the_floor() {
    let mut world = World::new(
        WorldConfig::default(),
        Polygon::rect(v(0.0, 0.0), v(100.0, 100.0)),
    );
    let id = world.add_obstacle(Polygon::rect(v(40.0, 40.0), v(60.0, 60.0)));
    world.rebuild_geometry().expect("rebuild");
    assert!(!world.navmesh().contains(v(50.0, 50.0)));

    let removed = world.remove_obstacle(id).expect("obstacle existed");
    assert_eq!(removed.position, Vec2::ZERO);
    assert!(world.remove_obstacle(id).is_none());
    world.frame(1.0, 1.0);
    assert!(world.navmesh().contains(v(50.0, 50.0)));
    assert_eq!(world.caster().segment_count(), 0);
}

#[test]
fn line_of_sight_and_raycast_see_obstacles() {
    let mut world = block_world();
    world.rebuild_geometry().expect("rebuild");

    assert!(!world.line_of_sight(v(10.0, 50.0), v(90.0, 50.0)));
    assert!(world.line_of_sight(v(10.0, 10.0), v(90.0, 10.0)));

    let hit = world
        .raycast(v(10.0, 50.0), v(1.0, 0.0), 200.0)
        .expect("hits the block");
    assert!(hit.approx_eq(v(40.0, 50.0), 1e-9));
    let wall = world
        .raycast(v(10.0, 10.0), v(1.0, 0.0), 200.0)
        .expect("hits the bounds");
    assert!(wall.approx_eq(v(100.0, 10.0), 1e-9));
    assert!(world.raycast(v(10.0, 50.0), v(1.0, 0.0), 20.0).is_none());
}

#[test]
fn cast_is_blocked_by_the_block() {
    let mut world = block_world();
    world.rebuild_geometry().expect("rebuild");
    let result = world.cast(&CastRequest::new(v(10.0, 50.0), world.bounds().clone()));
    assert!(result.sees(v(30.0, 50.0)));
    assert!(!result.sees(v(80.0, 50.0)));
    assert!(result.sees(v(80.0, 5.0)));
}

#[test]
fn agents_walk_around_obstacles_to_their_targets() {
    let mut world = block_world();
    let mut agent = Agent::new(EntityId(1), v(10.0, 50.0), AgentConfig::default());
    agent.set_target(v(90.0, 50.0));
    world.add_agent(agent);

    let mut events = Vec::new();
    for _ in 0..400 {
        events.extend(world.frame(1.0, 1.0));
    }

    let agent = world.agent(EntityId(1)).expect("agent");
    assert_eq!(agent.motion_state(), MotionState::Rest);
    assert!(agent.position().distance(v(90.0, 50.0)) <= agent.radius() + 1e-9);
    assert_eq!(count(&events, "route_complete"), 1);
    assert_eq!(world.tick(), 400);
}

#[test]
fn agents_update_in_id_order() {
    let mut world = block_world();
    world.add_agent(Agent::new(EntityId(9), v(10.0, 10.0), AgentConfig::default()));
    world.add_agent(Agent::new(EntityId(2), v(20.0, 10.0), AgentConfig::default()));
    world.add_agent(Agent::new(EntityId(5), v(30.0, 10.0), AgentConfig::default()));

    let ids: Vec<_> = world.agents().iter().map(Agent::id).collect();
    assert_eq!(ids, vec![EntityId(2), EntityId(5), EntityId(9)]);

    let order: Vec<_> = world.frame(1.0, 1.0).iter().map(AgentEvent::agent).collect();
    assert_eq!(order, ids);
}

#[test]
fn entities_move_and_vanish() {
    let mut world = block_world();
    world.add_entity(EntityId(100), v(5.0, 5.0), 1.0);
    assert!(world.set_entity(EntityId(100), v(6.0, 6.0)));
    assert!(!world.set_entity(EntityId(101), v(6.0, 6.0)));
    assert_eq!(world.entity(EntityId(100)).map(|e| e.position), Some(v(6.0, 6.0)));
    assert!(world.remove_entity(EntityId(100)).is_some());
    assert!(world.entity(EntityId(100)).is_none());
}
