use lurk_core::{AgentEvent, EntityId, EventQueue, Intent};
use lurk_geom::Vec2;

#[test]
fn drain_preserves_emission_order() {
    let mut queue = EventQueue::new();
    queue.intent(EntityId(1), Intent::Move(Vec2::new(1.0, 0.0)));
    queue.push(AgentEvent::RouteComplete { agent: EntityId(1) });
    queue.intent(EntityId(2), Intent::Fire(false));

    let events = queue.drain();
    assert!(queue.is_empty());
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].kind(), "move");
    assert_eq!(events[1].kind(), "route_complete");
    assert_eq!(events[2].intent(), Some(Intent::Fire(false)));
    assert_eq!(events[2].agent(), EntityId(2));
}

#[cfg(feature = "serde")]
#[test]
fn events_serialize_with_type_tag() {
    let event = AgentEvent::Engaged {
        agent: EntityId(3),
        target: EntityId(9),
    };
    let json = serde_json::to_value(event).expect("serialize");
    assert_eq!(json["type"], "engaged");
    let back: AgentEvent = serde_json::from_value(json).expect("deserialize");
    assert_eq!(back, event);
}
