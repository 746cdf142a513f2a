use lurk_core::EntityId;
use lurk_geom::Vec2;
use lurk_nav::Navigator;

/// Read-only view of the world an agent lives in.
///
/// Agents never mutate shared geometry; the owning world applies their intents after the frame.
pub trait AgentWorld {
    fn navigator(&self) -> &dyn Navigator;

    /// Live position of a tracked entity, `None` once it is gone.
    fn entity_position(&self, id: EntityId) -> Option<Vec2>;

    /// How quickly an entity raises suspicion, per second at the target frame rate.
    fn suspiciousness(&self, id: EntityId) -> f64;

    /// Unobstructed straight line between two points.
    fn line_of_sight(&self, a: Vec2, b: Vec2) -> bool;

    /// Whether `target` falls inside the visibility cone cast from `viewpoint`.
    fn can_see(&self, viewpoint: Vec2, look_angle: f64, fov: f64, range: f64, target: Vec2)
        -> bool;
}
