use lurk_agent::{AgentConfig, Detection, GuardConfig, GuardMode};

#[test]
fn defaults_carry_the_tuned_constants() {
    let guard = GuardConfig::default();
    assert_eq!(guard.mode, GuardMode::Wait);
    assert_eq!(guard.wander_range, 64.0);
    assert_eq!(guard.suspect_range, 110.0);
    assert_eq!(guard.target_range, 90.0);
    assert_eq!(guard.wander_interval, 20.0..120.0);
    assert_eq!(guard.detection, Detection::Proximity);
    assert_eq!(AgentConfig::default().return_step, 2.0);
}

#[cfg(feature = "serde")]
#[test]
fn guard_config_loads_partial_yaml() {
    let yaml = "mode: patrol\npatrol_route:\n  - { x: 1.0, y: 2.0 }\ndetection:\n  kind: field_of_view\n  fov: 1.2\n";
    let config: GuardConfig = serde_yaml::from_str(yaml).expect("parse guard config");
    assert_eq!(config.mode, GuardMode::Patrol);
    assert_eq!(config.patrol_route.len(), 1);
    assert_eq!(config.detection, Detection::FieldOfView { fov: 1.2 });
    assert_eq!(config.suspect_range, 110.0);
}
