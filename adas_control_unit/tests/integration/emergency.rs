//! Integration test: emergency brake latch through the full loop.
//!
//! 1. Trigger → force held for the cooldown window → release
//! 2. Driver throttle releases the latch early
//! 3. Lane probes and collisions trigger in any mode
//! 4. Emergency disable clears an active latch but not same-tick hazards

use adas_common::drive::command::{AutopilotCommand, DriverIntent, ManualControls, TickInput};
use adas_common::drive::config::EmergencyParameters;
use adas_common::drive::safety::EmergencyCause;
use adas_common::drive::sensor::{LaneProbe, SensorSnapshot};
use adas_common::drive::state::{CollisionKind, Mode};
use adas_common::drive::telemetry::TelemetryEvent;
use adas_control_unit::safety::emergency::EmergencyBrakeMonitor;

use super::{at, control_loop, obstacle};

fn cooldown_ticks() -> u64 {
    EmergencyBrakeMonitor::new(&EmergencyParameters::default(), 0.05).cooldown_ticks()
}

#[test]
fn latch_holds_then_releases() {
    let mut l = control_loop();
    l.tick(&at(20.0).with_intent(DriverIntent::ToggleMode));

    let first = l.tick(&obstacle(20.0, 1.0));
    let held = first.brake();
    assert!(held > 0.6 && held <= 1.0);

    for i in 1..cooldown_ticks() {
        let cmd = l.tick(&at(20.0));
        assert_eq!(cmd.brake(), held, "tick {i} after trigger");
        assert_eq!(cmd.throttle(), 0.0);
    }

    let cmd = l.tick(&at(20.0));
    assert!(cmd.brake() < held);
    assert!(!l.emergency_state().active);
    assert!(l.sink().iter().any(|e| matches!(
        e,
        TelemetryEvent::EmergencyBrakeReleased { by_driver: false }
    )));
    assert_eq!(l.stats().emergency_ticks, cooldown_ticks());
}

#[test]
fn driver_throttle_releases_latch() {
    let mut l = control_loop();
    l.tick(&at(20.0).with_intent(DriverIntent::ToggleMode));
    l.tick(&obstacle(20.0, 1.0));
    assert!(l.emergency_state().active);

    let cmd = l.tick(
        &at(20.0)
            .with_intent(DriverIntent::ManualThrottle)
            .with_manual(ManualControls {
                throttle: 0.5,
                ..ManualControls::default()
            }),
    );
    assert_eq!(cmd.throttle(), 0.5);
    assert_eq!(cmd.brake(), 0.0);
    assert!(!l.emergency_state().active);
    assert_eq!(l.mode(), Mode::AdaptiveCruise);
    assert!(l.sink().iter().any(|e| matches!(
        e,
        TelemetryEvent::EmergencyBrakeReleased { by_driver: true }
    )));
}

#[test]
fn driver_throttle_cannot_override_fresh_trigger() {
    let mut l = control_loop();
    l.tick(&at(20.0).with_intent(DriverIntent::ToggleMode));
    l.tick(&obstacle(20.0, 1.0));
    let cmd = l.tick(
        &obstacle(20.0, 1.0)
            .with_intent(DriverIntent::ManualThrottle)
            .with_manual(ManualControls {
                throttle: 1.0,
                ..ManualControls::default()
            }),
    );
    assert_eq!(cmd.throttle(), 0.0);
    assert!(cmd.brake() > 0.6);
}

#[test]
fn collapsing_lane_ahead_triggers() {
    let mut l = control_loop();
    l.tick(&at(50.0).with_intent(DriverIntent::ToggleMode));

    let snapshot = SensorSnapshot::at_speed(50.0)
        .with_probe(LaneProbe::drivable(3.0, 3.5))
        .with_probe(LaneProbe::drivable(6.0, 3.4))
        .with_probe(LaneProbe::drivable(10.0, 2.6))
        .with_probe(LaneProbe::off_road(15.0));
    let cmd = l.tick(&TickInput::new(snapshot));
    assert_eq!(cmd.brake(), 1.0);
    assert!(l
        .emergency_state()
        .causes
        .contains(EmergencyCause::LOOKAHEAD_BOUNDARY));
}

#[test]
fn wide_lane_ahead_is_quiet() {
    let mut l = control_loop();
    let snapshot = SensorSnapshot::at_speed(50.0)
        .with_probe(LaneProbe::drivable(3.0, 3.5))
        .with_probe(LaneProbe::drivable(15.0, 3.2));
    l.tick(&TickInput::new(snapshot));
    assert!(!l.emergency_state().active);
}

#[test]
fn collision_overrides_autopilot() {
    let mut l = control_loop();
    l.tick(&at(30.0).with_intent(DriverIntent::ToggleMode));
    l.tick(&at(30.0).with_intent(DriverIntent::ToggleMode));

    let mut input = at(30.0).with_autopilot(AutopilotCommand {
        throttle: 0.7,
        brake: 0.0,
        steer: 0.1,
    });
    input.snapshot.collision_event = Some(CollisionKind::Vehicle);
    let cmd = l.tick(&input);
    assert_eq!(cmd.throttle(), 0.0);
    assert_eq!(cmd.brake(), 1.0);
    // Steering still follows the autopilot.
    assert_eq!(cmd.steer_bias(), 0.1);
}

#[test]
fn emergency_disable_clears_latch_immediately() {
    let mut l = control_loop();
    let mut input = at(30.0);
    input.snapshot.boundary_violation = true;
    l.tick(&input);
    assert!(l.emergency_state().active);

    let cmd = l.tick(&at(30.0).with_intent(DriverIntent::EmergencyDisable));
    assert_eq!(cmd.brake(), 0.0);
    assert!(!l.emergency_state().active);

    // The latch does not come back on the following clear tick.
    let cmd = l.tick(&at(30.0));
    assert_eq!(cmd.brake(), 0.0);
}

#[test]
fn emergency_disable_still_brakes_for_same_tick_hazards() {
    let mut l = control_loop();
    l.tick(&at(30.0).with_intent(DriverIntent::ToggleMode));

    let mut input = at(30.0).with_intent(DriverIntent::EmergencyDisable);
    input.snapshot.collision_event = Some(CollisionKind::Pedestrian);
    input.snapshot.boundary_violation = true;
    let cmd = l.tick(&input);

    assert_eq!(l.mode(), Mode::Manual);
    assert_eq!(l.target_speed(), None);
    assert_eq!(cmd.brake(), 1.0);
    assert_eq!(cmd.throttle(), 0.0);
    assert!(l.emergency_state().active);
    assert!(l
        .emergency_state()
        .causes
        .contains(EmergencyCause::COLLISION | EmergencyCause::BOUNDARY_VIOLATION));
}
