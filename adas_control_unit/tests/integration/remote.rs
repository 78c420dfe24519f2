//! Integration test: remote bus commands decoded and applied by the loop.

use adas_common::drive::command::{DriverIntent, RemoteCommand, RemoteCommandError};
use adas_common::drive::config::EmergencyParameters;
use adas_common::drive::safety::EmergencyCause;
use adas_common::drive::state::{GearState, Mode};
use adas_common::drive::telemetry::TelemetryEvent;

use super::{at, control_loop, obstacle};

fn remote(payload: &str) -> RemoteCommand {
    RemoteCommand::from_json(payload).expect("valid payload")
}

#[test]
fn set_speed_engages_cruise_with_target() {
    let mut l = control_loop();
    l.tick(&at(30.0).with_remote(remote(r#"{"command":"speed","value":55}"#)));
    assert_eq!(l.mode(), Mode::AdaptiveCruise);
    assert_eq!(l.target_speed(), Some(55.0));
    assert!(l.vehicle_parameters().cruise_control);
}

#[test]
fn set_speed_is_clamped() {
    let mut l = control_loop();
    l.tick(&at(30.0).with_remote(remote(r#"{"command":"speed","value":200}"#)));
    assert_eq!(l.target_speed(), Some(120.0));

    l.tick(&at(30.0).with_remote(remote(r#"{"command":"speed","value":5.5}"#)));
    assert_eq!(l.target_speed(), Some(20.0));
}

#[test]
fn set_speed_from_autonomous_drops_to_cruise() {
    let mut l = control_loop();
    l.tick(&at(30.0).with_intent(DriverIntent::ToggleMode));
    l.tick(&at(30.0).with_intent(DriverIntent::ToggleMode));
    assert_eq!(l.mode(), Mode::Autonomous);

    l.tick(&at(30.0).with_remote(remote(r#"{"command":"speed","value":70}"#)));
    assert_eq!(l.mode(), Mode::AdaptiveCruise);
    assert_eq!(l.target_speed(), Some(70.0));
}

#[test]
fn cruise_control_toggles() {
    let mut l = control_loop();
    l.tick(&at(42.0).with_remote(remote(r#"{"command":"cruise_control","value":true}"#)));
    assert_eq!(l.mode(), Mode::AdaptiveCruise);
    assert_eq!(l.target_speed(), Some(42.0));

    l.tick(&at(42.0).with_remote(remote(r#"{"command":"cruise_control","value":false}"#)));
    assert_eq!(l.mode(), Mode::Manual);
    assert_eq!(l.target_speed(), None);
}

#[test]
fn cruise_off_leaves_autonomous_alone() {
    let mut l = control_loop();
    l.tick(&at(30.0).with_intent(DriverIntent::ToggleMode));
    l.tick(&at(30.0).with_intent(DriverIntent::ToggleMode));
    l.tick(&at(30.0).with_remote(remote(r#"{"command":"cruise_control","value":false}"#)));
    assert_eq!(l.mode(), Mode::Autonomous);
}

#[test]
fn emergency_stop_brakes_at_full_force_over_active_latch() {
    let mut l = control_loop();
    l.tick(&at(30.0).with_intent(DriverIntent::ToggleMode));
    let first = l.tick(&obstacle(30.0, 1.0));
    assert!(first.brake() > 0.6 && first.brake() < 1.0);
    assert!(l.emergency_state().active);

    let stop = remote(r#"{"command":"emergency_stop"}"#);
    let cmd = l.tick(&obstacle(30.0, 1.0).with_remote(stop));
    assert_eq!(cmd.brake(), EmergencyParameters::default().max_force);
    assert_eq!(cmd.throttle(), 0.0);
    assert!(l.emergency_state().active);
    assert!(l.emergency_state().causes.contains(EmergencyCause::REMOTE_STOP));
    assert_eq!(l.mode(), Mode::Manual);
    assert_eq!(l.target_speed(), None);

    // Held through the cooldown even though Manual ignores proximity.
    let cmd = l.tick(&obstacle(30.0, 1.0));
    assert_eq!(cmd.brake(), 1.0);
}

#[test]
fn emergency_stop_from_clear_road() {
    let mut l = control_loop();
    l.tick(&at(2.0).with_intent(DriverIntent::ToggleGear));
    l.tick(&at(2.0).with_remote(remote(r#"{"command":"speed","value":50}"#)));
    assert_eq!(l.gear(), GearState::Reverse);

    let cmd = l.tick(&at(2.0).with_remote(remote(r#"{"command":"emergency_stop"}"#)));
    assert_eq!(cmd.brake(), 1.0);
    assert_eq!(cmd.throttle(), 0.0);
    assert_eq!(l.mode(), Mode::Manual);
    assert_eq!(l.target_speed(), None);
    // Not a terminal reset: gear stays as the driver left it.
    assert_eq!(l.gear(), GearState::Reverse);
    assert_eq!(l.stats().emergency_activations, 1);
    assert!(l.sink().iter().any(|e| matches!(
        e,
        TelemetryEvent::EmergencyBrakeActivated { causes, .. }
            if causes.contains(EmergencyCause::REMOTE_STOP)
    )));
    assert!(
        !l.sink()
            .iter()
            .any(|e| matches!(e, TelemetryEvent::EmergencyDisabled))
    );
}

#[test]
fn bad_payloads_rejected() {
    assert!(matches!(
        RemoteCommand::from_json(r#"{"command":"speed","value":-3}"#),
        Err(RemoteCommandError::InvalidValue { .. })
    ));
    assert!(matches!(
        RemoteCommand::from_json(r#"{"command":"cruise_control","value":"yes"}"#),
        Err(RemoteCommandError::InvalidValue { .. })
    ));
    assert!(matches!(
        RemoteCommand::from_json(r#"{"command":"warp"}"#),
        Err(RemoteCommandError::UnknownCommand(c)) if c == "warp"
    ));
    assert!(matches!(
        RemoteCommand::from_json("not json"),
        Err(RemoteCommandError::Malformed(_))
    ));
}
