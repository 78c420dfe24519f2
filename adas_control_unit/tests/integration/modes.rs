//! Integration test: mode transitions and their entry actions.

use adas_common::drive::command::DriverIntent;
use adas_common::drive::state::Mode;
use adas_common::drive::telemetry::TelemetryEvent;
use adas_control_unit::control::pid::PidState;

use super::{at, control_loop};

#[test]
fn toggle_three_times_returns_to_manual_with_zeroed_pid() {
    let mut l = control_loop();
    l.tick(&at(35.0).with_intent(DriverIntent::ToggleMode));
    // Build PID history while cruising below target.
    l.tick(&at(35.0).with_intent(DriverIntent::AdjustTargetSpeed(10.0)));
    l.tick(&at(36.0));
    assert!(l.pid_state().integral() > 0.0);

    l.tick(&at(36.0).with_intent(DriverIntent::ToggleMode));
    assert_eq!(l.mode(), Mode::Autonomous);
    l.tick(&at(36.0).with_intent(DriverIntent::ToggleMode));
    assert_eq!(l.mode(), Mode::Manual);
    assert_eq!(*l.pid_state(), PidState::default());
    assert_eq!(l.target_speed(), None);

    let changes = l
        .sink()
        .iter()
        .filter(|e| matches!(e, TelemetryEvent::ModeChanged { .. }))
        .count();
    assert_eq!(changes, 3);
    assert_eq!(l.stats().mode_changes, 3);
}

#[test]
fn target_clamped_on_cruise_entry() {
    let mut l = control_loop();
    l.tick(&at(150.0).with_intent(DriverIntent::ToggleMode));
    assert_eq!(l.target_speed(), Some(120.0));

    let mut l = control_loop();
    l.tick(&at(64.0).with_intent(DriverIntent::ToggleMode));
    assert_eq!(l.target_speed(), Some(64.0));
}

#[test]
fn manual_brake_disengages_cruise() {
    let mut l = control_loop();
    l.tick(&at(50.0).with_intent(DriverIntent::ToggleMode));
    l.tick(&at(50.0).with_intent(DriverIntent::ManualBrake));
    assert_eq!(l.mode(), Mode::Manual);
    assert_eq!(l.target_speed(), None);
}

#[test]
fn manual_steer_keeps_cruise() {
    let mut l = control_loop();
    l.tick(&at(50.0).with_intent(DriverIntent::ToggleMode));
    l.tick(&at(50.0).with_intent(DriverIntent::ManualSteer));
    assert_eq!(l.mode(), Mode::AdaptiveCruise);
    assert_eq!(l.target_speed(), Some(50.0));
}

#[test]
fn manual_steer_in_autonomous_hands_back_to_cruise() {
    let mut l = control_loop();
    l.tick(&at(50.0).with_intent(DriverIntent::ToggleMode));
    l.tick(&at(50.0).with_intent(DriverIntent::ToggleMode));
    assert_eq!(l.mode(), Mode::Autonomous);

    l.tick(&at(48.0).with_intent(DriverIntent::ManualSteer));
    assert_eq!(l.mode(), Mode::AdaptiveCruise);
    // Target kept from the earlier cruise session.
    assert_eq!(l.target_speed(), Some(50.0));
}

#[test]
fn emergency_disable_from_autonomous() {
    let mut l = control_loop();
    l.tick(&at(20.0).with_intent(DriverIntent::ToggleMode));
    l.tick(&at(20.0).with_intent(DriverIntent::ToggleMode));
    l.tick(&at(20.0).with_intent(DriverIntent::EmergencyDisable));
    assert_eq!(l.mode(), Mode::Manual);
    assert_eq!(l.target_speed(), None);
    assert!(
        l.sink()
            .iter()
            .any(|e| matches!(e, TelemetryEvent::EmergencyDisabled))
    );
}

#[test]
fn emergency_disable_in_manual_is_harmless() {
    let mut l = control_loop();
    let cmd = l.tick(&at(0.0).with_intent(DriverIntent::EmergencyDisable));
    assert_eq!(l.mode(), Mode::Manual);
    assert_eq!(cmd.throttle(), 0.0);
    assert_eq!(cmd.brake(), 0.0);
}
