//! Property tests over arbitrary tick inputs.

use adas_common::drive::command::{AutopilotCommand, DriverIntent, ManualControls, TickInput};
use adas_common::drive::config::{EmergencyParameters, FollowParameters, GearParameters};
use adas_common::drive::sensor::SensorSnapshot;
use adas_common::drive::state::{GearState, Mode};
use adas_control_unit::control::follow::FollowDistanceRegulator;
use adas_control_unit::safety::emergency::EmergencyBrakeMonitor;
use adas_control_unit::state::gear::{GearSafetyInterlock, GearTransition};
use proptest::prelude::*;

use super::control_loop;

/// Any f64 including NaN and infinities, biased toward the useful range.
fn level() -> impl Strategy<Value = f64> {
    prop_oneof![
        8 => -2.0..2.0f64,
        1 => Just(f64::NAN),
        1 => Just(f64::INFINITY),
        1 => Just(f64::NEG_INFINITY),
    ]
}

fn intent() -> impl Strategy<Value = Option<DriverIntent>> {
    prop_oneof![
        4 => Just(None),
        1 => Just(Some(DriverIntent::ToggleMode)),
        1 => (-10.0..10.0f64).prop_map(|d| Some(DriverIntent::AdjustTargetSpeed(d))),
        1 => Just(Some(DriverIntent::ManualThrottle)),
        1 => Just(Some(DriverIntent::ManualBrake)),
        1 => Just(Some(DriverIntent::ManualSteer)),
        1 => Just(Some(DriverIntent::ToggleGear)),
        1 => Just(Some(DriverIntent::EmergencyDisable)),
    ]
}

prop_compose! {
    fn tick_input()(
        speed in prop_oneof![9 => 0.0..150.0f64, 1 => Just(f64::NAN)],
        obstacle in prop::option::of(prop_oneof![9 => 0.0..40.0f64, 1 => level()]),
        boundary in prop::bool::weighted(0.05),
        intent in intent(),
        pedals in (level(), level(), level()),
        autopilot in prop::option::of((level(), level(), level())),
    ) -> TickInput {
        let mut snapshot = SensorSnapshot::at_speed(speed);
        snapshot.obstacle_distance_m = obstacle;
        snapshot.boundary_violation = boundary;
        TickInput {
            snapshot,
            intent,
            manual: ManualControls { throttle: pedals.0, brake: pedals.1, steer: pedals.2 },
            autopilot: autopilot.map(|(throttle, brake, steer)| AutopilotCommand { throttle, brake, steer }),
            remote: None,
        }
    }
}

proptest! {
    #[test]
    fn command_bounded_and_exclusive(inputs in prop::collection::vec(tick_input(), 1..60)) {
        let mut l = control_loop();
        for input in &inputs {
            let cmd = l.tick(input);
            prop_assert!((0.0..=1.0).contains(&cmd.throttle()));
            prop_assert!((0.0..=1.0).contains(&cmd.brake()));
            prop_assert!((-1.0..=1.0).contains(&cmd.steer_bias()));
            prop_assert!(cmd.throttle() == 0.0 || cmd.brake() == 0.0);
            if cmd.gear() == GearState::Reverse {
                prop_assert!(cmd.throttle() <= 0.4);
            }
            if input.snapshot.boundary_violation {
                prop_assert_eq!(cmd.brake(), 1.0);
            }
        }
    }

    #[test]
    fn follow_ceiling_monotone(a in 0.0..30.0f64, b in 0.0..30.0f64, target in 20.0..120.0f64) {
        let f = FollowDistanceRegulator::new(&FollowParameters::default());
        let (near, far) = if a <= b { (a, b) } else { (b, a) };
        let c_near = f.speed_ceiling(Some(near), target);
        let c_far = f.speed_ceiling(Some(far), target);
        prop_assert!(c_near <= c_far + 1e-9);
        prop_assert!(c_far <= target);
        prop_assert!(c_near >= 0.0);
    }

    #[test]
    fn emergency_force_non_increasing_in_distance(
        a in 0.0..10.0f64,
        b in 0.0..10.0f64,
        speed in 0.0..130.0f64,
    ) {
        let params = EmergencyParameters::default();
        let (near, far) = if a <= b { (a, b) } else { (b, a) };
        let force_at = |d: f64| {
            let mut m = EmergencyBrakeMonitor::new(&params, 0.05);
            let s = SensorSnapshot::at_speed(speed).with_obstacle(d);
            m.evaluate(&s, Mode::AdaptiveCruise, 0, false).force
        };
        match (force_at(near), force_at(far)) {
            (Some(fn_), Some(ff)) => prop_assert!(fn_ + 1e-12 >= ff),
            (None, Some(_)) => prop_assert!(false, "far obstacle braked, near did not"),
            _ => {}
        }
        if far >= params.max_distance {
            prop_assert!(force_at(far).is_none());
        }
    }

    #[test]
    fn gear_toggle_rejected_above_limit(speed in 5.0001..200.0f64, negative in any::<bool>()) {
        let mut g = GearSafetyInterlock::new(&GearParameters::default());
        let speed = if negative { -speed } else { speed };
        let t = g.toggle(speed, Mode::Manual);
        prop_assert!(matches!(t, GearTransition::Rejected(_)));
        prop_assert_eq!(g.gear(), GearState::Forward);
    }
}
