//! Gear safety interlock.
//!
//! Direction changes only at low speed and never while the autopilot has
//! authority. Reverse caps throttle.

use adas_common::drive::config::GearParameters;
use adas_common::drive::state::{GearState, Mode};

/// Result of a gear toggle attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GearTransition {
    /// Toggle accepted.
    Ok { from: GearState, to: GearState },
    /// Toggle rejected; gear unchanged.
    Rejected(&'static str),
}

pub const REJECT_AUTONOMOUS: &str = "gear toggle not allowed in Autonomous mode";
pub const REJECT_SPEED: &str = "speed above reverse engagement limit";

/// Gear interlock holding the current direction.
#[derive(Debug, Clone)]
pub struct GearSafetyInterlock {
    gear: GearState,
    reverse_max_speed: f64,
    max_reverse_throttle: f64,
}

impl GearSafetyInterlock {
    pub fn new(params: &GearParameters) -> Self {
        Self {
            gear: GearState::Forward,
            reverse_max_speed: params.reverse_max_speed,
            max_reverse_throttle: params.max_reverse_throttle,
        }
    }

    #[inline]
    pub const fn gear(&self) -> GearState {
        self.gear
    }

    /// Toggle Forward ↔ Reverse (Neutral goes to Forward).
    pub fn toggle(&mut self, speed_kmh: f64, mode: Mode) -> GearTransition {
        if mode == Mode::Autonomous {
            return GearTransition::Rejected(REJECT_AUTONOMOUS);
        }
        if speed_kmh.is_nan() || speed_kmh.abs() > self.reverse_max_speed {
            return GearTransition::Rejected(REJECT_SPEED);
        }

        let from = self.gear;
        let to = match from {
            GearState::Forward => GearState::Reverse,
            GearState::Reverse | GearState::Neutral => GearState::Forward,
        };
        self.gear = to;
        GearTransition::Ok { from, to }
    }

    /// Apply the reverse throttle cap.
    #[inline]
    pub fn clamp_throttle(&self, throttle: f64) -> f64 {
        match self.gear {
            GearState::Reverse => throttle.min(self.max_reverse_throttle),
            GearState::Forward | GearState::Neutral => throttle,
        }
    }

    /// Back to Forward (emergency disable only).
    #[inline]
    pub fn reset(&mut self) {
        self.gear = GearState::Forward;
    }
}
