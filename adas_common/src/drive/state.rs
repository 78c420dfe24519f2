//! State enums and the loop-owned vehicle state.
//!
//! Enums use `#[repr(u8)]` with `from_u8` so they can travel over compact
//! telemetry transports unchanged.

use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;

/// Monotonic control tick counter.
pub type Tick = u64;

/// Driving mode (top-level arbitration state).
///
/// Cycles `Manual → AdaptiveCruise → Autonomous → Manual` on `ToggleMode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum Mode {
    /// Driver controls throttle, brake and steering.
    #[default]
    Manual = 0,
    /// Automated longitudinal control, driver steers.
    AdaptiveCruise = 1,
    /// External autopilot supplies all channels.
    Autonomous = 2,
}

impl Mode {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Manual),
            1 => Some(Self::AdaptiveCruise),
            2 => Some(Self::Autonomous),
            _ => None,
        }
    }

    /// Next state in the `ToggleMode` cycle.
    #[inline]
    pub const fn next(self) -> Self {
        match self {
            Self::Manual => Self::AdaptiveCruise,
            Self::AdaptiveCruise => Self::Autonomous,
            Self::Autonomous => Self::Manual,
        }
    }

    /// Whether the speed and follow-distance regulators run in this mode.
    #[inline]
    pub const fn has_speed_control(self) -> bool {
        matches!(self, Self::AdaptiveCruise)
    }
}

/// Transmission direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum GearState {
    #[default]
    Forward = 0,
    Neutral = 1,
    Reverse = 2,
}

impl GearState {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Forward),
            1 => Some(Self::Neutral),
            2 => Some(Self::Reverse),
            _ => None,
        }
    }

    /// Single-letter selector label ("D", "N", "R").
    #[inline]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Forward => "D",
            Self::Neutral => "N",
            Self::Reverse => "R",
        }
    }
}

const_assert_eq!(core::mem::size_of::<Mode>(), 1);
const_assert_eq!(core::mem::size_of::<GearState>(), 1);

/// Collision partner class.
///
/// Lane-marking contacts are filtered out upstream and never reach the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CollisionKind {
    Vehicle = 0,
    Pedestrian = 1,
    StaticObstacle = 2,
}

/// World position [m].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Vehicle state owned and mutated only by the control loop.
///
/// Measured fields (`speed_kmh`, `position`, `heading_deg`) are refreshed
/// from each snapshot; `gear` and `mode` change only through the interlock
/// and the mode state machine.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VehicleState {
    /// Ground speed [km/h].
    pub speed_kmh: f64,
    pub position: Position,
    /// Heading [deg].
    pub heading_deg: f64,
    pub gear: GearState,
    pub mode: Mode,
}
