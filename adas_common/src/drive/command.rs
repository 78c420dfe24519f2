//! Inputs and outputs of one control tick.
//!
//! Inbound: [`DriverIntent`], [`ManualControls`], [`AutopilotCommand`],
//! [`RemoteCommand`], bundled with the snapshot into [`TickInput`].
//! Outbound: [`ControlCommand`].

use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;
use thiserror::Error;

use super::sensor::SensorSnapshot;
use super::state::GearState;

/// Discrete driver intent, at most one per tick.
///
/// Decoded from the input device at the boundary; the core never sees raw
/// key codes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DriverIntent {
    /// Cycle Manual → AdaptiveCruise → Autonomous → Manual.
    ToggleMode,
    /// Change the cruise target by the given amount [km/h].
    AdjustTargetSpeed(f64),
    ManualThrottle,
    ManualBrake,
    ManualSteer,
    /// Toggle between Forward and Reverse.
    ToggleGear,
    /// Drop to Manual and clear all controller state.
    EmergencyDisable,
}

impl DriverIntent {
    /// Whether this intent claims longitudinal authority for the driver.
    #[inline]
    pub const fn is_manual_longitudinal(&self) -> bool {
        matches!(self, Self::ManualThrottle | Self::ManualBrake)
    }
}

/// Pedal and steering levels already decoded from the input device.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ManualControls {
    #[serde(default)]
    pub throttle: f64,
    #[serde(default)]
    pub brake: f64,
    /// Steering [-1, 1], negative = left.
    #[serde(default)]
    pub steer: f64,
}

/// Actuation request from the external path/behaviour collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AutopilotCommand {
    #[serde(default)]
    pub throttle: f64,
    #[serde(default)]
    pub brake: f64,
    #[serde(default)]
    pub steer: f64,
}

// ─── Remote Commands ────────────────────────────────────────────────

/// Command received from the remote message bus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RemoteCommand {
    /// Engage cruise (if needed) and set the target [km/h].
    SetTargetSpeed(f64),
    /// Engage (`true`) or disengage (`false`) cruise control.
    CruiseControl(bool),
    /// Same effect as [`DriverIntent::EmergencyDisable`].
    EmergencyStop,
}

/// Remote command payload decoding error.
#[derive(Debug, Error)]
pub enum RemoteCommandError {
    #[error("malformed command payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("invalid value for '{command}': {reason}")]
    InvalidValue {
        command: &'static str,
        reason: &'static str,
    },
}

/// Wire shape: `{"command": "<name>", "value": <any>}`.
#[derive(Debug, Deserialize)]
struct RawRemoteCommand {
    command: String,
    #[serde(default)]
    value: serde_json::Value,
}

pub const REMOTE_COMMAND_SPEED: &str = "speed";
pub const REMOTE_COMMAND_CRUISE_CONTROL: &str = "cruise_control";
pub const REMOTE_COMMAND_EMERGENCY_STOP: &str = "emergency_stop";

impl RemoteCommand {
    /// Decode a JSON bus payload.
    pub fn from_json(payload: &str) -> Result<Self, RemoteCommandError> {
        let raw: RawRemoteCommand = serde_json::from_str(payload)?;

        match raw.command.as_str() {
            REMOTE_COMMAND_SPEED => match raw.value.as_f64() {
                Some(v) if v.is_finite() && v > 0.0 => Ok(Self::SetTargetSpeed(v)),
                _ => Err(RemoteCommandError::InvalidValue {
                    command: REMOTE_COMMAND_SPEED,
                    reason: "expected a positive number",
                }),
            },
            REMOTE_COMMAND_CRUISE_CONTROL => match raw.value.as_bool() {
                Some(on) => Ok(Self::CruiseControl(on)),
                None => Err(RemoteCommandError::InvalidValue {
                    command: REMOTE_COMMAND_CRUISE_CONTROL,
                    reason: "expected a boolean",
                }),
            },
            REMOTE_COMMAND_EMERGENCY_STOP => Ok(Self::EmergencyStop),
            _ => Err(RemoteCommandError::UnknownCommand(raw.command)),
        }
    }
}

// ─── Tick Input ─────────────────────────────────────────────────────

/// Everything the loop consumes in one tick.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TickInput {
    #[serde(default)]
    pub snapshot: SensorSnapshot,
    #[serde(default)]
    pub intent: Option<DriverIntent>,
    #[serde(default)]
    pub manual: ManualControls,
    #[serde(default)]
    pub autopilot: Option<AutopilotCommand>,
    #[serde(default)]
    pub remote: Option<RemoteCommand>,
}

impl TickInput {
    pub fn new(snapshot: SensorSnapshot) -> Self {
        Self {
            snapshot,
            ..Self::default()
        }
    }

    pub fn with_intent(mut self, intent: DriverIntent) -> Self {
        self.intent = Some(intent);
        self
    }

    pub fn with_manual(mut self, manual: ManualControls) -> Self {
        self.manual = manual;
        self
    }

    pub fn with_autopilot(mut self, autopilot: AutopilotCommand) -> Self {
        self.autopilot = Some(autopilot);
        self
    }

    pub fn with_remote(mut self, remote: RemoteCommand) -> Self {
        self.remote = Some(remote);
        self
    }
}

// ─── Control Command ────────────────────────────────────────────────

/// Final actuation command for one tick.
///
/// Immutable once built. [`ControlCommand::new`] enforces:
/// - `throttle`, `brake` in `[0, 1]`, `steer_bias` in `[-1, 1]`;
/// - non-finite inputs become `0.0`;
/// - throttle and brake are never both engaged (brake wins).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlCommand {
    throttle: f64,
    brake: f64,
    steer_bias: f64,
    gear: GearState,
}

const_assert_eq!(core::mem::size_of::<ControlCommand>(), 32);

#[inline]
fn sanitize(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_finite() {
        value.clamp(lo, hi)
    } else {
        0.0
    }
}

impl ControlCommand {
    pub fn new(throttle: f64, brake: f64, steer_bias: f64, gear: GearState) -> Self {
        let brake = sanitize(brake, 0.0, 1.0);
        let throttle = if brake > 0.0 {
            0.0
        } else {
            sanitize(throttle, 0.0, 1.0)
        };
        Self {
            throttle,
            brake,
            steer_bias: sanitize(steer_bias, -1.0, 1.0),
            gear,
        }
    }

    #[inline]
    pub const fn throttle(&self) -> f64 {
        self.throttle
    }

    #[inline]
    pub const fn brake(&self) -> f64 {
        self.brake
    }

    #[inline]
    pub const fn steer_bias(&self) -> f64 {
        self.steer_bias
    }

    #[inline]
    pub const fn gear(&self) -> GearState {
        self.gear
    }
}
