//! Telemetry events and the remote vehicle-parameters payload.

use serde::{Deserialize, Serialize};

use super::safety::EmergencyCause;
use super::state::{GearState, Mode, Position};

/// Fire-and-forget event emitted by the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "event")]
pub enum TelemetryEvent {
    ModeChanged {
        from: Mode,
        to: Mode,
    },
    EmergencyBrakeActivated {
        causes: EmergencyCause,
        force: f64,
        obstacle_distance_m: Option<f64>,
    },
    /// Latch released, either by cooldown expiry or driver throttle.
    EmergencyBrakeReleased {
        by_driver: bool,
    },
    ObstacleWarning {
        distance_m: f64,
    },
    GearChanged {
        from: GearState,
        to: GearState,
    },
    GearToggleRejected {
        reason: &'static str,
    },
    TargetSpeedChanged {
        target_kmh: f64,
    },
    PidDiagnostics {
        error: f64,
        integral: f64,
        output: f64,
    },
    /// Driver or remote emergency disable; all controller state cleared.
    EmergencyDisabled,
}

impl TelemetryEvent {
    /// Short stable name for log lines and counters.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ModeChanged { .. } => "mode_changed",
            Self::EmergencyBrakeActivated { .. } => "emergency_brake_activated",
            Self::EmergencyBrakeReleased { .. } => "emergency_brake_released",
            Self::ObstacleWarning { .. } => "obstacle_warning",
            Self::GearChanged { .. } => "gear_changed",
            Self::GearToggleRejected { .. } => "gear_toggle_rejected",
            Self::TargetSpeedChanged { .. } => "target_speed_changed",
            Self::PidDiagnostics { .. } => "pid_diagnostics",
            Self::EmergencyDisabled => "emergency_disabled",
        }
    }
}

// ─── Vehicle Parameters Payload ─────────────────────────────────────

/// Unit string carried in [`VehicleParameters::speed_unit`].
pub const SPEED_UNIT_KMH: &str = "km/h";

/// Periodic status payload for the remote bus.
///
/// Field names match the bus schema consumed by the remote dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleParameters {
    #[serde(rename = "Speed")]
    pub speed: f64,
    #[serde(rename = "SpeedUnit")]
    pub speed_unit: String,
    #[serde(rename = "Gear")]
    pub gear: String,
    #[serde(rename = "CruiseControl")]
    pub cruise_control: bool,
    #[serde(rename = "TargetSpeed")]
    pub target_speed: Option<f64>,
    #[serde(rename = "Mode")]
    pub mode: Mode,
    #[serde(rename = "Location")]
    pub location: Position,
    #[serde(rename = "Heading")]
    pub heading: f64,
    /// Milliseconds since the start of the drive session.
    #[serde(rename = "Timestamp")]
    pub timestamp_ms: u64,
}

/// Decides when a fresh [`VehicleParameters`] payload is worth sending.
///
/// Publishes when the speed moved more than `speed_delta_kmh`, the cruise
/// state flipped, or `max_interval_ms` elapsed since the last publish.
#[derive(Debug, Clone, Copy)]
pub struct PublishGate {
    speed_delta_kmh: f64,
    max_interval_ms: u64,
    last: Option<(f64, bool, u64)>,
}

impl Default for PublishGate {
    fn default() -> Self {
        Self::new(0.5, 5_000)
    }
}

impl PublishGate {
    pub const fn new(speed_delta_kmh: f64, max_interval_ms: u64) -> Self {
        Self {
            speed_delta_kmh,
            max_interval_ms,
            last: None,
        }
    }

    /// Returns true (and records the sample) if the payload should go out.
    pub fn should_publish(&mut self, params: &VehicleParameters) -> bool {
        let publish = match self.last {
            None => true,
            Some((speed, cruise, at_ms)) => {
                (params.speed - speed).abs() > self.speed_delta_kmh
                    || params.cruise_control != cruise
                    || params.timestamp_ms.saturating_sub(at_ms) >= self.max_interval_ms
            }
        };
        if publish {
            self.last = Some((params.speed, params.cruise_control, params.timestamp_ms));
        }
        publish
    }
}
