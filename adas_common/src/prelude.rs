//! Prelude module for common re-exports.
//!
//! ```rust
//! use adas_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{KMH_PER_MS, MAX_LANE_PROBES, TICK_SECONDS};

// ─── Drive Types ────────────────────────────────────────────────────
pub use crate::drive::command::{
    AutopilotCommand, ControlCommand, DriverIntent, ManualControls, RemoteCommand,
    RemoteCommandError, TickInput,
};
pub use crate::drive::config::{
    AutopilotParameters, ControlParameters, CruiseParameters, EmergencyParameters,
    FollowParameters, GearParameters, PidParameters,
};
pub use crate::drive::safety::EmergencyCause;
pub use crate::drive::sensor::{EgoMotion, LaneProbe, LaneProbes, SensorSnapshot};
pub use crate::drive::state::{CollisionKind, GearState, Mode, Position, Tick, VehicleState};
pub use crate::drive::telemetry::{PublishGate, TelemetryEvent, VehicleParameters};
