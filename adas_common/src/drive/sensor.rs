//! Per-tick sensor snapshot produced by the perception collaborator.
//!
//! Read-only to the control core. Missing readings are expressed with
//! `Option`, never with sentinel values.

use heapless::Vec;
use serde::{Deserialize, Serialize};

use super::state::{CollisionKind, Position};
use crate::consts::MAX_LANE_PROBES;

/// Measured ego kinematics.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EgoMotion {
    /// Ground speed [km/h].
    #[serde(default)]
    pub speed_kmh: f64,
    #[serde(default)]
    pub position: Position,
    /// Heading [deg].
    #[serde(default)]
    pub heading_deg: f64,
}

/// Forward lane sample at one lookahead distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneProbe {
    /// Distance ahead of the vehicle [m].
    pub distance_m: f64,
    /// Whether the projected point lies on a drivable lane.
    #[serde(default = "default_drivable")]
    pub drivable: bool,
    /// Lane width at the projected point [m], if a lane was found.
    #[serde(default)]
    pub lane_width_m: Option<f64>,
}

fn default_drivable() -> bool {
    true
}

impl LaneProbe {
    /// A drivable probe with the given lane width.
    pub const fn drivable(distance_m: f64, lane_width_m: f64) -> Self {
        Self {
            distance_m,
            drivable: true,
            lane_width_m: Some(lane_width_m),
        }
    }

    /// A probe whose projected point left the road.
    pub const fn off_road(distance_m: f64) -> Self {
        Self {
            distance_m,
            drivable: false,
            lane_width_m: None,
        }
    }
}

/// Forward lane probes, at most [`MAX_LANE_PROBES`].
pub type LaneProbes = Vec<LaneProbe, MAX_LANE_PROBES>;

/// One tick of environment and ego measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    #[serde(default)]
    pub ego: EgoMotion,
    /// Closest obstacle ahead [m]; `None` when nothing is within range.
    #[serde(default)]
    pub obstacle_distance_m: Option<f64>,
    /// Lateral offset from lane centre [m].
    #[serde(default)]
    pub lane_offset_m: f64,
    /// Width of the current lane [m].
    #[serde(default = "default_lane_width")]
    pub lane_width_m: f64,
    /// Off drivable lane type, or projected path leaves the road.
    #[serde(default)]
    pub boundary_violation: bool,
    #[serde(default)]
    pub collision_event: Option<CollisionKind>,
    #[serde(default)]
    pub lane_probes: LaneProbes,
}

/// Typical urban lane width [m].
fn default_lane_width() -> f64 {
    3.5
}

impl Default for SensorSnapshot {
    fn default() -> Self {
        Self {
            ego: EgoMotion::default(),
            obstacle_distance_m: None,
            lane_offset_m: 0.0,
            lane_width_m: default_lane_width(),
            boundary_violation: false,
            collision_event: None,
            lane_probes: LaneProbes::new(),
        }
    }
}

impl SensorSnapshot {
    /// Snapshot with only speed set; everything else clear.
    pub fn at_speed(speed_kmh: f64) -> Self {
        Self {
            ego: EgoMotion {
                speed_kmh,
                ..EgoMotion::default()
            },
            ..Self::default()
        }
    }

    /// Builder: set the obstacle distance.
    pub fn with_obstacle(mut self, distance_m: f64) -> Self {
        self.obstacle_distance_m = Some(distance_m);
        self
    }

    /// Builder: append a lane probe. Probes beyond capacity are dropped.
    pub fn with_probe(mut self, probe: LaneProbe) -> Self {
        let _ = self.lane_probes.push(probe);
        self
    }
}
