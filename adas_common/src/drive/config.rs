//! Control parameter table.
//!
//! All parameter types use `serde::Deserialize` for TOML loading. Every
//! numeric field has a `#[serde(default)]` so a partial table is valid, and
//! [`ControlParameters::validate`] checks bounds once at load time.

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::consts::MAX_LANE_PROBES;

// ─── Bounds ─────────────────────────────────────────────────────────

/// Absolute cruise target limits [km/h].
pub const TARGET_SPEED_FLOOR: f64 = 0.0;
pub const TARGET_SPEED_CEIL: f64 = 250.0;

/// Longest accepted emergency cooldown [s].
pub const COOLDOWN_SECONDS_MAX: f64 = 10.0;

/// Longest accepted lookahead or follow distance [m].
pub const DISTANCE_MAX: f64 = 200.0;

// ─── PID / Speed Regulator ──────────────────────────────────────────

/// Speed regulator gains and output mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PidParameters {
    #[serde(default = "default_kp")]
    pub kp: f64,
    #[serde(default = "default_ki")]
    pub ki: f64,
    #[serde(default = "default_kd")]
    pub kd: f64,
    /// Anti-windup clamp on the accumulated error.
    #[serde(default = "default_integral_limit")]
    pub integral_limit: f64,
    /// |error| below this [km/h] coasts.
    #[serde(default = "default_coast_threshold")]
    pub coast_threshold: f64,
    /// Throttle held inside the coasting band.
    #[serde(default)]
    pub coast_throttle: f64,
    #[serde(default = "default_throttle_scale_normal")]
    pub throttle_scale_normal: f64,
    #[serde(default = "default_throttle_scale_aggressive")]
    pub throttle_scale_aggressive: f64,
    /// Error [km/h] above which the aggressive mapping is used.
    #[serde(default = "default_large_error_threshold")]
    pub large_error_threshold: f64,
    #[serde(default = "default_max_throttle_normal")]
    pub max_throttle_normal: f64,
    #[serde(default = "default_max_throttle_aggressive")]
    pub max_throttle_aggressive: f64,
    #[serde(default = "default_brake_scale")]
    pub brake_scale: f64,
    /// Regulator brake ceiling; stays below emergency force.
    #[serde(default = "default_max_brake")]
    pub max_brake: f64,
}

fn default_kp() -> f64 {
    1.2
}
fn default_ki() -> f64 {
    0.15
}
fn default_kd() -> f64 {
    0.3
}
fn default_integral_limit() -> f64 {
    20.0
}
fn default_coast_threshold() -> f64 {
    0.5
}
fn default_throttle_scale_normal() -> f64 {
    8.0
}
fn default_throttle_scale_aggressive() -> f64 {
    15.0
}
fn default_large_error_threshold() -> f64 {
    4.0
}
fn default_max_throttle_normal() -> f64 {
    0.7
}
fn default_max_throttle_aggressive() -> f64 {
    0.9
}
fn default_brake_scale() -> f64 {
    10.0
}
fn default_max_brake() -> f64 {
    0.8
}

impl Default for PidParameters {
    fn default() -> Self {
        Self {
            kp: default_kp(),
            ki: default_ki(),
            kd: default_kd(),
            integral_limit: default_integral_limit(),
            coast_threshold: default_coast_threshold(),
            coast_throttle: 0.0,
            throttle_scale_normal: default_throttle_scale_normal(),
            throttle_scale_aggressive: default_throttle_scale_aggressive(),
            large_error_threshold: default_large_error_threshold(),
            max_throttle_normal: default_max_throttle_normal(),
            max_throttle_aggressive: default_max_throttle_aggressive(),
            brake_scale: default_brake_scale(),
            max_brake: default_max_brake(),
        }
    }
}

// ─── Follow Distance ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FollowParameters {
    /// Gap [m] at and beyond which the target speed is unrestricted.
    #[serde(default = "default_target_follow_distance")]
    pub target_follow_distance: f64,
    /// Gap [m] below which the ceiling drops to zero.
    #[serde(default = "default_min_follow_distance")]
    pub min_follow_distance: f64,
}

fn default_target_follow_distance() -> f64 {
    15.0
}
fn default_min_follow_distance() -> f64 {
    8.0
}

impl Default for FollowParameters {
    fn default() -> Self {
        Self {
            target_follow_distance: default_target_follow_distance(),
            min_follow_distance: default_min_follow_distance(),
        }
    }
}

// ─── Emergency Brake ────────────────────────────────────────────────

/// Forward lookahead distances [m].
pub type LookaheadDistances = Vec<f64, MAX_LANE_PROBES>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmergencyParameters {
    /// Trigger distance at standstill [m].
    #[serde(default = "default_emergency_base_distance")]
    pub base_distance: f64,
    /// Extra trigger distance per m/s of speed [s].
    #[serde(default = "default_emergency_speed_factor")]
    pub speed_factor: f64,
    /// Upper clamp on the trigger distance [m].
    #[serde(default = "default_emergency_max_distance")]
    pub max_distance: f64,
    /// Force applied right at the trigger boundary.
    #[serde(default = "default_emergency_base_force")]
    pub base_force: f64,
    #[serde(default = "default_emergency_max_force")]
    pub max_force: f64,
    /// Latch hold time after the last trigger [s].
    #[serde(default = "default_emergency_cooldown_seconds")]
    pub cooldown_seconds: f64,
    /// Narrowest acceptable lane [m].
    #[serde(default = "default_min_lane_width")]
    pub min_lane_width: f64,
    /// A probe lane narrower than this fraction of the current lane fires.
    #[serde(default = "default_lane_narrowing_ratio")]
    pub lane_narrowing_ratio: f64,
    /// Probe distances the perception side samples [m].
    #[serde(default = "default_lookahead_distances")]
    pub lookahead_distances: LookaheadDistances,
    /// Obstacle gap [m] reported as a warning before the trigger.
    #[serde(default = "default_warning_distance")]
    pub warning_distance: f64,
}

fn default_emergency_base_distance() -> f64 {
    3.0
}
fn default_emergency_speed_factor() -> f64 {
    0.2
}
fn default_emergency_max_distance() -> f64 {
    6.0
}
fn default_emergency_base_force() -> f64 {
    0.6
}
fn default_emergency_max_force() -> f64 {
    1.0
}
fn default_emergency_cooldown_seconds() -> f64 {
    1.5
}
fn default_min_lane_width() -> f64 {
    2.5
}
fn default_lane_narrowing_ratio() -> f64 {
    0.5
}
fn default_lookahead_distances() -> LookaheadDistances {
    [3.0, 6.0, 10.0, 15.0].into_iter().collect()
}
fn default_warning_distance() -> f64 {
    15.0
}

impl Default for EmergencyParameters {
    fn default() -> Self {
        Self {
            base_distance: default_emergency_base_distance(),
            speed_factor: default_emergency_speed_factor(),
            max_distance: default_emergency_max_distance(),
            base_force: default_emergency_base_force(),
            max_force: default_emergency_max_force(),
            cooldown_seconds: default_emergency_cooldown_seconds(),
            min_lane_width: default_min_lane_width(),
            lane_narrowing_ratio: default_lane_narrowing_ratio(),
            lookahead_distances: default_lookahead_distances(),
            warning_distance: default_warning_distance(),
        }
    }
}

impl EmergencyParameters {
    /// Furthest configured lookahead distance [m] (0 when none).
    pub fn max_lookahead(&self) -> f64 {
        self.lookahead_distances
            .iter()
            .copied()
            .fold(0.0_f64, f64::max)
    }
}

// ─── Gear Interlock ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GearParameters {
    /// Highest speed [km/h] at which the direction may be toggled.
    #[serde(default = "default_reverse_max_speed")]
    pub reverse_max_speed: f64,
    /// Throttle ceiling while in Reverse.
    #[serde(default = "default_max_reverse_throttle")]
    pub max_reverse_throttle: f64,
}

fn default_reverse_max_speed() -> f64 {
    5.0
}
fn default_max_reverse_throttle() -> f64 {
    0.4
}

impl Default for GearParameters {
    fn default() -> Self {
        Self {
            reverse_max_speed: default_reverse_max_speed(),
            max_reverse_throttle: default_max_reverse_throttle(),
        }
    }
}

// ─── Cruise Target ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CruiseParameters {
    #[serde(default = "default_target_speed")]
    pub default_target_speed: f64,
    #[serde(default = "default_min_target_speed")]
    pub min_target_speed: f64,
    #[serde(default = "default_max_target_speed")]
    pub max_target_speed: f64,
}

fn default_target_speed() -> f64 {
    60.0
}
fn default_min_target_speed() -> f64 {
    20.0
}
fn default_max_target_speed() -> f64 {
    120.0
}

impl Default for CruiseParameters {
    fn default() -> Self {
        Self {
            default_target_speed: default_target_speed(),
            min_target_speed: default_min_target_speed(),
            max_target_speed: default_max_target_speed(),
        }
    }
}

impl CruiseParameters {
    /// Clamp a requested target into `[min_target_speed, max_target_speed]`.
    #[inline]
    pub fn clamp_target(&self, kmh: f64) -> f64 {
        kmh.clamp(self.min_target_speed, self.max_target_speed)
    }
}

// ─── Autopilot Pass-Through ─────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AutopilotParameters {
    /// Brake held in Autonomous when the autopilot supplies nothing.
    #[serde(default = "default_fallback_brake")]
    pub fallback_brake: f64,
}

fn default_fallback_brake() -> f64 {
    0.3
}

impl Default for AutopilotParameters {
    fn default() -> Self {
        Self {
            fallback_brake: default_fallback_brake(),
        }
    }
}

// ─── Top-Level ──────────────────────────────────────────────────────

/// Complete control parameter table.
///
/// Loaded once at startup and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControlParameters {
    #[serde(default)]
    pub pid: PidParameters,
    #[serde(default)]
    pub follow: FollowParameters,
    #[serde(default)]
    pub emergency: EmergencyParameters,
    #[serde(default)]
    pub gear: GearParameters,
    #[serde(default)]
    pub cruise: CruiseParameters,
    #[serde(default)]
    pub autopilot: AutopilotParameters,
}

fn check_range(name: &str, value: f64, min: f64, max: f64) -> Result<(), String> {
    if !value.is_finite() || value < min || value > max {
        return Err(format!("{name} {value} out of range [{min}, {max}]"));
    }
    Ok(())
}

fn check_unit(name: &str, value: f64) -> Result<(), String> {
    check_range(name, value, 0.0, 1.0)
}

impl ControlParameters {
    /// Validate parameter bounds and cross-field ordering.
    pub fn validate(&self) -> Result<(), String> {
        let p = &self.pid;
        check_range("kp", p.kp, 0.0, 100.0)?;
        check_range("ki", p.ki, 0.0, 100.0)?;
        check_range("kd", p.kd, 0.0, 100.0)?;
        check_range("integral_limit", p.integral_limit, 0.0, 1000.0)?;
        check_range("coast_threshold", p.coast_threshold, 0.0, 20.0)?;
        check_unit("coast_throttle", p.coast_throttle)?;
        check_range("throttle_scale_normal", p.throttle_scale_normal, f64::EPSILON, 1000.0)?;
        check_range(
            "throttle_scale_aggressive",
            p.throttle_scale_aggressive,
            f64::EPSILON,
            1000.0,
        )?;
        check_range("large_error_threshold", p.large_error_threshold, 0.0, 100.0)?;
        check_unit("max_throttle_normal", p.max_throttle_normal)?;
        check_unit("max_throttle_aggressive", p.max_throttle_aggressive)?;
        check_range("brake_scale", p.brake_scale, f64::EPSILON, 1000.0)?;
        check_unit("max_brake", p.max_brake)?;
        if p.max_throttle_aggressive < p.max_throttle_normal {
            return Err("max_throttle_aggressive must be >= max_throttle_normal".to_string());
        }

        let f = &self.follow;
        check_range("min_follow_distance", f.min_follow_distance, 0.0, DISTANCE_MAX)?;
        check_range("target_follow_distance", f.target_follow_distance, 0.0, DISTANCE_MAX)?;
        if f.min_follow_distance >= f.target_follow_distance {
            return Err(format!(
                "min_follow_distance {} must be < target_follow_distance {}",
                f.min_follow_distance, f.target_follow_distance
            ));
        }

        let e = &self.emergency;
        check_range("emergency_base_distance", e.base_distance, f64::EPSILON, DISTANCE_MAX)?;
        check_range("emergency_speed_factor", e.speed_factor, 0.0, 10.0)?;
        check_range("emergency_max_distance", e.max_distance, f64::EPSILON, DISTANCE_MAX)?;
        if e.base_distance > e.max_distance {
            return Err(format!(
                "emergency_base_distance {} must be <= emergency_max_distance {}",
                e.base_distance, e.max_distance
            ));
        }
        check_range("emergency_base_force", e.base_force, f64::EPSILON, 1.0)?;
        check_range("emergency_max_force", e.max_force, f64::EPSILON, 1.0)?;
        if e.base_force > e.max_force {
            return Err(format!(
                "emergency_base_force {} must be <= emergency_max_force {}",
                e.base_force, e.max_force
            ));
        }
        if p.max_brake > e.max_force {
            return Err(format!(
                "max_brake {} must not exceed emergency_max_force {}",
                p.max_brake, e.max_force
            ));
        }
        check_range(
            "emergency_cooldown_seconds",
            e.cooldown_seconds,
            0.0,
            COOLDOWN_SECONDS_MAX,
        )?;
        check_range("min_lane_width", e.min_lane_width, 0.0, 10.0)?;
        check_unit("lane_narrowing_ratio", e.lane_narrowing_ratio)?;
        check_range("warning_distance", e.warning_distance, 0.0, DISTANCE_MAX)?;
        for &d in &e.lookahead_distances {
            check_range("lookahead_distance", d, f64::EPSILON, DISTANCE_MAX)?;
        }

        let g = &self.gear;
        check_range("reverse_max_speed", g.reverse_max_speed, 0.0, 30.0)?;
        check_unit("max_reverse_throttle", g.max_reverse_throttle)?;

        let c = &self.cruise;
        check_range("min_target_speed", c.min_target_speed, TARGET_SPEED_FLOOR, TARGET_SPEED_CEIL)?;
        check_range("max_target_speed", c.max_target_speed, TARGET_SPEED_FLOOR, TARGET_SPEED_CEIL)?;
        if c.min_target_speed > c.max_target_speed {
            return Err(format!(
                "min_target_speed {} must be <= max_target_speed {}",
                c.min_target_speed, c.max_target_speed
            ));
        }
        check_range(
            "default_target_speed",
            c.default_target_speed,
            c.min_target_speed,
            c.max_target_speed,
        )?;

        check_unit("fallback_brake", self.autopilot.fallback_brake)?;

        Ok(())
    }
}
