//! Emergency brake monitor.
//!
//! Independent safety layer evaluated every tick. Produces a brake-force
//! override from obstacle proximity, lane boundary conditions, collision
//! events and remote stop requests, and latches it for a cooldown window
//! after the last trigger so the brake does not chatter on noisy readings.

use adas_common::consts::KMH_PER_MS;
use adas_common::drive::config::EmergencyParameters;
use adas_common::drive::safety::EmergencyCause;
use adas_common::drive::sensor::SensorSnapshot;
use adas_common::drive::state::{Mode, Tick};

/// Latched emergency state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EmergencyState {
    pub active: bool,
    pub last_trigger_tick: Option<Tick>,
    /// Force held while latched.
    pub last_force: f64,
    /// Causes of the most recent trigger.
    pub causes: EmergencyCause,
}

impl EmergencyState {
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Result of one monitor evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EmergencyVerdict {
    /// Brake override for this tick, in `(0, 1]`.
    pub force: Option<f64>,
    /// Fresh triggers seen this tick (empty while only holding).
    pub causes: EmergencyCause,
    /// Rising edge: the latch went from idle to active this tick.
    pub activated: bool,
    /// Falling edge: `Some(by_driver)` when the latch released this tick.
    pub released: Option<bool>,
    /// Obstacle inside the warning zone but not close enough to trigger.
    pub warning_distance_m: Option<f64>,
}

/// Emergency brake monitor with cooldown hysteresis.
#[derive(Debug, Clone)]
pub struct EmergencyBrakeMonitor {
    params: EmergencyParameters,
    max_lookahead: f64,
    cooldown_ticks: u64,
    state: EmergencyState,
    /// Remote stop waiting for the next evaluation.
    stop_requested: bool,
}

impl EmergencyBrakeMonitor {
    /// Build a monitor; the cooldown is converted to ticks, rounded up.
    pub fn new(params: &EmergencyParameters, tick_seconds: f64) -> Self {
        Self {
            max_lookahead: params.max_lookahead(),
            cooldown_ticks: (params.cooldown_seconds / tick_seconds).ceil() as u64,
            params: params.clone(),
            state: EmergencyState::default(),
            stop_requested: false,
        }
    }

    /// Request a full-force stop, latched like any other trigger on the
    /// next [`evaluate`](Self::evaluate).
    #[inline]
    pub fn request_stop(&mut self) {
        self.stop_requested = true;
    }

    /// Speed-scaled proximity trigger distance [m].
    #[inline]
    pub fn trigger_distance(&self, speed_kmh: f64) -> f64 {
        let p = &self.params;
        let speed_ms = speed_kmh.max(0.0) / KMH_PER_MS;
        (p.base_distance + speed_ms * p.speed_factor).clamp(p.base_distance, p.max_distance)
    }

    /// Progressive force for an obstacle at `distance_m` inside `threshold`.
    #[inline]
    fn proximity_force(&self, distance_m: f64, threshold: f64) -> f64 {
        let p = &self.params;
        let closeness = (threshold - distance_m) / threshold;
        (p.base_force + closeness * (p.max_force - p.base_force)).clamp(p.base_force, p.max_force)
    }

    fn lane_causes(&self, s: &SensorSnapshot) -> EmergencyCause {
        let p = &self.params;
        let mut causes = EmergencyCause::empty();

        if s.boundary_violation {
            causes |= EmergencyCause::BOUNDARY_VIOLATION;
        }
        if s.lane_width_m.is_finite() && s.lane_width_m < p.min_lane_width {
            causes |= EmergencyCause::NARROW_LANE;
        }

        let narrowing_limit = p.lane_narrowing_ratio * s.lane_width_m;
        let probe_fires = s
            .lane_probes
            .iter()
            .filter(|probe| probe.distance_m <= self.max_lookahead)
            .any(|probe| {
                if !probe.drivable {
                    return true;
                }
                match probe.lane_width_m {
                    Some(w) if w.is_finite() => w < p.min_lane_width || w < narrowing_limit,
                    _ => false,
                }
            });
        if probe_fires {
            causes |= EmergencyCause::LOOKAHEAD_BOUNDARY;
        }

        causes
    }

    /// Evaluate one tick.
    ///
    /// `driver_throttle` clears an active latch before fresh triggers are
    /// checked, so a trigger on the same tick still brakes.
    pub fn evaluate(
        &mut self,
        snapshot: &SensorSnapshot,
        mode: Mode,
        tick: Tick,
        driver_throttle: bool,
    ) -> EmergencyVerdict {
        let mut verdict = EmergencyVerdict::default();

        if driver_throttle && self.state.active {
            self.state.reset();
            verdict.released = Some(true);
        }

        // ── Fresh triggers ──────────────────────────────────────
        let mut causes = EmergencyCause::empty();
        let mut force: f64 = 0.0;

        let obstacle = snapshot
            .obstacle_distance_m
            .filter(|d| d.is_finite() && *d >= 0.0);

        if let Some(d) = obstacle {
            let threshold = self.trigger_distance(snapshot.ego.speed_kmh);
            if mode != Mode::Manual && d < threshold {
                causes |= EmergencyCause::OBSTACLE_PROXIMITY;
                force = force.max(self.proximity_force(d, threshold));
            } else if d < self.params.warning_distance {
                verdict.warning_distance_m = Some(d);
            }
        }

        causes |= self.lane_causes(snapshot);
        if snapshot.collision_event.is_some() {
            causes |= EmergencyCause::COLLISION;
        }
        if core::mem::take(&mut self.stop_requested) {
            causes |= EmergencyCause::REMOTE_STOP;
        }
        if causes.requires_full_force() {
            force = self.params.max_force;
        }

        if !causes.is_empty() {
            verdict.activated = !self.state.active;
            // A same-tick driver release followed by a trigger is not a release.
            if verdict.activated && verdict.released.is_some() {
                verdict.released = None;
                verdict.activated = false;
            }
            self.state = EmergencyState {
                active: true,
                last_trigger_tick: Some(tick),
                last_force: force,
                causes,
            };
            verdict.causes = causes;
            verdict.force = Some(force);
            return verdict;
        }

        // ── Cooldown hold ───────────────────────────────────────
        if self.state.active {
            let since = self
                .state
                .last_trigger_tick
                .map_or(u64::MAX, |t| tick.saturating_sub(t));
            if since < self.cooldown_ticks {
                verdict.force = Some(self.state.last_force);
            } else {
                self.state.reset();
                verdict.released = Some(false);
            }
        }

        verdict
    }

    /// Clear the latch and any pending stop request.
    #[inline]
    pub fn reset(&mut self) {
        self.state.reset();
        self.stop_requested = false;
    }

    #[inline]
    pub const fn state(&self) -> &EmergencyState {
        &self.state
    }

    #[inline]
    pub const fn cooldown_ticks(&self) -> u64 {
        self.cooldown_ticks
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
