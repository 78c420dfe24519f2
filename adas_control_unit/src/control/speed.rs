//! Speed regulator: PID speed error → throttle/brake demand.
//!
//! The effective target is the cruise target capped by the follow-distance
//! ceiling. Positive PID output maps to throttle with a gain that grows for
//! large deficits; negative output maps to brake, bounded below the
//! emergency force range.

use adas_common::drive::config::PidParameters;

use super::pid::{PidGains, PidState, pid_compute};

/// Throttle/brake pair requested by a longitudinal controller.
///
/// At most one of the two channels is non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LongitudinalDemand {
    pub throttle: f64,
    pub brake: f64,
}

impl LongitudinalDemand {
    pub const COAST: Self = Self {
        throttle: 0.0,
        brake: 0.0,
    };

    #[inline]
    pub const fn throttle(throttle: f64) -> Self {
        Self {
            throttle,
            brake: 0.0,
        }
    }

    #[inline]
    pub const fn brake(brake: f64) -> Self {
        Self {
            throttle: 0.0,
            brake,
        }
    }
}

/// PID internals for one tick, reported through telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PidDiagnostics {
    /// Effective target − current speed [km/h].
    pub error: f64,
    pub integral: f64,
    /// Raw PID output before mapping.
    pub output: f64,
}

/// Closed-loop speed regulator.
///
/// Owns the only [`PidState`] in the loop.
#[derive(Debug, Clone)]
pub struct SpeedRegulator {
    params: PidParameters,
    gains: PidGains,
    state: PidState,
    /// Skipped at least one tick since the last regulation.
    suspended: bool,
}

impl SpeedRegulator {
    pub fn new(params: &PidParameters) -> Self {
        Self {
            params: *params,
            gains: PidGains::from(params),
            state: PidState::default(),
            suspended: false,
        }
    }

    /// Compute the demand for one tick.
    ///
    /// `ceiling` is the follow-distance speed cap (`+∞` when unrestricted).
    pub fn regulate(
        &mut self,
        current_kmh: f64,
        target_kmh: f64,
        ceiling_kmh: f64,
    ) -> (LongitudinalDemand, PidDiagnostics) {
        let effective = target_kmh.min(ceiling_kmh);
        let error = effective - current_kmh;
        if core::mem::take(&mut self.suspended) {
            self.state.seed_previous_error(error);
        }
        let output = pid_compute(&mut self.state, &self.gains, error);

        let diagnostics = PidDiagnostics {
            error,
            integral: self.state.integral(),
            output,
        };

        (self.map_output(error, output), diagnostics)
    }

    fn map_output(&self, error: f64, output: f64) -> LongitudinalDemand {
        let p = &self.params;

        if !error.is_finite() || error.abs() < p.coast_threshold {
            return LongitudinalDemand::throttle(p.coast_throttle);
        }

        if output > 0.0 {
            let throttle = if error > p.large_error_threshold {
                (output / p.throttle_scale_aggressive).min(p.max_throttle_aggressive)
            } else {
                (output / p.throttle_scale_normal).min(p.max_throttle_normal)
            };
            LongitudinalDemand::throttle(throttle)
        } else if output < 0.0 {
            LongitudinalDemand::brake((output.abs() / p.brake_scale).min(p.max_brake))
        } else {
            LongitudinalDemand::COAST
        }
    }

    /// Clear the PID history (mode change back to Manual, emergency disable).
    #[inline]
    pub fn reset(&mut self) {
        self.state.reset();
        self.suspended = false;
    }

    /// Mark a tick on which an override held the regulator off. The PID
    /// state is frozen; the next [`regulate`](Self::regulate) restarts the
    /// derivative from its own error.
    #[inline]
    pub fn suspend(&mut self) {
        self.suspended = true;
    }

    #[inline]
    pub const fn state(&self) -> &PidState {
        &self.state
    }
}
