//! Discrete PID with a clamped integral accumulator.
//!
//! Evaluated once per control tick: the integral sums raw errors and the
//! derivative is the error difference between consecutive ticks. Gains are
//! tuned per tick, so no `dt` enters the computation.

use adas_common::drive::config::PidParameters;

/// Internal state of the PID controller.
///
/// Persists for one drive session. Reset (via [`PidState::reset`]) when the
/// mode returns to Manual or on emergency disable.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PidState {
    /// Integral accumulator, always within `±integral_limit`.
    integral: f64,
    /// Error seen on the previous tick.
    previous_error: f64,
}

impl PidState {
    /// Reset all internal state to zero.
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub const fn integral(&self) -> f64 {
        self.integral
    }

    #[inline]
    pub const fn previous_error(&self) -> f64 {
        self.previous_error
    }

    /// Replace the derivative history so the next tick sees no step.
    /// Non-finite errors are ignored.
    #[inline]
    pub fn seed_previous_error(&mut self, error: f64) {
        if error.is_finite() {
            self.previous_error = error;
        }
    }
}

/// PID gains, extracted from [`PidParameters`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidGains {
    pub kp: f64,
    /// Integral gain (0 = disabled).
    pub ki: f64,
    /// Derivative gain (0 = disabled).
    pub kd: f64,
    /// Anti-windup clamp on the accumulator.
    pub integral_limit: f64,
}

impl From<&PidParameters> for PidGains {
    fn from(p: &PidParameters) -> Self {
        Self {
            kp: p.kp,
            ki: p.ki,
            kd: p.kd,
            integral_limit: p.integral_limit,
        }
    }
}

/// Compute one PID tick.
///
/// # Arguments
/// - `state`: Mutable PID internal state.
/// - `gains`: PID gains.
/// - `error`: Speed error (target − actual) [km/h].
///
/// # Returns
/// Raw PID output (unbounded; mapping to throttle/brake happens in the
/// speed regulator).
#[inline]
pub fn pid_compute(state: &mut PidState, gains: &PidGains, error: f64) -> f64 {
    if !error.is_finite() {
        return 0.0;
    }

    // ── P term ──────────────────────────────────────────────
    let p_term = gains.kp * error;

    // ── I term (clamped accumulator) ────────────────────────
    let i_term = if gains.ki != 0.0 {
        state.integral =
            (state.integral + error).clamp(-gains.integral_limit, gains.integral_limit);
        gains.ki * state.integral
    } else {
        state.integral = 0.0;
        0.0
    };

    // ── D term ──────────────────────────────────────────────
    let d_term = gains.kd * (error - state.previous_error);

    state.previous_error = error;

    p_term + i_term + d_term
}

// ─── Tests ──────────────────────────────────────────────────────────
