//! Actuation arbitration.
//!
//! Merges the per-tick candidates into one [`ControlCommand`] with fixed
//! priority: emergency override > driver longitudinal input > automated
//! control (regulator or autopilot). The reverse throttle cap is applied
//! before the command is built; the command constructor enforces
//! throttle/brake exclusivity and ranges.

use adas_common::drive::command::{AutopilotCommand, ControlCommand, ManualControls};
use adas_common::drive::state::Mode;

use crate::control::speed::LongitudinalDemand;
use crate::state::gear::GearSafetyInterlock;

/// Which candidate supplied the longitudinal channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSource {
    /// Emergency brake override.
    Emergency,
    /// Driver pedals.
    Driver,
    /// Speed regulator (AdaptiveCruise).
    Regulator,
    /// External autopilot (Autonomous).
    Autopilot,
    /// Autonomous with no autopilot command this tick.
    AutopilotFallback,
}

/// Candidates collected during one tick.
#[derive(Debug, Clone, Copy)]
pub struct Candidates<'a> {
    pub mode: Mode,
    /// Brake force from the emergency monitor.
    pub emergency_force: Option<f64>,
    /// Explicit ManualThrottle / ManualBrake intent this tick.
    pub driver_longitudinal: bool,
    pub manual: &'a ManualControls,
    /// Regulator demand (AdaptiveCruise only).
    pub regulator: Option<LongitudinalDemand>,
    pub autopilot: Option<&'a AutopilotCommand>,
}

/// Arbitration outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arbitrated {
    pub command: ControlCommand,
    pub source: CommandSource,
}

/// Resolve the candidates into one command.
pub fn arbitrate(c: &Candidates<'_>, gear: &GearSafetyInterlock, fallback_brake: f64) -> Arbitrated {
    // ── Lateral ─────────────────────────────────────────────
    let steer = match c.mode {
        Mode::Autonomous => c.autopilot.map_or(0.0, |a| a.steer),
        Mode::Manual | Mode::AdaptiveCruise => c.manual.steer,
    };

    // ── Longitudinal candidate ──────────────────────────────
    let (throttle, brake, source) = if c.mode == Mode::Manual || c.driver_longitudinal {
        (c.manual.throttle, c.manual.brake, CommandSource::Driver)
    } else {
        match c.mode {
            Mode::AdaptiveCruise => {
                let d = c.regulator.unwrap_or(LongitudinalDemand::COAST);
                (d.throttle, d.brake, CommandSource::Regulator)
            }
            Mode::Autonomous => match c.autopilot {
                Some(a) => (a.throttle, a.brake, CommandSource::Autopilot),
                None => (0.0, fallback_brake, CommandSource::AutopilotFallback),
            },
            Mode::Manual => (c.manual.throttle, c.manual.brake, CommandSource::Driver),
        }
    };

    // ── Emergency override ──────────────────────────────────
    let (throttle, brake, source) = match c.emergency_force {
        Some(force) => {
            let brake = if brake.is_finite() { force.max(brake) } else { force };
            (0.0, brake, CommandSource::Emergency)
        }
        None => (throttle, brake, source),
    };

    let throttle = if throttle.is_finite() {
        gear.clamp_throttle(throttle)
    } else {
        0.0
    };

    Arbitrated {
        command: ControlCommand::new(throttle, brake, steer, gear.gear()),
        source,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
