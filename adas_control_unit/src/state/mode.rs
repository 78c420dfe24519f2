//! Driving mode state machine.
//!
//! Manual → AdaptiveCruise → Autonomous → Manual on `Toggle`, with driver
//! overrides stepping authority back toward Manual. Entry actions (PID
//! reset, cruise target) are applied by the control loop on `Changed`.

use adas_common::drive::command::{DriverIntent, RemoteCommand};
use adas_common::drive::state::Mode;

/// Event that can trigger a mode transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeEvent {
    /// Advance to the next mode in the cycle.
    Toggle,
    /// Driver steering input.
    ManualSteer,
    /// Driver brake pedal.
    ManualBrake,
    /// Engage cruise from any mode (remote).
    EngageCruise,
    /// Leave cruise for Manual (remote).
    DisengageCruise,
    /// Driver emergency disable (terminal reset).
    EmergencyDisable,
    /// Remote emergency stop: hand authority back to the driver.
    RemoteStop,
}

impl ModeEvent {
    /// Mode event carried by a driver intent, if any.
    pub const fn from_intent(intent: DriverIntent) -> Option<Self> {
        match intent {
            DriverIntent::ToggleMode => Some(Self::Toggle),
            DriverIntent::ManualSteer => Some(Self::ManualSteer),
            DriverIntent::ManualBrake => Some(Self::ManualBrake),
            DriverIntent::EmergencyDisable => Some(Self::EmergencyDisable),
            DriverIntent::AdjustTargetSpeed(_)
            | DriverIntent::ManualThrottle
            | DriverIntent::ToggleGear => None,
        }
    }

    /// Mode event carried by a remote command, if any.
    pub const fn from_remote(cmd: RemoteCommand) -> Option<Self> {
        match cmd {
            RemoteCommand::SetTargetSpeed(_) | RemoteCommand::CruiseControl(true) => {
                Some(Self::EngageCruise)
            }
            RemoteCommand::CruiseControl(false) => Some(Self::DisengageCruise),
            RemoteCommand::EmergencyStop => Some(Self::RemoteStop),
        }
    }
}

/// Result of a mode event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeTransition {
    Changed { from: Mode, to: Mode },
    Unchanged(Mode),
}

/// Mode state machine holding the current mode.
#[derive(Debug, Clone, Default)]
pub struct ModeStateMachine {
    state: Mode,
}

impl ModeStateMachine {
    /// Start in Manual.
    pub const fn new() -> Self {
        Self { state: Mode::Manual }
    }

    #[inline]
    pub const fn state(&self) -> Mode {
        self.state
    }

    /// Apply an event. Events that do not change the mode are no-ops.
    pub fn handle_event(&mut self, event: ModeEvent) -> ModeTransition {
        use Mode::*;
        use ModeEvent::*;

        let next = match (self.state, event) {
            (current, Toggle) => current.next(),

            // Driver braking always takes authority back.
            (AdaptiveCruise | Autonomous, ManualBrake) => Manual,
            // Steering in Autonomous hands lateral control back to the driver.
            (Autonomous, ManualSteer) => AdaptiveCruise,

            (_, EngageCruise) => AdaptiveCruise,
            (AdaptiveCruise, DisengageCruise) => Manual,

            (_, EmergencyDisable | RemoteStop) => Manual,

            (current, _) => current,
        };

        if next == self.state {
            ModeTransition::Unchanged(next)
        } else {
            let from = self.state;
            self.state = next;
            ModeTransition::Changed { from, to: next }
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
