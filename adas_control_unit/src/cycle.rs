//! Fixed-step control loop: one [`TickInput`] in, one [`ControlCommand`] out.
//!
//! ## Tick Body
//! 1. Refresh measured vehicle state from the snapshot.
//! 2. Apply the driver intent (mode events, target adjust, gear toggle,
//!    emergency disable).
//! 3. Apply the remote command.
//! 4. Evaluate the emergency brake monitor.
//! 5. Collect longitudinal candidates (regulator, autopilot, driver).
//! 6. Arbitrate and emit telemetry.
//!
//! Nothing in the tick path returns an error; every tick yields a bounded
//! command.

use adas_common::drive::command::{ControlCommand, DriverIntent, RemoteCommand, TickInput};
use adas_common::drive::config::ControlParameters;
use adas_common::drive::state::{GearState, Mode, Tick, VehicleState};
use adas_common::drive::telemetry::{SPEED_UNIT_KMH, TelemetryEvent, VehicleParameters};
use tracing::{debug, trace};

use crate::command::arbitration::{Candidates, CommandSource, arbitrate};
use crate::config::ControlUnitConfig;
use crate::control::follow::FollowDistanceRegulator;
use crate::control::pid::PidState;
use crate::control::speed::SpeedRegulator;
use crate::safety::emergency::{EmergencyBrakeMonitor, EmergencyState};
use crate::state::gear::{GearSafetyInterlock, GearTransition};
use crate::state::mode::{ModeEvent, ModeStateMachine, ModeTransition};
use crate::telemetry::{NullSink, TelemetrySink};

// ─── Tick Statistics ────────────────────────────────────────────────

/// Counters accumulated over a drive session. O(1) update per tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickStats {
    /// Total ticks executed.
    pub ticks: u64,
    /// Ticks with the emergency override applied.
    pub emergency_ticks: u64,
    /// Emergency latch rising edges.
    pub emergency_activations: u64,
    /// Ticks where the driver pedals had authority.
    pub driver_ticks: u64,
    /// Ticks where the autopilot fallback brake was used.
    pub fallback_ticks: u64,
    pub mode_changes: u64,
    pub gear_rejections: u64,
    /// Strongest brake command issued [0, 1].
    pub max_brake: f64,
}

impl TickStats {
    #[inline]
    fn record(&mut self, command: &ControlCommand, source: CommandSource) {
        self.ticks += 1;
        match source {
            CommandSource::Emergency => self.emergency_ticks += 1,
            CommandSource::Driver => self.driver_ticks += 1,
            CommandSource::AutopilotFallback => self.fallback_ticks += 1,
            CommandSource::Regulator | CommandSource::Autopilot => {}
        }
        if command.brake() > self.max_brake {
            self.max_brake = command.brake();
        }
    }
}

// ─── Control Loop ───────────────────────────────────────────────────

/// Explicit control context owning every piece of loop state.
#[derive(Debug)]
pub struct ControlLoop<S: TelemetrySink = NullSink> {
    params: ControlParameters,
    tick_seconds: f64,
    tick: Tick,
    vehicle: VehicleState,
    /// Cruise target [km/h]; `None` outside a cruise session.
    target_kmh: Option<f64>,
    modes: ModeStateMachine,
    gear: GearSafetyInterlock,
    speed: SpeedRegulator,
    follow: FollowDistanceRegulator,
    emergency: EmergencyBrakeMonitor,
    in_warning_zone: bool,
    last_source: Option<CommandSource>,
    stats: TickStats,
    sink: S,
}

impl ControlLoop<NullSink> {
    /// Loop without telemetry.
    pub fn new(config: &ControlUnitConfig) -> Self {
        Self::with_sink(config, NullSink)
    }
}

impl<S: TelemetrySink> ControlLoop<S> {
    /// Build a loop from a validated configuration.
    pub fn with_sink(config: &ControlUnitConfig, sink: S) -> Self {
        let params = config.control.clone();
        Self {
            tick_seconds: config.tick_seconds,
            tick: 0,
            vehicle: VehicleState::default(),
            target_kmh: None,
            modes: ModeStateMachine::new(),
            gear: GearSafetyInterlock::new(&params.gear),
            speed: SpeedRegulator::new(&params.pid),
            follow: FollowDistanceRegulator::new(&params.follow),
            emergency: EmergencyBrakeMonitor::new(&params.emergency, config.tick_seconds),
            in_warning_zone: false,
            last_source: None,
            stats: TickStats::default(),
            sink,
            params,
        }
    }

    /// Execute one control tick.
    pub fn tick(&mut self, input: &TickInput) -> ControlCommand {
        let tick = self.tick;

        // ── 1. Measured state ───────────────────────────────────
        let ego = &input.snapshot.ego;
        if ego.speed_kmh.is_finite() {
            self.vehicle.speed_kmh = ego.speed_kmh;
        }
        self.vehicle.position = ego.position;
        if ego.heading_deg.is_finite() {
            self.vehicle.heading_deg = ego.heading_deg;
        }

        // ── 2. Driver intent ────────────────────────────────────
        let mut driver_throttle = false;
        if let Some(intent) = input.intent {
            match intent {
                DriverIntent::EmergencyDisable => self.emergency_disable(),
                DriverIntent::AdjustTargetSpeed(delta) => self.adjust_target(delta),
                DriverIntent::ToggleGear => self.toggle_gear(),
                DriverIntent::ManualThrottle => driver_throttle = true,
                DriverIntent::ToggleMode | DriverIntent::ManualSteer | DriverIntent::ManualBrake => {
                    if let Some(event) = ModeEvent::from_intent(intent) {
                        self.apply_mode_event(event);
                    }
                }
            }
        }

        // ── 3. Remote command ───────────────────────────────────
        if let Some(remote) = input.remote {
            self.apply_remote(remote);
        }

        let mode = self.modes.state();

        // ── 4. Emergency monitor ────────────────────────────────
        let verdict = self
            .emergency
            .evaluate(&input.snapshot, mode, tick, driver_throttle);
        if let Some(by_driver) = verdict.released {
            self.sink
                .publish(tick, TelemetryEvent::EmergencyBrakeReleased { by_driver });
        }
        if verdict.activated {
            self.stats.emergency_activations += 1;
            self.sink.publish(
                tick,
                TelemetryEvent::EmergencyBrakeActivated {
                    causes: verdict.causes,
                    force: verdict.force.unwrap_or(0.0),
                    obstacle_distance_m: input.snapshot.obstacle_distance_m,
                },
            );
        }
        match verdict.warning_distance_m {
            Some(distance_m) if !self.in_warning_zone => {
                self.in_warning_zone = true;
                self.sink
                    .publish(tick, TelemetryEvent::ObstacleWarning { distance_m });
            }
            Some(_) => {}
            None => self.in_warning_zone = false,
        }
        let emergency_force = verdict.force;

        // ── 5. Longitudinal candidates ──────────────────────────
        let driver_longitudinal = input
            .intent
            .is_some_and(|i| i.is_manual_longitudinal());

        let regulating = mode.has_speed_control() && self.target_kmh.is_some();
        let regulator = match self.target_kmh {
            Some(target) if regulating && !driver_longitudinal && emergency_force.is_none() => {
                let ceiling = self
                    .follow
                    .speed_ceiling(input.snapshot.obstacle_distance_m, target);
                let (demand, diag) = self.speed.regulate(self.vehicle.speed_kmh, target, ceiling);
                self.sink.publish(
                    tick,
                    TelemetryEvent::PidDiagnostics {
                        error: diag.error,
                        integral: diag.integral,
                        output: diag.output,
                    },
                );
                Some(demand)
            }
            _ => {
                if regulating {
                    self.speed.suspend();
                }
                None
            }
        };

        // ── 6. Arbitration ──────────────────────────────────────
        let arbitrated = arbitrate(
            &Candidates {
                mode,
                emergency_force,
                driver_longitudinal,
                manual: &input.manual,
                regulator,
                autopilot: input.autopilot.as_ref(),
            },
            &self.gear,
            self.params.autopilot.fallback_brake,
        );

        if self.last_source != Some(arbitrated.source) {
            debug!(tick, source = ?arbitrated.source, "Actuation source changed");
            self.last_source = Some(arbitrated.source);
        }
        trace!(
            tick,
            throttle = arbitrated.command.throttle(),
            brake = arbitrated.command.brake(),
            steer = arbitrated.command.steer_bias(),
            "Command"
        );

        self.stats.record(&arbitrated.command, arbitrated.source);
        self.tick += 1;
        arbitrated.command
    }

    // ─── Intent / Remote Handling ───────────────────────────────

    fn apply_mode_event(&mut self, event: ModeEvent) {
        if let ModeTransition::Changed { from, to } = self.modes.handle_event(event) {
            self.vehicle.mode = to;
            self.stats.mode_changes += 1;
            self.sink
                .publish(self.tick, TelemetryEvent::ModeChanged { from, to });

            match to {
                Mode::Manual => {
                    self.speed.reset();
                    self.target_kmh = None;
                }
                Mode::AdaptiveCruise if self.target_kmh.is_none() => {
                    let target = self.params.cruise.clamp_target(self.vehicle.speed_kmh);
                    self.set_target(target);
                }
                Mode::AdaptiveCruise | Mode::Autonomous => {}
            }
        }
    }

    fn apply_remote(&mut self, remote: RemoteCommand) {
        debug!(tick = self.tick, ?remote, "Remote command");
        if let Some(event) = ModeEvent::from_remote(remote) {
            self.apply_mode_event(event);
        }
        match remote {
            // Cruise is off (Manual entry); the brake latches this tick.
            RemoteCommand::EmergencyStop => self.emergency.request_stop(),
            RemoteCommand::SetTargetSpeed(kmh) => {
                if self.modes.state() == Mode::AdaptiveCruise {
                    let target = self.params.cruise.clamp_target(kmh);
                    self.set_target(target);
                }
            }
            RemoteCommand::CruiseControl(_) => {}
        }
    }

    fn adjust_target(&mut self, delta_kmh: f64) {
        if !self.modes.state().has_speed_control() || !delta_kmh.is_finite() {
            debug!(tick = self.tick, delta_kmh, "Target adjust ignored");
            return;
        }
        let base = self
            .target_kmh
            .unwrap_or(self.params.cruise.default_target_speed);
        let target = self.params.cruise.clamp_target(base + delta_kmh);
        self.set_target(target);
    }

    fn set_target(&mut self, target_kmh: f64) {
        if self.target_kmh != Some(target_kmh) {
            self.target_kmh = Some(target_kmh);
            self.sink
                .publish(self.tick, TelemetryEvent::TargetSpeedChanged { target_kmh });
        }
    }

    fn toggle_gear(&mut self) {
        match self.gear.toggle(self.vehicle.speed_kmh, self.modes.state()) {
            GearTransition::Ok { from, to } => {
                self.vehicle.gear = to;
                self.sink
                    .publish(self.tick, TelemetryEvent::GearChanged { from, to });
            }
            GearTransition::Rejected(reason) => {
                self.stats.gear_rejections += 1;
                self.sink
                    .publish(self.tick, TelemetryEvent::GearToggleRejected { reason });
            }
        }
    }

    /// Drop to Manual and clear all controller state.
    fn emergency_disable(&mut self) {
        self.apply_mode_event(ModeEvent::EmergencyDisable);
        self.speed.reset();
        self.emergency.reset();
        self.target_kmh = None;
        self.in_warning_zone = false;

        let from = self.gear.gear();
        self.gear.reset();
        if from != GearState::Forward {
            self.sink.publish(
                self.tick,
                TelemetryEvent::GearChanged {
                    from,
                    to: GearState::Forward,
                },
            );
        }
        self.vehicle.gear = GearState::Forward;
        self.vehicle.mode = Mode::Manual;
        self.sink.publish(self.tick, TelemetryEvent::EmergencyDisabled);
    }

    // ─── Accessors ──────────────────────────────────────────────

    #[inline]
    pub const fn vehicle(&self) -> &VehicleState {
        &self.vehicle
    }

    #[inline]
    pub const fn mode(&self) -> Mode {
        self.modes.state()
    }

    #[inline]
    pub const fn gear(&self) -> GearState {
        self.gear.gear()
    }

    #[inline]
    pub const fn target_speed(&self) -> Option<f64> {
        self.target_kmh
    }

    /// Number of ticks executed.
    #[inline]
    pub const fn tick_count(&self) -> Tick {
        self.tick
    }

    #[inline]
    pub const fn tick_seconds(&self) -> f64 {
        self.tick_seconds
    }

    #[inline]
    pub const fn pid_state(&self) -> &PidState {
        self.speed.state()
    }

    #[inline]
    pub const fn emergency_state(&self) -> &EmergencyState {
        self.emergency.state()
    }

    #[inline]
    pub const fn stats(&self) -> &TickStats {
        &self.stats
    }

    #[inline]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    #[inline]
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Status payload for the remote bus at the current tick.
    pub fn vehicle_parameters(&self) -> VehicleParameters {
        VehicleParameters {
            speed: self.vehicle.speed_kmh,
            speed_unit: SPEED_UNIT_KMH.to_string(),
            gear: self.gear.gear().label().to_string(),
            cruise_control: self.modes.state() == Mode::AdaptiveCruise,
            target_speed: self.target_kmh,
            mode: self.modes.state(),
            location: self.vehicle.position,
            heading: self.vehicle.heading_deg,
            timestamp_ms: (self.tick as f64 * self.tick_seconds * 1000.0).round() as u64,
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
