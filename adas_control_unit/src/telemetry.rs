//! Telemetry sinks.
//!
//! The loop publishes [`TelemetryEvent`]s fire-and-forget: `publish` cannot
//! fail and must never block the tick.

use std::sync::mpsc::{Receiver, SyncSender, TrySendError, sync_channel};

use adas_common::drive::state::Tick;
use adas_common::drive::telemetry::TelemetryEvent;
use tracing::{debug, info, warn};

/// Consumer of control-loop telemetry.
pub trait TelemetrySink {
    fn publish(&mut self, tick: Tick, event: TelemetryEvent);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl TelemetrySink for NullSink {
    #[inline]
    fn publish(&mut self, _tick: Tick, _event: TelemetryEvent) {}
}

/// Renders events as structured `tracing` records.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn publish(&mut self, tick: Tick, event: TelemetryEvent) {
        match event {
            TelemetryEvent::ModeChanged { from, to } => {
                info!(tick, ?from, ?to, "Mode changed");
            }
            TelemetryEvent::EmergencyBrakeActivated {
                causes,
                force,
                obstacle_distance_m,
            } => {
                warn!(tick, ?causes, force, ?obstacle_distance_m, "Emergency brake activated");
            }
            TelemetryEvent::EmergencyBrakeReleased { by_driver } => {
                info!(tick, by_driver, "Emergency brake released");
            }
            TelemetryEvent::ObstacleWarning { distance_m } => {
                debug!(tick, distance_m, "Obstacle in warning zone");
            }
            TelemetryEvent::GearChanged { from, to } => {
                info!(tick, from = from.label(), to = to.label(), "Gear changed");
            }
            TelemetryEvent::GearToggleRejected { reason } => {
                warn!(tick, reason, "Gear toggle rejected");
            }
            TelemetryEvent::TargetSpeedChanged { target_kmh } => {
                info!(tick, target_kmh, "Target speed changed");
            }
            TelemetryEvent::PidDiagnostics {
                error,
                integral,
                output,
            } => {
                debug!(tick, error, integral, output, "PID");
            }
            TelemetryEvent::EmergencyDisabled => {
                warn!(tick, "Emergency disable: controller state cleared");
            }
        }
    }
}

/// Bounded channel sink. Drops events when the consumer lags.
#[derive(Debug)]
pub struct ChannelSink {
    tx: SyncSender<(Tick, TelemetryEvent)>,
    dropped: u64,
}

impl ChannelSink {
    /// Create a sink and its receiving end with room for `capacity` events.
    pub fn new(capacity: usize) -> (Self, Receiver<(Tick, TelemetryEvent)>) {
        let (tx, rx) = sync_channel(capacity);
        (Self { tx, dropped: 0 }, rx)
    }

    /// Events dropped because the channel was full or disconnected.
    #[inline]
    pub const fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl TelemetrySink for ChannelSink {
    fn publish(&mut self, tick: Tick, event: TelemetryEvent) {
        match self.tx.try_send((tick, event)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                self.dropped += 1;
            }
        }
    }
}

/// In-memory sink, mostly for tests and replay summaries.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub events: Vec<(Tick, TelemetryEvent)>,
}

impl RecordingSink {
    /// Iterate over recorded events, dropping the tick.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &TelemetryEvent> {
        self.events.iter().map(|(_, e)| e)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl TelemetrySink for RecordingSink {
    fn publish(&mut self, tick: Tick, event: TelemetryEvent) {
        self.events.push((tick, event));
    }
}

impl<S: TelemetrySink + ?Sized> TelemetrySink for &mut S {
    #[inline]
    fn publish(&mut self, tick: Tick, event: TelemetryEvent) {
        (**self).publish(tick, event);
    }
}
