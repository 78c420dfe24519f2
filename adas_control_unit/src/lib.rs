//! # ADAS Control Unit Library
//!
//! Per-tick vehicle motion control core for a driver-assistance prototype.
//! Given a sensor snapshot and the driver's inputs, each tick decides
//! throttle, brake, steering bias and gear.
//!
//! ## Components
//!
//! 1. **SpeedRegulator**: PID speed error → throttle/brake demand
//! 2. **FollowDistanceRegulator**: obstacle gap → speed ceiling
//! 3. **EmergencyBrakeMonitor**: proximity, boundary and collision override
//!    with cooldown latch
//! 4. **GearSafetyInterlock**: low-speed gated direction toggle, reverse
//!    throttle cap
//! 5. **ModeStateMachine**: Manual / AdaptiveCruise / Autonomous
//!
//! [`cycle::ControlLoop`] owns all of them and runs the fixed tick body;
//! [`command::arbitration`] merges the candidates with fixed priority.

pub mod command;
pub mod config;
pub mod control;
pub mod cycle;
pub mod replay;
pub mod safety;
pub mod state;
pub mod telemetry;
