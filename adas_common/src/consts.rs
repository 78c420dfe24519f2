//! System-wide constants for the ADAS workspace.
//!
//! Single source of truth for unit conversions, tick timing and fixed-size
//! collection capacities. Tunable thresholds live in
//! [`ControlParameters`](crate::drive::config::ControlParameters), not here.

/// km/h per m/s.
pub const KMH_PER_MS: f64 = 3.6;

/// Default control tick period [s] (20 Hz fixed step).
pub const TICK_SECONDS: f64 = 0.05;

/// Shortest accepted tick period [s].
pub const TICK_SECONDS_MIN: f64 = 0.001;

/// Longest accepted tick period [s].
pub const TICK_SECONDS_MAX: f64 = 1.0;

/// Maximum number of forward lane probes carried by one snapshot.
pub const MAX_LANE_PROBES: usize = 8;
static_assertions::const_assert!(MAX_LANE_PROBES >= 4);

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config/adas.toml";
