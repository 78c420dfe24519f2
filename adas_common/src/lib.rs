//! ADAS Common Library
//!
//! Shared types, constants and configuration loading for the ADAS control
//! workspace.
//!
//! # Module Structure
//!
//! - [`drive`] - Vehicle state, sensor snapshot, commands, parameters, telemetry
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - Unit conversions and fixed capacities
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use adas_common::prelude::*;
//!
//! let snapshot = SensorSnapshot::at_speed(42.0).with_obstacle(12.0);
//! assert_eq!(snapshot.obstacle_distance_m, Some(12.0));
//! ```

pub mod config;
pub mod consts;
pub mod drive;
pub mod prelude;
