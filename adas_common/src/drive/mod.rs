//! Vehicle motion control shared types.
//!
//! Organized by domain: state enums, sensor snapshot, tick inputs and the
//! output command, emergency causes, the parameter table and telemetry.

pub mod command;
pub mod config;
pub mod safety;
pub mod sensor;
pub mod state;
pub mod telemetry;
