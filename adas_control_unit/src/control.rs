//! Longitudinal control: PID core, speed regulator, follow-distance ceiling.

pub mod follow;
pub mod pid;
pub mod speed;
