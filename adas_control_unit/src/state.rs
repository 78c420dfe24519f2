//! State machine module root.
//!
//! Driving mode and gear direction.

pub mod gear;
pub mod mode;
