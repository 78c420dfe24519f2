//! Command processing root.

pub mod arbitration;
