//! Safety module root.

pub mod emergency;
