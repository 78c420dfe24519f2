//! Emergency-brake trigger causes.
//!
//! One bit per independent trigger condition so a single activation can
//! report every reason it fired for.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Reasons the emergency brake fired in a tick.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct EmergencyCause: u8 {
        /// Obstacle inside the speed-scaled trigger distance.
        const OBSTACLE_PROXIMITY = 0x01;
        /// Snapshot flagged the vehicle off a drivable lane.
        const BOUNDARY_VIOLATION = 0x02;
        /// Current lane narrower than the safe minimum.
        const NARROW_LANE        = 0x04;
        /// A forward probe left the road or found a collapsing lane.
        const LOOKAHEAD_BOUNDARY = 0x08;
        /// Collision with a vehicle, pedestrian or static obstacle.
        const COLLISION          = 0x10;
        /// Remote `emergency_stop` command.
        const REMOTE_STOP        = 0x20;
    }
}

impl EmergencyCause {
    /// Causes that always brake with maximum force.
    pub const FULL_FORCE_MASK: Self = Self::from_bits_truncate(
        Self::BOUNDARY_VIOLATION.bits()
            | Self::NARROW_LANE.bits()
            | Self::LOOKAHEAD_BOUNDARY.bits()
            | Self::COLLISION.bits()
            | Self::REMOTE_STOP.bits(),
    );

    /// Returns true if any full-force cause is set.
    #[inline]
    pub const fn requires_full_force(&self) -> bool {
        self.intersects(Self::FULL_FORCE_MASK)
    }
}

impl Default for EmergencyCause {
    fn default() -> Self {
        Self::empty()
    }
}
