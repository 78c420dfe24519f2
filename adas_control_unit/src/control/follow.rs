//! Follow-distance regulator: obstacle gap → speed ceiling.

use adas_common::drive::config::FollowParameters;

/// Stateless mapping from obstacle distance to a speed cap.
#[derive(Debug, Clone, Copy)]
pub struct FollowDistanceRegulator {
    target_distance: f64,
    min_distance: f64,
}

impl FollowDistanceRegulator {
    pub fn new(params: &FollowParameters) -> Self {
        Self {
            target_distance: params.target_follow_distance,
            min_distance: params.min_follow_distance,
        }
    }

    /// Speed ceiling [km/h] for the given gap.
    ///
    /// - no obstacle, or a NaN or negative reading: `+∞` (fail open, the
    ///   same readings the emergency monitor ignores)
    /// - at or beyond the target gap: `target_kmh`
    /// - between min and target gap: linear interpolation from 0
    /// - inside the min gap: 0
    ///
    /// Non-decreasing in `distance_m` over valid readings for a fixed target.
    pub fn speed_ceiling(&self, distance_m: Option<f64>, target_kmh: f64) -> f64 {
        let Some(d) = distance_m.filter(|d| !d.is_nan() && *d >= 0.0) else {
            return f64::INFINITY;
        };
        if d >= self.target_distance {
            target_kmh
        } else if d >= self.min_distance {
            target_kmh * (d - self.min_distance) / (self.target_distance - self.min_distance)
        } else {
            0.0
        }
    }
}
