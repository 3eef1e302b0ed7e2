//! Game balance
//!
//! Scoring, penalties and pacing constants, loadable from the `tuning`
//! section of the game config.

use serde::{Deserialize, Serialize};

/// How a goal attempt is scored
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HitPolicy {
    /// Hit window as a fraction of the goal height
    pub threshold_ratio: f32,
    /// A miss removes `power / miss_divisor`
    pub miss_divisor: f32,
    /// Score added for a perfect hit
    pub score_scale: f32,
    /// Power added for a perfect hit
    pub power_scale: f32,
    /// Game speed added per hit
    pub speed_ramp: f32,
}

impl Default for HitPolicy {
    fn default() -> Self {
        Self {
            threshold_ratio: 0.75,
            miss_divisor: 8.0,
            score_scale: 10.0,
            power_scale: 25.0,
            speed_ramp: 0.1,
        }
    }
}

impl HitPolicy {
    /// Power left after one miss (or one escaped button)
    pub fn penalize(&self, power: f32) -> f32 {
        (power - power / self.miss_divisor).min(crate::consts::POWER_MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tuning {
    pub hit: HitPolicy,
    /// Play ends once power drops below this
    pub game_over_power: f32,
    /// Delay before an automatic reload after game over
    pub reload_delay_ms: f64,
    /// Y coordinate new buttons appear at
    pub spawn_y: f32,
    /// Spawns are rejected within `congestion_factor * lane_size` of an active button
    pub congestion_factor: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            hit: HitPolicy::default(),
            game_over_power: 5.0,
            reload_delay_ms: 2000.0,
            spawn_y: -200.0,
            congestion_factor: 2.0,
        }
    }
}
