// Run configuration recognized by the beam assignment pipeline.

use serde::{Deserialize, Serialize};

/// Tunable parameters for a single assignment run.
///
/// Defaults reproduce the reference heuristic: 45 degrees of user-side
/// visibility, 10 degrees of same-color separation at a satellite, 32
/// beams per satellite, and a step budget of `2 * 32 * satellites`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub user_angle_degrees: f64,
    pub satellite_angle_degrees: f64,
    pub beams_per_satellite: usize,
    pub max_steps_multiplier: usize,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_angle_degrees: 45.0,
            satellite_angle_degrees: 10.0,
            beams_per_satellite: 32,
            max_steps_multiplier: 2,
            seed: None,
        }
    }
}

impl Config {
    pub fn user_angle_rad(&self) -> f64 {
        self.user_angle_degrees.to_radians()
    }

    pub fn max_steps(&self, satellite_count: usize) -> usize {
        self.max_steps_multiplier * self.beams_per_satellite * satellite_count
    }
}
