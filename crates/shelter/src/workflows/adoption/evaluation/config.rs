use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Relative weight of each compatibility factor. Conventionally sums to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub housing: u8,
    pub children: u8,
    pub experience: u8,
    pub energy: u8,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            housing: 40,
            children: 30,
            experience: 20,
            energy: 10,
        }
    }
}

/// Adoption policy parameters, loaded once at startup and shared read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub min_age: u8,
    /// Minimum usable floor area (m²) for adopting a large animal.
    pub min_area_large: f32,
    pub reservation_ttl_hours: u32,
    pub score_weights: ScoreWeights,
}

impl PolicyConfig {
    pub fn reservation_ttl(&self) -> Duration {
        Duration::hours(i64::from(self.reservation_ttl_hours))
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            min_age: 18,
            min_area_large: 50.0,
            reservation_ttl_hours: 48,
            score_weights: ScoreWeights::default(),
        }
    }
}
