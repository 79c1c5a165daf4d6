mod config;
mod policy;
mod rules;

use std::sync::Arc;

pub use config::{PolicyConfig, ScoreWeights};
pub use policy::PolicyViolation;

use super::domain::{Adopter, Animal};
use serde::{Deserialize, Serialize};

/// Stateless evaluator applying the shared policy to an animal/adopter pair.
#[derive(Debug, Clone)]
pub struct AdoptionEvaluator {
    config: Arc<PolicyConfig>,
}

impl AdoptionEvaluator {
    pub fn new(config: Arc<PolicyConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    pub fn check(&self, animal: &Animal, adopter: &Adopter) -> Result<(), PolicyViolation> {
        policy::check_eligibility(animal, adopter, &self.config)
    }

    /// Waitlist ranking only; never gates eligibility.
    pub fn score(&self, animal: &Animal, adopter: &Adopter) -> CompatibilityScore {
        rules::score_compatibility(animal, adopter, &self.config.score_weights)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompatibilityFactor {
    Housing,
    Children,
    Experience,
    Energy,
}

/// Discrete contribution to a score, kept for audits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: CompatibilityFactor,
    pub points: u8,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityScore {
    /// Weighted sum clamped to 100.
    pub total: u8,
    pub components: Vec<ScoreComponent>,
}

impl CompatibilityScore {
    pub fn factors(&self) -> Vec<String> {
        self.components
            .iter()
            .map(|component| format!("+{} {}", component.points, component.notes))
            .collect()
    }
}
