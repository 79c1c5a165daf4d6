use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::{Adopter, Animal, AnimalSize};

/// Monetary amount in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fee(pub u32);

impl Fee {
    pub const fn from_units(units: u32) -> Self {
        Self(units * 100)
    }

    pub const fn cents(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Fee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Fee calculation invoked at the adoption transition.
pub trait FeeStrategy: Send + Sync {
    fn compute_fee(&self, animal: &Animal, adopter: &Adopter) -> Fee;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeTier {
    Standard,
    Senior,
    LargeAnimal,
}

/// Default schedule: senior adopters first, then large animals, then the standard rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TieredFeeSchedule {
    pub standard: Fee,
    pub senior: Fee,
    pub large_animal: Fee,
    pub senior_age: u8,
}

impl Default for TieredFeeSchedule {
    fn default() -> Self {
        Self {
            standard: Fee::from_units(50),
            senior: Fee::from_units(20),
            large_animal: Fee::from_units(80),
            senior_age: 60,
        }
    }
}

impl TieredFeeSchedule {
    pub fn tier_for(&self, animal: &Animal, adopter: &Adopter) -> FeeTier {
        if adopter.age >= self.senior_age {
            FeeTier::Senior
        } else if animal.size == AnimalSize::Large {
            FeeTier::LargeAnimal
        } else {
            FeeTier::Standard
        }
    }
}

impl FeeStrategy for TieredFeeSchedule {
    fn compute_fee(&self, animal: &Animal, adopter: &Adopter) -> Fee {
        match self.tier_for(animal, adopter) {
            FeeTier::Standard => self.standard,
            FeeTier::Senior => self.senior,
            FeeTier::LargeAnimal => self.large_animal,
        }
    }
}
