use super::super::domain::{Adopter, Animal, AnimalSize, HousingType};
use super::config::PolicyConfig;

/// Unsocialised temperament, in English and Portuguese. Also costs the children score.
pub(super) const WILD_TAGS: [&str; 3] = ["wild", "arisco", "selvagem"];
const AGGRESSIVE_TAGS: [&str; 2] = ["aggressive", "agressivo"];

/// First eligibility rule an adopter failed. The message is stable and user facing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolicyViolation {
    #[error("adopter must be at least {min_age} years old")]
    Underage { min_age: u8, age: u8 },
    #[error("large animals require house-type housing")]
    HouseRequired,
    #[error("large animals require at least {min_area} m²")]
    InsufficientArea { min_area: f32, area: f32 },
    #[error("animals tagged wild/aggressive are not permitted in households with children")]
    TemperamentConflict { tag: String },
}

/// Binary gate run before every reservation, adoption and waitlist enrollment.
///
/// Rules run in a fixed order and the first failure wins.
pub(crate) fn check_eligibility(
    animal: &Animal,
    adopter: &Adopter,
    config: &PolicyConfig,
) -> Result<(), PolicyViolation> {
    if adopter.age < config.min_age {
        return Err(PolicyViolation::Underage {
            min_age: config.min_age,
            age: adopter.age,
        });
    }

    if animal.size == AnimalSize::Large {
        if adopter.housing != HousingType::House {
            return Err(PolicyViolation::HouseRequired);
        }
        if adopter.usable_area < config.min_area_large {
            return Err(PolicyViolation::InsufficientArea {
                min_area: config.min_area_large,
                area: adopter.usable_area,
            });
        }
    }

    if adopter.has_children {
        if let Some(tag) = animal.temperament.iter().find(|tag| {
            WILD_TAGS
                .iter()
                .chain(AGGRESSIVE_TAGS.iter())
                .any(|restricted| tag.eq_ignore_ascii_case(restricted))
        }) {
            return Err(PolicyViolation::TemperamentConflict { tag: tag.clone() });
        }
    }

    Ok(())
}
