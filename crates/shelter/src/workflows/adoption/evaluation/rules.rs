use super::super::domain::{Adopter, Animal, AnimalSize, HousingType};
use super::config::ScoreWeights;
use super::policy::WILD_TAGS;
use super::{CompatibilityFactor, CompatibilityScore, ScoreComponent};

/// Adopters older than this earn the experience weight.
const EXPERIENCE_AGE: u8 = 30;
const MAX_SCORE: u16 = 100;

pub(crate) fn score_compatibility(
    animal: &Animal,
    adopter: &Adopter,
    weights: &ScoreWeights,
) -> CompatibilityScore {
    let mut components = Vec::new();
    let mut total: u16 = 0;

    let housing_fits = animal.size != AnimalSize::Large || adopter.housing == HousingType::House;
    if housing_fits {
        components.push(ScoreComponent {
            factor: CompatibilityFactor::Housing,
            points: weights.housing,
            notes: format!(
                "{} suits a {} animal",
                adopter.housing.label(),
                animal.size.label()
            ),
        });
        total += u16::from(weights.housing);
    }

    let wild_with_children =
        adopter.has_children && WILD_TAGS.iter().any(|tag| animal.has_tag(tag));
    if !wild_with_children {
        components.push(ScoreComponent {
            factor: CompatibilityFactor::Children,
            points: weights.children,
            notes: if adopter.has_children {
                "temperament compatible with children".to_string()
            } else {
                "no children in household".to_string()
            },
        });
        total += u16::from(weights.children);
    }

    if adopter.age > EXPERIENCE_AGE {
        components.push(ScoreComponent {
            factor: CompatibilityFactor::Experience,
            points: weights.experience,
            notes: format!("adopter aged {} (over {EXPERIENCE_AGE})", adopter.age),
        });
        total += u16::from(weights.experience);
    }

    components.push(ScoreComponent {
        factor: CompatibilityFactor::Energy,
        points: weights.energy,
        notes: "baseline energy match".to_string(),
    });
    total += u16::from(weights.energy);

    CompatibilityScore {
        total: total.min(MAX_SCORE) as u8,
        components,
    }
}
