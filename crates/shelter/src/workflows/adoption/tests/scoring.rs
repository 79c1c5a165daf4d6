use super::common::*;
use crate::workflows::adoption::domain::{AnimalSize, HousingType};
use crate::workflows::adoption::evaluation::{
    AdoptionEvaluator, CompatibilityFactor, PolicyConfig, ScoreWeights,
};
use std::sync::Arc;

fn evaluator() -> AdoptionEvaluator {
    AdoptionEvaluator::new(Arc::new(policy()))
}

#[test]
fn younger_adopter_misses_experience_weight() {
    let score = evaluator().score(
        &dog(1, AnimalSize::Medium, &["calm"]),
        &adopter(1, 28, HousingType::House),
    );

    assert_eq!(score.total, 80);
    assert!(!score
        .components
        .iter()
        .any(|component| component.factor == CompatibilityFactor::Experience));
}

#[test]
fn experienced_adopter_scores_full_marks() {
    let score = evaluator().score(
        &dog(1, AnimalSize::Medium, &["calm"]),
        &adopter(1, 33, HousingType::House),
    );

    assert_eq!(score.total, 100);
    assert_eq!(score.components.len(), 4);
    assert_eq!(score.factors().len(), 4);
}

#[test]
fn apartment_loses_housing_weight_only_for_large_animals() {
    let evaluator = evaluator();
    let flat = adopter(1, 28, HousingType::Apartment);

    assert_eq!(evaluator.score(&dog(1, AnimalSize::Small, &[]), &flat).total, 80);
    assert_eq!(evaluator.score(&dog(2, AnimalSize::Large, &[]), &flat).total, 40);
}

#[test]
fn wild_tag_with_children_loses_children_weight() {
    let evaluator = evaluator();
    let mut family = adopter(1, 40, HousingType::House);
    family.has_children = true;

    assert_eq!(evaluator.score(&cat(1, &["WILD"]), &family).total, 70);
    // only "wild" affects scoring; "aggressive" is an eligibility concern
    assert_eq!(evaluator.score(&cat(2, &["aggressive"]), &family).total, 100);
    assert_eq!(evaluator.score(&cat(3, &["arisco"]), &family).total, 70);
}

#[test]
fn total_is_clamped_to_one_hundred() {
    let config = PolicyConfig {
        score_weights: ScoreWeights {
            housing: 90,
            children: 90,
            experience: 90,
            energy: 90,
        },
        ..PolicyConfig::default()
    };
    let evaluator = AdoptionEvaluator::new(Arc::new(config));

    let score = evaluator.score(
        &dog(1, AnimalSize::Small, &[]),
        &adopter(1, 50, HousingType::House),
    );
    assert_eq!(score.total, 100);
}
