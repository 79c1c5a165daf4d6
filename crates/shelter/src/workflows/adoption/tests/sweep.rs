use chrono::Duration;

use super::common::*;
use crate::workflows::adoption::domain::{AnimalSize, HousingType};
use crate::workflows::adoption::lifecycle::AnimalStatus;
use crate::workflows::adoption::manager::{EnqueueOutcome, SweepOutcome};
use crate::workflows::adoption::Clock;

#[test]
fn expired_reservation_passes_to_the_best_candidate() {
    let (manager, notifier, clock) = build_manager();
    let mut rex = dog(1, AnimalSize::Large, &[]);
    let ana = adopter(1, 30, HousingType::House);
    let beto = adopter(2, 28, HousingType::House);
    let clara = adopter(3, 55, HousingType::House);

    manager.reserve(&mut rex, &ana).expect("reservation");

    let queued_beto = manager.enqueue(&mut rex, &beto).expect("beto queued");
    match queued_beto {
        EnqueueOutcome::Queued { position, score } => {
            assert_eq!(position, 1);
            assert_eq!(score.total, 80);
        }
        other => panic!("expected a queued outcome, got {other:?}"),
    }

    clock.advance(Duration::minutes(5));
    let queued_clara = manager.enqueue(&mut rex, &clara).expect("clara queued");
    match queued_clara {
        EnqueueOutcome::Queued { position, score } => {
            assert_eq!(position, 1);
            assert_eq!(score.total, 100);
        }
        other => panic!("expected a queued outcome, got {other:?}"),
    }
    assert_eq!(rex.waitlist().position_of(&beto.id), Some(2));

    clock.advance(Duration::hours(49));
    let report = manager
        .sweep_expired_reservations(std::iter::once(&mut rex), clock.now(), Duration::hours(48))
        .expect("sweep runs");

    assert_eq!(
        report.outcomes,
        vec![SweepOutcome::Reassigned {
            animal: rex.id,
            previous_holder: ana.id,
            new_holder: clara.id,
        }]
    );
    assert_eq!(rex.status(), AnimalStatus::Reserved);
    let reservation = rex.reservation().expect("still reserved");
    assert_eq!(reservation.holder, clara.id);
    assert_eq!(reservation.reserved_at, clock.now());
    assert_eq!(rex.waitlist().len(), 1);
    assert_eq!(rex.waitlist().position_of(&beto.id), Some(1));

    let events = notifier.events();
    assert_eq!(events.len(), 2);
    assert!(events[0].starts_with("reservation expired:"));
    assert!(events[1].starts_with("reservation reassigned:"));
}

#[test]
fn expired_reservation_without_candidates_releases_the_animal() {
    let (manager, notifier, clock) = build_manager();
    let mut rex = dog(1, AnimalSize::Medium, &[]);
    let ana = adopter(1, 30, HousingType::House);
    manager.reserve(&mut rex, &ana).expect("reservation");

    clock.advance(Duration::hours(49));
    let report = manager
        .sweep_expired_reservations(std::iter::once(&mut rex), clock.now(), Duration::hours(48))
        .expect("sweep runs");

    assert_eq!(report.released(), 1);
    assert_eq!(report.reassigned(), 0);
    assert_eq!(rex.status(), AnimalStatus::Available);
    assert!(rex.reservation().is_none());
    let events = notifier.events();
    assert_eq!(events.len(), 2);
    assert!(events[1].contains("is available again"));
}

#[test]
fn reservations_within_the_ttl_are_left_alone() {
    let (manager, notifier, clock) = build_manager();
    let mut rex = dog(1, AnimalSize::Medium, &[]);
    manager
        .reserve(&mut rex, &adopter(1, 30, HousingType::House))
        .expect("reservation");
    let snapshot = rex.clone();

    clock.advance(Duration::hours(48));
    let report = manager
        .sweep_expired_reservations(std::iter::once(&mut rex), clock.now(), Duration::hours(48))
        .expect("sweep runs");

    assert!(report.is_empty());
    assert_eq!(rex, snapshot);
    assert!(notifier.events().is_empty());
}

#[test]
fn sweep_ignores_animals_that_are_not_reserved() {
    let (manager, notifier, clock) = build_manager();
    let mut available = dog(1, AnimalSize::Medium, &[]);
    let mut adopted = dog(2, AnimalSize::Medium, &[]);
    manager
        .adopt(&mut adopted, &adopter(1, 30, HousingType::House))
        .expect("adoption");
    let before = notifier.events().len();

    clock.advance(Duration::days(30));
    let report = manager
        .sweep_expired_reservations(
            [&mut available, &mut adopted],
            clock.now(),
            Duration::hours(48),
        )
        .expect("sweep runs");

    assert!(report.is_empty());
    assert_eq!(available.status(), AnimalStatus::Available);
    assert_eq!(adopted.status(), AnimalStatus::Adopted);
    assert_eq!(notifier.events().len(), before);
}

#[test]
fn sweep_visits_animals_in_iteration_order() {
    let (manager, _, clock) = build_manager();
    let ana = adopter(1, 30, HousingType::House);
    let mut roster = vec![
        dog(1, AnimalSize::Medium, &[]),
        dog(2, AnimalSize::Medium, &[]),
        dog(3, AnimalSize::Medium, &[]),
    ];
    for animal in roster.iter_mut() {
        manager.reserve(animal, &ana).expect("reservation");
    }
    manager
        .enqueue(&mut roster[1], &adopter(2, 40, HousingType::House))
        .expect("queued");

    clock.advance(Duration::hours(72));
    let report = manager
        .sweep_expired_reservations(roster.iter_mut(), clock.now(), Duration::hours(48))
        .expect("sweep runs");

    let visited: Vec<u32> = report
        .outcomes
        .iter()
        .map(|outcome| match outcome {
            SweepOutcome::Reassigned { animal, .. } | SweepOutcome::Released { animal, .. } => {
                animal.0
            }
        })
        .collect();
    assert_eq!(visited, vec![1, 2, 3]);
    assert_eq!(report.reassigned(), 1);
    assert_eq!(report.released(), 2);
}

#[test]
fn reassigned_reservation_gets_a_fresh_ttl() {
    let (manager, _, clock) = build_manager();
    let mut rex = dog(1, AnimalSize::Medium, &[]);
    manager
        .reserve(&mut rex, &adopter(1, 30, HousingType::House))
        .expect("reservation");
    manager
        .enqueue(&mut rex, &adopter(2, 40, HousingType::House))
        .expect("queued");

    clock.advance(Duration::hours(49));
    manager
        .sweep_expired_reservations(std::iter::once(&mut rex), clock.now(), Duration::hours(48))
        .expect("first sweep");

    clock.advance(Duration::hours(1));
    let report = manager
        .sweep_expired_reservations(std::iter::once(&mut rex), clock.now(), Duration::hours(48))
        .expect("second sweep");

    assert!(report.is_empty());
    assert_eq!(rex.reservation_holder().map(|holder| holder.0), Some(2));
}
