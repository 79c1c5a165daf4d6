use std::fs;

use chrono::{TimeZone, Utc};
use shelter::workflows::adoption::{
    Adopter, AdopterId, AdopterRegistration, Animal, AnimalId, AnimalIntake, AnimalKind,
    AnimalSize, CatTraits, HousingType, JsonFileRepository, RepositoryError, ShelterRepository,
};

fn sample_animal() -> Animal {
    let admitted = Utc
        .with_ymd_and_hms(2025, 3, 14, 12, 0, 0)
        .single()
        .expect("valid timestamp");
    let mut animal = Animal::admit(
        AnimalId(7),
        AnimalIntake {
            name: "Mia".to_string(),
            breed: "Siamese".to_string(),
            kind: AnimalKind::Cat(CatTraits {
                independence: 9,
                vaccinations: Vec::new(),
            }),
            size: AnimalSize::Small,
            temperament: vec!["shy".to_string()],
        },
        admitted,
    );
    animal
        .vaccinate("FVRCP", admitted)
        .expect("cats can be vaccinated");
    animal
}

#[test]
fn missing_files_load_as_empty_rosters() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repository = JsonFileRepository::new(dir.path().join("not-created-yet"));

    assert!(repository.load_animals().expect("animals").is_empty());
    assert!(repository.load_adopters().expect("adopters").is_empty());
}

#[test]
fn saved_records_reload_unchanged() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repository = JsonFileRepository::new(dir.path().join("data"));
    let animal = sample_animal();
    let adopter = Adopter::register(
        AdopterId(3),
        AdopterRegistration {
            name: "Ana".to_string(),
            contact: "ana@example.org".to_string(),
            age: 34,
            housing: HousingType::Apartment,
            usable_area: 48.5,
            has_children: true,
        },
    );

    repository
        .save_animals(std::slice::from_ref(&animal))
        .expect("animals saved");
    repository
        .save_adopters(std::slice::from_ref(&adopter))
        .expect("adopters saved");

    assert_eq!(repository.load_animals().expect("animals"), vec![animal]);
    assert_eq!(repository.load_adopters().expect("adopters"), vec![adopter]);
    assert!(!repository.animals_path().with_extension("json.tmp").exists());
}

#[test]
fn malformed_files_report_the_offending_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repository = JsonFileRepository::new(dir.path());
    fs::write(repository.animals_path(), "{ not json").expect("write garbage");

    match repository.load_animals() {
        Err(RepositoryError::Serialization { path, .. }) => {
            assert_eq!(path, repository.animals_path());
        }
        other => panic!("expected serialization error, got {other:?}"),
    }
}

fn write_tampered(repository: &JsonFileRepository, tamper: impl FnOnce(&mut serde_json::Value)) {
    let mut record = serde_json::to_value(sample_animal()).expect("animal serializes");
    tamper(&mut record);
    let payload = serde_json::to_string(&vec![record]).expect("payload serializes");
    fs::write(repository.animals_path(), payload).expect("write records");
}

#[test]
fn reserved_status_without_reservation_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repository = JsonFileRepository::new(dir.path());
    write_tampered(&repository, |record| {
        record["status"] = serde_json::json!("reserved");
    });

    match repository.load_animals() {
        Err(RepositoryError::InvalidRecord {
            path,
            record,
            reason,
        }) => {
            assert_eq!(path, repository.animals_path());
            assert_eq!(record, "animal #7");
            assert_eq!(reason, "reserved status without a reservation");
        }
        other => panic!("expected invalid record, got {other:?}"),
    }
}

#[test]
fn reservation_outside_reserved_status_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repository = JsonFileRepository::new(dir.path());
    write_tampered(&repository, |record| {
        record["reservation"] = serde_json::json!({
            "holder": 2,
            "reserved_at": "2025-03-15T10:00:00Z",
        });
    });

    assert!(matches!(
        repository.load_animals(),
        Err(RepositoryError::InvalidRecord {
            reason: "reservation held outside reserved status",
            ..
        })
    ));
}

#[test]
fn stored_waitlists_are_reordered_and_deduplicated() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repository = JsonFileRepository::new(dir.path());
    write_tampered(&repository, |record| {
        record["status"] = serde_json::json!("reserved");
        record["reservation"] = serde_json::json!({
            "holder": 1,
            "reserved_at": "2025-03-15T10:00:00Z",
        });
        record["waitlist"] = serde_json::json!([
            { "adopter": 2, "score": 50, "arrived_at": "2025-03-15T11:00:00Z" },
            { "adopter": 3, "score": 90, "arrived_at": "2025-03-15T12:00:00Z" },
            { "adopter": 2, "score": 50, "arrived_at": "2025-03-15T13:00:00Z" },
            { "adopter": 1, "score": 70, "arrived_at": "2025-03-15T09:00:00Z" },
        ]);
    });

    let animals = repository.load_animals().expect("animals load");
    let queue: Vec<(AdopterId, u8)> = animals[0]
        .waitlist()
        .entries()
        .iter()
        .map(|entry| (entry.adopter, entry.score))
        .collect();

    // holder dropped, best score first, earliest duplicate kept
    assert_eq!(queue, vec![(AdopterId(3), 90), (AdopterId(2), 50)]);
    assert_eq!(
        animals[0].waitlist().entry_for(&AdopterId(2)).map(|entry| entry.arrived_at),
        Some(
            Utc.with_ymd_and_hms(2025, 3, 15, 11, 0, 0)
                .single()
                .expect("valid timestamp")
        )
    );
}

#[test]
fn duplicate_animal_ids_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repository = JsonFileRepository::new(dir.path());
    let animal = sample_animal();
    fs::write(
        repository.animals_path(),
        serde_json::to_string(&vec![animal.clone(), animal]).expect("payload serializes"),
    )
    .expect("write records");

    assert!(matches!(
        repository.load_animals(),
        Err(RepositoryError::InvalidRecord {
            reason: "duplicate id",
            ..
        })
    ));
}
