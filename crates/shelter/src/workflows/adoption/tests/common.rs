use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};

use crate::workflows::adoption::domain::{
    Adopter, AdopterId, AdopterRegistration, Animal, AnimalId, AnimalIntake, AnimalKind,
    AnimalSize, CatTraits, DogTraits, HousingType,
};
use crate::workflows::adoption::evaluation::PolicyConfig;
use crate::workflows::adoption::repository::{RepositoryError, ShelterRepository};
use crate::workflows::adoption::{
    FixedClock, NotificationSink, ReservationManager, ShelterService, TieredFeeSchedule,
};

pub(super) fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn policy() -> PolicyConfig {
    PolicyConfig::default()
}

pub(super) fn dog(id: u32, size: AnimalSize, temperament: &[&str]) -> Animal {
    Animal::admit(
        AnimalId(id),
        AnimalIntake {
            name: format!("Dog {id}"),
            breed: "Mixed".to_string(),
            kind: AnimalKind::Dog(DogTraits {
                needs_frequent_walks: true,
                ..DogTraits::default()
            }),
            size,
            temperament: temperament.iter().map(|tag| tag.to_string()).collect(),
        },
        epoch(),
    )
}

pub(super) fn cat(id: u32, temperament: &[&str]) -> Animal {
    Animal::admit(
        AnimalId(id),
        AnimalIntake {
            name: format!("Cat {id}"),
            breed: "Shorthair".to_string(),
            kind: AnimalKind::Cat(CatTraits {
                independence: 6,
                vaccinations: Vec::new(),
            }),
            size: AnimalSize::Small,
            temperament: temperament.iter().map(|tag| tag.to_string()).collect(),
        },
        epoch(),
    )
}

pub(super) fn registration(name: &str, age: u8, housing: HousingType) -> AdopterRegistration {
    AdopterRegistration {
        name: name.to_string(),
        contact: format!("{}@example.org", name.to_lowercase()),
        age,
        housing,
        usable_area: 120.0,
        has_children: false,
    }
}

pub(super) fn adopter(id: u32, age: u8, housing: HousingType) -> Adopter {
    Adopter::register(
        AdopterId(id),
        registration(&format!("Adopter {id}"), age, housing),
    )
}

#[derive(Default)]
pub(super) struct RecordingNotifier {
    events: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub(super) fn events(&self) -> Vec<String> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, event: &str) {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(event.to_string());
    }
}

pub(super) type TestManager = ReservationManager<TieredFeeSchedule, RecordingNotifier>;

pub(super) fn build_manager() -> (TestManager, Arc<RecordingNotifier>, Arc<FixedClock>) {
    build_manager_with(policy())
}

pub(super) fn build_manager_with(
    config: PolicyConfig,
) -> (TestManager, Arc<RecordingNotifier>, Arc<FixedClock>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let clock = Arc::new(FixedClock::new(epoch()));
    let manager = ReservationManager::new(
        Arc::new(config),
        Arc::new(TieredFeeSchedule::default()),
        notifier.clone(),
        clock.clone(),
    );
    (manager, notifier, clock)
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    animals: Mutex<Vec<Animal>>,
    adopters: Mutex<Vec<Adopter>>,
    saves: Mutex<usize>,
    failing: AtomicBool,
}

impl MemoryRepository {
    /// Make every following save fail with `Unavailable` until switched back.
    pub(super) fn fail_saves(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), RepositoryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("disk offline".to_string()));
        }
        Ok(())
    }

    pub(super) fn stored_animals(&self) -> Vec<Animal> {
        self.animals.lock().expect("repository mutex poisoned").clone()
    }

    pub(super) fn stored_adopters(&self) -> Vec<Adopter> {
        self.adopters.lock().expect("repository mutex poisoned").clone()
    }

    pub(super) fn save_count(&self) -> usize {
        *self.saves.lock().expect("repository mutex poisoned")
    }
}

impl ShelterRepository for MemoryRepository {
    fn load_animals(&self) -> Result<Vec<Animal>, RepositoryError> {
        Ok(self.stored_animals())
    }

    fn save_animals(&self, animals: &[Animal]) -> Result<(), RepositoryError> {
        self.check_available()?;
        *self.animals.lock().expect("repository mutex poisoned") = animals.to_vec();
        *self.saves.lock().expect("repository mutex poisoned") += 1;
        Ok(())
    }

    fn load_adopters(&self) -> Result<Vec<Adopter>, RepositoryError> {
        Ok(self.stored_adopters())
    }

    fn save_adopters(&self, adopters: &[Adopter]) -> Result<(), RepositoryError> {
        self.check_available()?;
        *self.adopters.lock().expect("repository mutex poisoned") = adopters.to_vec();
        *self.saves.lock().expect("repository mutex poisoned") += 1;
        Ok(())
    }
}

pub(super) struct UnavailableRepository;

impl ShelterRepository for UnavailableRepository {
    fn load_animals(&self) -> Result<Vec<Animal>, RepositoryError> {
        Ok(Vec::new())
    }

    fn save_animals(&self, _animals: &[Animal]) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("disk offline".to_string()))
    }

    fn load_adopters(&self) -> Result<Vec<Adopter>, RepositoryError> {
        Ok(Vec::new())
    }

    fn save_adopters(&self, _adopters: &[Adopter]) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("disk offline".to_string()))
    }
}

pub(super) type TestService<R> = ShelterService<R, TieredFeeSchedule, RecordingNotifier>;

pub(super) fn build_service() -> (
    TestService<MemoryRepository>,
    Arc<MemoryRepository>,
    Arc<RecordingNotifier>,
    Arc<FixedClock>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let (manager, notifier, clock) = build_manager();
    let service = ShelterService::open(repository.clone(), manager).expect("service opens");
    (service, repository, notifier, clock)
}
