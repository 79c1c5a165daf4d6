use std::fmt;
use std::io;
use std::mem;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::domain::{
    Adopter, AdopterId, AdopterRegistration, Animal, AnimalId, AnimalIntake, AnimalKind,
    CapabilityError, MAX_CAT_INDEPENDENCE,
};
use super::fees::FeeStrategy;
use super::manager::{
    AdoptionReceipt, EnqueueOutcome, ReservationError, ReservationManager, ReservationOutcome,
    ReturnOutcome, SweepReport,
};
use super::notify::NotificationSink;
use super::report::{self, ShelterSummary};
use super::repository::{RepositoryError, ShelterRepository};

const MAX_ADOPTER_AGE: u8 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Animal,
    Adopter,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Animal => f.write_str("animal"),
            EntityKind::Adopter => f.write_str("adopter"),
        }
    }
}

/// Error raised by the shelter service.
#[derive(Debug, thiserror::Error)]
pub enum ShelterError {
    #[error("{kind} #{id} not found")]
    NotFound { kind: EntityKind, id: u32 },
    #[error("invalid input: {0}")]
    Validation(String),
    #[error(transparent)]
    Capability(#[from] CapabilityError),
    #[error(transparent)]
    Reservation(#[from] ReservationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("roster export failed: {0}")]
    Export(#[from] csv::Error),
}

/// Waitlist row joined with the adopter record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaitlistView {
    pub position: usize,
    pub adopter: AdopterId,
    pub adopter_name: String,
    pub score: u8,
    pub arrived_at: DateTime<Utc>,
}

/// Service owning the loaded roster, delegating lifecycle work to the reservation manager
/// and persisting through the repository after each successful change.
///
/// Changes are applied to a staged copy first. The in-memory roster only takes the new
/// state once the repository accepts it, and notifications go out after that.
pub struct ShelterService<R, F, N> {
    repository: Arc<R>,
    manager: ReservationManager<F, N>,
    animals: Vec<Animal>,
    adopters: Vec<Adopter>,
}

impl<R, F, N> ShelterService<R, F, N>
where
    R: ShelterRepository + 'static,
    F: FeeStrategy + 'static,
    N: NotificationSink + 'static,
{
    /// Load the roster from the repository.
    pub fn open(
        repository: Arc<R>,
        manager: ReservationManager<F, N>,
    ) -> Result<Self, ShelterError> {
        let animals = repository.load_animals()?;
        let adopters = repository.load_adopters()?;
        info!(
            animals = animals.len(),
            adopters = adopters.len(),
            "shelter roster loaded"
        );

        Ok(Self {
            repository,
            manager,
            animals,
            adopters,
        })
    }

    pub fn manager(&self) -> &ReservationManager<F, N> {
        &self.manager
    }

    pub fn animals(&self) -> &[Animal] {
        &self.animals
    }

    pub fn adopters(&self) -> &[Adopter] {
        &self.adopters
    }

    pub fn animal(&self, id: AnimalId) -> Result<&Animal, ShelterError> {
        self.animals
            .iter()
            .find(|animal| animal.id == id)
            .ok_or(ShelterError::NotFound {
                kind: EntityKind::Animal,
                id: id.0,
            })
    }

    pub fn adopter(&self, id: AdopterId) -> Result<&Adopter, ShelterError> {
        find_adopter(&self.adopters, id)
    }

    pub fn admit_animal(&mut self, intake: AnimalIntake) -> Result<AnimalId, ShelterError> {
        validate_intake(&intake)?;

        let id = AnimalId(self.animals.iter().map(|animal| animal.id.0).max().unwrap_or(0) + 1);
        let animal = Animal::admit(id, intake, self.manager.now());
        info!(animal = %id, name = %animal.name, species = animal.kind.species(), "animal admitted");
        self.animals.push(animal);
        if let Err(err) = self.repository.save_animals(&self.animals) {
            self.animals.pop();
            return Err(err.into());
        }
        Ok(id)
    }

    pub fn register_adopter(
        &mut self,
        registration: AdopterRegistration,
    ) -> Result<AdopterId, ShelterError> {
        validate_registration(&registration)?;

        let id = AdopterId(
            self.adopters
                .iter()
                .map(|adopter| adopter.id.0)
                .max()
                .unwrap_or(0)
                + 1,
        );
        let adopter = Adopter::register(id, registration);
        info!(adopter = %id, name = %adopter.name, "adopter registered");
        self.adopters.push(adopter);
        if let Err(err) = self.repository.save_adopters(&self.adopters) {
            self.adopters.pop();
            return Err(err.into());
        }
        Ok(id)
    }

    pub fn reserve(
        &mut self,
        animal_id: AnimalId,
        adopter_id: AdopterId,
    ) -> Result<ReservationOutcome, ShelterError> {
        let adopter = find_adopter(&self.adopters, adopter_id)?;
        let index = self.animal_index(animal_id)?;
        let mut staged = self.animals[index].clone();

        let outcome = self.manager.reserve(&mut staged, adopter)?;
        if matches!(outcome, ReservationOutcome::Reserved { .. }) {
            self.commit_animal(index, staged)?;
        }
        Ok(outcome)
    }

    pub fn adopt(
        &mut self,
        animal_id: AnimalId,
        adopter_id: AdopterId,
    ) -> Result<AdoptionReceipt, ShelterError> {
        let adopter = find_adopter(&self.adopters, adopter_id)?;
        let index = self.animal_index(animal_id)?;
        let mut staged = self.animals[index].clone();

        let mut notices = Vec::new();
        let receipt = self
            .manager
            .adopt_deferred(&mut staged, adopter, &mut notices)?;
        self.commit_animal(index, staged)?;
        self.manager.publish(notices);
        Ok(receipt)
    }

    pub fn return_animal(
        &mut self,
        animal_id: AnimalId,
        reason: &str,
    ) -> Result<ReturnOutcome, ShelterError> {
        let index = self.animal_index(animal_id)?;
        let mut staged = self.animals[index].clone();

        let outcome = self.manager.return_animal(&mut staged, reason)?;
        self.commit_animal(index, staged)?;
        Ok(outcome)
    }

    pub fn enqueue(
        &mut self,
        animal_id: AnimalId,
        adopter_id: AdopterId,
    ) -> Result<EnqueueOutcome, ShelterError> {
        let adopter = find_adopter(&self.adopters, adopter_id)?;
        let index = self.animal_index(animal_id)?;
        let mut staged = self.animals[index].clone();

        let outcome = self.manager.enqueue(&mut staged, adopter)?;
        if matches!(outcome, EnqueueOutcome::Queued { .. }) {
            self.commit_animal(index, staged)?;
        }
        Ok(outcome)
    }

    /// Sweep with the current clock reading and the configured reservation TTL.
    pub fn sweep_expired(&mut self) -> Result<SweepReport, ShelterError> {
        let now = self.manager.now();
        let ttl = self.manager.policy().reservation_ttl();
        let mut staged = self.animals.clone();
        let mut notices = Vec::new();
        let report = self
            .manager
            .sweep_deferred(staged.iter_mut(), now, ttl, &mut notices)?;

        if !report.is_empty() {
            let previous = mem::replace(&mut self.animals, staged);
            if let Err(err) = self.repository.save_animals(&self.animals) {
                self.animals = previous;
                return Err(err.into());
            }
            self.manager.publish(notices);
        }
        info!(
            reassigned = report.reassigned(),
            released = report.released(),
            "reservation sweep finished"
        );
        Ok(report)
    }

    pub fn vaccinate(&mut self, animal_id: AnimalId, vaccine: &str) -> Result<(), ShelterError> {
        let vaccine = vaccine.trim();
        if vaccine.is_empty() {
            return Err(ShelterError::Validation(
                "vaccine name must not be empty".to_string(),
            ));
        }

        let now = self.manager.now();
        let index = self.animal_index(animal_id)?;
        let mut staged = self.animals[index].clone();
        staged.vaccinate(vaccine, now)?;
        self.commit_animal(index, staged)
    }

    pub fn train(&mut self, animal_id: AnimalId) -> Result<u8, ShelterError> {
        let now = self.manager.now();
        let index = self.animal_index(animal_id)?;
        let mut staged = self.animals[index].clone();
        let level = staged.train(now)?;
        self.commit_animal(index, staged)?;
        Ok(level)
    }

    pub fn waitlist(&self, animal_id: AnimalId) -> Result<Vec<WaitlistView>, ShelterError> {
        let animal = self.animal(animal_id)?;
        Ok(animal
            .waitlist()
            .entries()
            .iter()
            .enumerate()
            .map(|(index, entry)| WaitlistView {
                position: index + 1,
                adopter: entry.adopter,
                adopter_name: find_adopter(&self.adopters, entry.adopter)
                    .map(|adopter| adopter.name.clone())
                    .unwrap_or_else(|_| "(unknown adopter)".to_string()),
                score: entry.score,
                arrived_at: entry.arrived_at,
            })
            .collect())
    }

    pub fn summary(&self) -> ShelterSummary {
        ShelterSummary::from_roster(&self.animals, &self.adopters)
    }

    pub fn export_roster<W: io::Write>(&self, writer: W) -> Result<(), ShelterError> {
        report::write_roster(&self.animals, writer)?;
        Ok(())
    }

    fn animal_index(&self, id: AnimalId) -> Result<usize, ShelterError> {
        self.animals
            .iter()
            .position(|animal| animal.id == id)
            .ok_or(ShelterError::NotFound {
                kind: EntityKind::Animal,
                id: id.0,
            })
    }

    /// Swap the staged record in and persist; the previous record comes back on failure.
    fn commit_animal(&mut self, index: usize, staged: Animal) -> Result<(), ShelterError> {
        let previous = mem::replace(&mut self.animals[index], staged);
        if let Err(err) = self.repository.save_animals(&self.animals) {
            self.animals[index] = previous;
            return Err(err.into());
        }
        Ok(())
    }
}

fn find_adopter(adopters: &[Adopter], id: AdopterId) -> Result<&Adopter, ShelterError> {
    adopters
        .iter()
        .find(|adopter| adopter.id == id)
        .ok_or(ShelterError::NotFound {
            kind: EntityKind::Adopter,
            id: id.0,
        })
}

fn validate_intake(intake: &AnimalIntake) -> Result<(), ShelterError> {
    if intake.name.trim().is_empty() {
        return Err(ShelterError::Validation(
            "animal name must not be empty".to_string(),
        ));
    }
    if let AnimalKind::Cat(traits) = &intake.kind {
        if traits.independence > MAX_CAT_INDEPENDENCE {
            return Err(ShelterError::Validation(format!(
                "cat independence must be between 0 and {MAX_CAT_INDEPENDENCE}"
            )));
        }
    }
    Ok(())
}

fn validate_registration(registration: &AdopterRegistration) -> Result<(), ShelterError> {
    if registration.name.trim().is_empty() {
        return Err(ShelterError::Validation(
            "adopter name must not be empty".to_string(),
        ));
    }
    if registration.age == 0 || registration.age > MAX_ADOPTER_AGE {
        return Err(ShelterError::Validation(format!(
            "adopter age must be between 1 and {MAX_ADOPTER_AGE}"
        )));
    }
    if !registration.usable_area.is_finite() || registration.usable_area < 0.0 {
        return Err(ShelterError::Validation(
            "usable area must be a non-negative number of m²".to_string(),
        ));
    }
    Ok(())
}
