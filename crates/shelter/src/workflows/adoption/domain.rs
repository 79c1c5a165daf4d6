use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lifecycle::AnimalStatus;
use super::waitlist::Waitlist;

/// Stable identifier for an animal in the shelter roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimalId(pub u32);

impl fmt::Display for AnimalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stable identifier for a registered adopter.
///
/// Reservation holders and waitlist membership are keyed by this id, never by display name,
/// so two adopters sharing a name do not collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdopterId(pub u32);

impl fmt::Display for AdopterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimalSize {
    Small,
    Medium,
    Large,
}

impl AnimalSize {
    pub const fn label(self) -> &'static str {
        match self {
            AnimalSize::Small => "small",
            AnimalSize::Medium => "medium",
            AnimalSize::Large => "large",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HousingType {
    House,
    Apartment,
}

impl HousingType {
    pub const fn label(self) -> &'static str {
        match self {
            HousingType::House => "house",
            HousingType::Apartment => "apartment",
        }
    }
}

/// Capability for animals that keep a vaccination record.
pub trait Vaccinable {
    fn vaccinations(&self) -> &[String];
    fn record_vaccination(&mut self, vaccine: &str);
}

/// Capability for animals that can be trained.
pub trait Trainable {
    fn training_level(&self) -> u8;
    /// Advance one training level, returning the new level.
    fn train(&mut self) -> u8;
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DogTraits {
    pub needs_frequent_walks: bool,
    #[serde(default)]
    pub training_level: u8,
    #[serde(default)]
    pub vaccinations: Vec<String>,
}

impl Vaccinable for DogTraits {
    fn vaccinations(&self) -> &[String] {
        &self.vaccinations
    }

    fn record_vaccination(&mut self, vaccine: &str) {
        self.vaccinations.push(vaccine.to_string());
    }
}

impl Trainable for DogTraits {
    fn training_level(&self) -> u8 {
        self.training_level
    }

    fn train(&mut self) -> u8 {
        self.training_level = self.training_level.saturating_add(1);
        self.training_level
    }
}

/// Cat-specific intake data. `independence` runs from 0 (needs company) to 10.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CatTraits {
    pub independence: u8,
    #[serde(default)]
    pub vaccinations: Vec<String>,
}

impl Vaccinable for CatTraits {
    fn vaccinations(&self) -> &[String] {
        &self.vaccinations
    }

    fn record_vaccination(&mut self, vaccine: &str) {
        self.vaccinations.push(vaccine.to_string());
    }
}

pub const MAX_CAT_INDEPENDENCE: u8 = 10;

/// Species variants, each carrying its own extra fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "species", rename_all = "snake_case")]
pub enum AnimalKind {
    Dog(DogTraits),
    Cat(CatTraits),
}

impl AnimalKind {
    pub const fn species(&self) -> &'static str {
        match self {
            AnimalKind::Dog(_) => "dog",
            AnimalKind::Cat(_) => "cat",
        }
    }

    pub fn as_vaccinable(&self) -> Option<&dyn Vaccinable> {
        match self {
            AnimalKind::Dog(traits) => Some(traits),
            AnimalKind::Cat(traits) => Some(traits),
        }
    }

    pub fn as_vaccinable_mut(&mut self) -> Option<&mut dyn Vaccinable> {
        match self {
            AnimalKind::Dog(traits) => Some(traits),
            AnimalKind::Cat(traits) => Some(traits),
        }
    }

    pub fn as_trainable(&self) -> Option<&dyn Trainable> {
        match self {
            AnimalKind::Dog(traits) => Some(traits),
            AnimalKind::Cat(_) => None,
        }
    }

    pub fn as_trainable_mut(&mut self) -> Option<&mut dyn Trainable> {
        match self {
            AnimalKind::Dog(traits) => Some(traits),
            AnimalKind::Cat(_) => None,
        }
    }
}

/// Timestamped, append-only history line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub at: DateTime<Utc>,
    pub event: String,
}

/// Active reservation. Holder and timestamp travel together so neither can exist alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub holder: AdopterId,
    pub reserved_at: DateTime<Utc>,
}

/// Intake form for a new animal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimalIntake {
    pub name: String,
    pub breed: String,
    pub kind: AnimalKind,
    pub size: AnimalSize,
    pub temperament: Vec<String>,
}

/// Shelter animal record.
///
/// Status, reservation, history and waitlist are only mutated through the lifecycle
/// transitions and `ReservationManager`; the descriptive fields are public.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    pub id: AnimalId,
    pub name: String,
    pub breed: String,
    pub kind: AnimalKind,
    pub size: AnimalSize,
    pub temperament: BTreeSet<String>,
    pub(crate) status: AnimalStatus,
    #[serde(default)]
    pub(crate) reservation: Option<Reservation>,
    #[serde(default)]
    pub(crate) history: Vec<HistoryEntry>,
    #[serde(default)]
    pub(crate) waitlist: Waitlist,
}

impl Animal {
    /// Admit an animal as `Available`, recording the intake in its history.
    pub fn admit(id: AnimalId, intake: AnimalIntake, at: DateTime<Utc>) -> Self {
        let temperament = intake
            .temperament
            .iter()
            .map(|tag| tag.trim())
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            id,
            name: intake.name.trim().to_string(),
            breed: intake.breed.trim().to_string(),
            kind: intake.kind,
            size: intake.size,
            temperament,
            status: AnimalStatus::Available,
            reservation: None,
            history: vec![HistoryEntry {
                at,
                event: "admitted to shelter".to_string(),
            }],
            waitlist: Waitlist::default(),
        }
    }

    pub fn status(&self) -> AnimalStatus {
        self.status
    }

    pub fn reservation(&self) -> Option<&Reservation> {
        self.reservation.as_ref()
    }

    pub fn reservation_holder(&self) -> Option<AdopterId> {
        self.reservation.map(|reservation| reservation.holder)
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn waitlist(&self) -> &Waitlist {
        &self.waitlist
    }

    /// Case-insensitive temperament lookup.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.temperament
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(tag))
    }

    pub fn vaccinate(&mut self, vaccine: &str, at: DateTime<Utc>) -> Result<(), CapabilityError> {
        let species = self.kind.species();
        let record = self
            .kind
            .as_vaccinable_mut()
            .ok_or(CapabilityError::Unsupported {
                capability: "vaccination",
                species,
            })?;
        record.record_vaccination(vaccine);
        self.record(at, format!("vaccinated against {vaccine}"));
        Ok(())
    }

    pub fn train(&mut self, at: DateTime<Utc>) -> Result<u8, CapabilityError> {
        let species = self.kind.species();
        let trainable = self
            .kind
            .as_trainable_mut()
            .ok_or(CapabilityError::Unsupported {
                capability: "training",
                species,
            })?;
        let level = trainable.train();
        self.record(at, format!("training session completed (level {level})"));
        Ok(level)
    }

    pub(crate) fn record(&mut self, at: DateTime<Utc>, event: String) {
        self.history.push(HistoryEntry { at, event });
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CapabilityError {
    #[error("{species} records do not support {capability}")]
    Unsupported {
        capability: &'static str,
        species: &'static str,
    },
}

/// Registration form for a prospective adopter.
#[derive(Debug, Clone, PartialEq)]
pub struct AdopterRegistration {
    pub name: String,
    pub contact: String,
    pub age: u8,
    pub housing: HousingType,
    pub usable_area: f32,
    pub has_children: bool,
}

/// Prospective adopter. Read-only from the lifecycle engine's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adopter {
    pub id: AdopterId,
    pub name: String,
    pub contact: String,
    pub age: u8,
    pub housing: HousingType,
    /// Usable floor area in m².
    pub usable_area: f32,
    pub has_children: bool,
}

impl Adopter {
    pub fn register(id: AdopterId, registration: AdopterRegistration) -> Self {
        Self {
            id,
            name: registration.name.trim().to_string(),
            contact: registration.contact.trim().to_string(),
            age: registration.age,
            housing: registration.housing,
            usable_area: registration.usable_area,
            has_children: registration.has_children,
        }
    }
}
