//! Shelter adoption lifecycle: animal status machine, eligibility policy, compatibility
//! scoring, per-animal waitlists and the reservation expiry sweep.
//!
//! `ReservationManager` works on in-memory records handed to it by the caller.
//! `ShelterService` wraps it with id lookup, intake validation and persistence through a
//! JSON-file or SQLite repository.

pub mod clock;
pub mod domain;
pub(crate) mod evaluation;
pub mod fees;
pub mod lifecycle;
pub mod manager;
pub mod notify;
pub mod report;
pub mod repository;
pub mod service;
pub mod waitlist;

#[cfg(test)]
mod tests;

pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::{
    Adopter, AdopterId, AdopterRegistration, Animal, AnimalId, AnimalIntake, AnimalKind,
    AnimalSize, CapabilityError, CatTraits, DogTraits, HistoryEntry, HousingType, Reservation,
    Trainable, Vaccinable,
};
pub use evaluation::{
    AdoptionEvaluator, CompatibilityFactor, CompatibilityScore, PolicyConfig, PolicyViolation,
    ScoreComponent, ScoreWeights,
};
pub use fees::{Fee, FeeStrategy, FeeTier, TieredFeeSchedule};
pub use lifecycle::{AnimalStatus, InvalidTransition, TransitionOutcome};
pub use manager::{
    AdoptionReceipt, EnqueueOutcome, ReservationError, ReservationManager, ReservationOutcome,
    ReturnDisposition, ReturnOutcome, SweepOutcome, SweepReport,
};
pub use notify::{LogFileNotifier, NotificationHub, NotificationSink, TracingNotifier};
pub use report::{RosterRow, ShelterSummary};
pub use repository::{JsonFileRepository, RepositoryError, ShelterRepository, SqliteRepository};
pub use service::{EntityKind, ShelterError, ShelterService, WaitlistView};
pub use waitlist::{Waitlist, WaitlistEntry};
