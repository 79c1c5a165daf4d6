mod json;
mod sqlite;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::domain::{Adopter, AdopterId, Animal, AnimalId};
use super::lifecycle::AnimalStatus;

pub use json::JsonFileRepository;
pub use sqlite::SqliteRepository;

/// Storage abstraction for shelter records. Callers persist after every successful mutation.
///
/// Loads reject records that break the lifecycle invariants instead of handing them to
/// the engine.
pub trait ShelterRepository: Send + Sync {
    fn load_animals(&self) -> Result<Vec<Animal>, RepositoryError>;
    fn save_animals(&self, animals: &[Animal]) -> Result<(), RepositoryError>;
    fn load_adopters(&self) -> Result<Vec<Adopter>, RepositoryError>;
    fn save_adopters(&self, adopters: &[Adopter]) -> Result<(), RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("storage io failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed records in {path}: {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("database failure at {path}: {source}")]
    Database {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("inconsistent record {record} in {path}: {reason}")]
    InvalidRecord {
        path: PathBuf,
        record: String,
        reason: &'static str,
    },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    fn invalid_animal(path: &Path, id: AnimalId, reason: &'static str) -> Self {
        Self::InvalidRecord {
            path: path.to_path_buf(),
            record: format!("animal {id}"),
            reason,
        }
    }
}

/// Validate freshly loaded animals and restore their waitlist ordering.
///
/// `Reserved` and an active reservation must go together, and ids must be unique.
/// Waitlists are re-sorted, deduplicated and cleared of the current holder.
fn check_animals(path: &Path, mut animals: Vec<Animal>) -> Result<Vec<Animal>, RepositoryError> {
    let mut seen = HashSet::new();

    for animal in &mut animals {
        let id = animal.id;
        if !seen.insert(id) {
            return Err(RepositoryError::invalid_animal(path, id, "duplicate id"));
        }

        let reserved = animal.status == AnimalStatus::Reserved;
        match (reserved, animal.reservation) {
            (true, None) => {
                return Err(RepositoryError::invalid_animal(
                    path,
                    id,
                    "reserved status without a reservation",
                ))
            }
            (false, Some(_)) => {
                return Err(RepositoryError::invalid_animal(
                    path,
                    id,
                    "reservation held outside reserved status",
                ))
            }
            (true, Some(reservation)) => {
                animal.waitlist.remove(&reservation.holder);
            }
            (false, None) => {}
        }

        let dropped = animal.waitlist.normalize();
        if dropped > 0 {
            warn!(animal = %id, dropped, path = %path.display(), "duplicate waitlist entries dropped on load");
        }
    }

    Ok(animals)
}

fn check_adopters(path: &Path, adopters: Vec<Adopter>) -> Result<Vec<Adopter>, RepositoryError> {
    let mut seen: HashSet<AdopterId> = HashSet::new();
    if let Some(duplicate) = adopters.iter().find(|adopter| !seen.insert(adopter.id)) {
        return Err(RepositoryError::InvalidRecord {
            path: path.to_path_buf(),
            record: format!("adopter {}", duplicate.id),
            reason: "duplicate id",
        });
    }
    Ok(adopters)
}
