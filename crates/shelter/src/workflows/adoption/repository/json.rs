use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::super::domain::{Adopter, Animal};
use super::{check_adopters, check_animals, RepositoryError, ShelterRepository};

/// Pretty-printed JSON files, one per record kind, inside a data directory.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    animals_path: PathBuf,
    adopters_path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            animals_path: data_dir.join("animals.json"),
            adopters_path: data_dir.join("adopters.json"),
        }
    }

    pub fn animals_path(&self) -> &Path {
        &self.animals_path
    }

    pub fn adopters_path(&self) -> &Path {
        &self.adopters_path
    }
}

impl ShelterRepository for JsonFileRepository {
    fn load_animals(&self) -> Result<Vec<Animal>, RepositoryError> {
        check_animals(&self.animals_path, read_records(&self.animals_path)?)
    }

    fn save_animals(&self, animals: &[Animal]) -> Result<(), RepositoryError> {
        write_records(&self.animals_path, animals)
    }

    fn load_adopters(&self) -> Result<Vec<Adopter>, RepositoryError> {
        check_adopters(&self.adopters_path, read_records(&self.adopters_path)?)
    }

    fn save_adopters(&self, adopters: &[Adopter]) -> Result<(), RepositoryError> {
        write_records(&self.adopters_path, adopters)
    }
}

fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, RepositoryError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(RepositoryError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(&raw).map_err(|source| RepositoryError::Serialization {
        path: path.to_path_buf(),
        source,
    })
}

/// Write through a sibling temp file and rename so a crash never leaves a torn file.
fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<(), RepositoryError> {
    let io_error = |source| RepositoryError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
    }

    let payload =
        serde_json::to_vec_pretty(records).map_err(|source| RepositoryError::Serialization {
            path: path.to_path_buf(),
            source,
        })?;

    let staging = path.with_extension("json.tmp");
    fs::write(&staging, payload).map_err(io_error)?;
    fs::rename(&staging, path).map_err(io_error)?;

    debug!(path = %path.display(), count = records.len(), "records saved");
    Ok(())
}
