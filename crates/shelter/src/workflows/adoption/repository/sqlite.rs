use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::{params, Connection, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::super::domain::{Adopter, AdopterId, Animal, AnimalId, Reservation};
use super::{check_adopters, check_animals, RepositoryError, ShelterRepository};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS animals (
        id                 INTEGER PRIMARY KEY,
        name               TEXT NOT NULL,
        breed              TEXT NOT NULL,
        kind               TEXT NOT NULL,
        size               TEXT NOT NULL,
        temperament        TEXT NOT NULL,
        status             TEXT NOT NULL,
        reservation_holder INTEGER,
        reserved_at        TEXT,
        history            TEXT NOT NULL,
        waitlist           TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS adopters (
        id           INTEGER PRIMARY KEY,
        name         TEXT NOT NULL,
        contact      TEXT NOT NULL,
        age          INTEGER NOT NULL,
        housing      TEXT NOT NULL,
        usable_area  REAL NOT NULL,
        has_children INTEGER NOT NULL
    );
";

/// Single SQLite database holding one table per record kind.
///
/// Enum columns keep their serde labels; nested collections (species traits, temperament,
/// history, waitlist) are stored as JSON text.
pub struct SqliteRepository {
    path: PathBuf,
    conn: Mutex<Connection>,
}

impl SqliteRepository {
    /// Open (creating when missing) the database at `path` and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| RepositoryError::Io {
                    path: path.clone(),
                    source,
                })?;
            }
        }

        let conn = Connection::open(&path).map_err(database_error(&path))?;
        Self::with_connection(path, conn)
    }

    pub fn open_in_memory() -> Result<Self, RepositoryError> {
        let path = PathBuf::from(":memory:");
        let conn = Connection::open_in_memory().map_err(database_error(&path))?;
        Self::with_connection(path, conn)
    }

    fn with_connection(path: PathBuf, conn: Connection) -> Result<Self, RepositoryError> {
        conn.execute_batch(SCHEMA).map_err(database_error(&path))?;
        debug!(path = %path.display(), "sqlite schema ready");
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connection(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_animals(&self) -> Result<Vec<Animal>, RepositoryError> {
        let conn = self.connection();
        let mut stmt = conn
            .prepare(
                "SELECT id, name, breed, kind, size, temperament, status,
                        reservation_holder, reserved_at, history, waitlist
                 FROM animals ORDER BY id",
            )
            .map_err(database_error(&self.path))?;
        let rows = stmt
            .query_map([], AnimalRow::from_row)
            .map_err(database_error(&self.path))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(database_error(&self.path))?;

        rows.into_iter()
            .map(|row| row.into_animal(&self.path))
            .collect()
    }

    fn read_adopters(&self) -> Result<Vec<Adopter>, RepositoryError> {
        let conn = self.connection();
        let mut stmt = conn
            .prepare(
                "SELECT id, name, contact, age, housing, usable_area, has_children
                 FROM adopters ORDER BY id",
            )
            .map_err(database_error(&self.path))?;
        let rows = stmt
            .query_map([], AdopterRow::from_row)
            .map_err(database_error(&self.path))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(database_error(&self.path))?;

        rows.into_iter()
            .map(|row| row.into_adopter(&self.path))
            .collect()
    }
}

impl ShelterRepository for SqliteRepository {
    fn load_animals(&self) -> Result<Vec<Animal>, RepositoryError> {
        check_animals(&self.path, self.read_animals()?)
    }

    /// Replace the whole table inside one transaction.
    fn save_animals(&self, animals: &[Animal]) -> Result<(), RepositoryError> {
        let encoded = animals
            .iter()
            .map(|animal| AnimalRow::from_animal(animal, &self.path))
            .collect::<Result<Vec<_>, _>>()?;

        let mut conn = self.connection();
        let tx = conn.transaction().map_err(database_error(&self.path))?;
        tx.execute("DELETE FROM animals", [])
            .map_err(database_error(&self.path))?;
        {
            let mut insert = tx
                .prepare(
                    "INSERT INTO animals (id, name, breed, kind, size, temperament, status,
                                          reservation_holder, reserved_at, history, waitlist)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                )
                .map_err(database_error(&self.path))?;
            for row in &encoded {
                insert
                    .execute(params![
                        row.id,
                        row.name,
                        row.breed,
                        row.kind,
                        row.size,
                        row.temperament,
                        row.status,
                        row.reservation_holder,
                        row.reserved_at,
                        row.history,
                        row.waitlist,
                    ])
                    .map_err(database_error(&self.path))?;
            }
        }
        tx.commit().map_err(database_error(&self.path))?;

        debug!(path = %self.path.display(), count = animals.len(), "animals saved");
        Ok(())
    }

    fn load_adopters(&self) -> Result<Vec<Adopter>, RepositoryError> {
        check_adopters(&self.path, self.read_adopters()?)
    }

    fn save_adopters(&self, adopters: &[Adopter]) -> Result<(), RepositoryError> {
        let encoded = adopters
            .iter()
            .map(|adopter| AdopterRow::from_adopter(adopter, &self.path))
            .collect::<Result<Vec<_>, _>>()?;

        let mut conn = self.connection();
        let tx = conn.transaction().map_err(database_error(&self.path))?;
        tx.execute("DELETE FROM adopters", [])
            .map_err(database_error(&self.path))?;
        {
            let mut insert = tx
                .prepare(
                    "INSERT INTO adopters (id, name, contact, age, housing, usable_area, has_children)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                )
                .map_err(database_error(&self.path))?;
            for row in &encoded {
                insert
                    .execute(params![
                        row.id,
                        row.name,
                        row.contact,
                        row.age,
                        row.housing,
                        row.usable_area,
                        row.has_children,
                    ])
                    .map_err(database_error(&self.path))?;
            }
        }
        tx.commit().map_err(database_error(&self.path))?;

        debug!(path = %self.path.display(), count = adopters.len(), "adopters saved");
        Ok(())
    }
}

struct AnimalRow {
    id: u32,
    name: String,
    breed: String,
    kind: String,
    size: String,
    temperament: String,
    status: String,
    reservation_holder: Option<u32>,
    reserved_at: Option<String>,
    history: String,
    waitlist: String,
}

impl AnimalRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            breed: row.get(2)?,
            kind: row.get(3)?,
            size: row.get(4)?,
            temperament: row.get(5)?,
            status: row.get(6)?,
            reservation_holder: row.get(7)?,
            reserved_at: row.get(8)?,
            history: row.get(9)?,
            waitlist: row.get(10)?,
        })
    }

    fn from_animal(animal: &Animal, path: &Path) -> Result<Self, RepositoryError> {
        let encode = |source| serialization_error(path, source);
        Ok(Self {
            id: animal.id.0,
            name: animal.name.clone(),
            breed: animal.breed.clone(),
            kind: serde_json::to_string(&animal.kind).map_err(encode)?,
            size: label_of(&animal.size).map_err(encode)?,
            temperament: serde_json::to_string(&animal.temperament).map_err(encode)?,
            status: label_of(&animal.status).map_err(encode)?,
            reservation_holder: animal.reservation.map(|reservation| reservation.holder.0),
            reserved_at: animal
                .reservation
                .map(|reservation| label_of(&reservation.reserved_at))
                .transpose()
                .map_err(encode)?,
            history: serde_json::to_string(&animal.history).map_err(encode)?,
            waitlist: serde_json::to_string(&animal.waitlist).map_err(encode)?,
        })
    }

    fn into_animal(self, path: &Path) -> Result<Animal, RepositoryError> {
        let decode = |source| serialization_error(path, source);
        let id = AnimalId(self.id);
        let reservation = match (self.reservation_holder, self.reserved_at) {
            (Some(holder), Some(reserved_at)) => Some(Reservation {
                holder: AdopterId(holder),
                reserved_at: from_label(reserved_at).map_err(decode)?,
            }),
            (None, None) => None,
            _ => {
                return Err(RepositoryError::invalid_animal(
                    path,
                    id,
                    "reservation holder and timestamp must be stored together",
                ))
            }
        };

        Ok(Animal {
            id,
            name: self.name,
            breed: self.breed,
            kind: serde_json::from_str(&self.kind).map_err(decode)?,
            size: from_label(self.size).map_err(decode)?,
            temperament: serde_json::from_str(&self.temperament).map_err(decode)?,
            status: from_label(self.status).map_err(decode)?,
            reservation,
            history: serde_json::from_str(&self.history).map_err(decode)?,
            waitlist: serde_json::from_str(&self.waitlist).map_err(decode)?,
        })
    }
}

struct AdopterRow {
    id: u32,
    name: String,
    contact: String,
    age: u8,
    housing: String,
    usable_area: f64,
    has_children: bool,
}

impl AdopterRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            contact: row.get(2)?,
            age: row.get(3)?,
            housing: row.get(4)?,
            usable_area: row.get(5)?,
            has_children: row.get(6)?,
        })
    }

    fn from_adopter(adopter: &Adopter, path: &Path) -> Result<Self, RepositoryError> {
        let housing =
            label_of(&adopter.housing).map_err(|source| serialization_error(path, source))?;
        Ok(Self {
            id: adopter.id.0,
            name: adopter.name.clone(),
            contact: adopter.contact.clone(),
            age: adopter.age,
            housing,
            usable_area: f64::from(adopter.usable_area),
            has_children: adopter.has_children,
        })
    }

    fn into_adopter(self, path: &Path) -> Result<Adopter, RepositoryError> {
        let housing =
            from_label(self.housing).map_err(|source| serialization_error(path, source))?;
        Ok(Adopter {
            id: AdopterId(self.id),
            name: self.name,
            contact: self.contact,
            age: self.age,
            housing,
            // stored from an f32, so the narrowing is lossless
            usable_area: self.usable_area as f32,
            has_children: self.has_children,
        })
    }
}

/// Serde string form of a unit enum or timestamp, as used by the JSON files.
fn label_of<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    match serde_json::to_value(value)? {
        Value::String(label) => Ok(label),
        other => Ok(other.to_string()),
    }
}

fn from_label<T: DeserializeOwned>(label: String) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::String(label))
}

fn database_error(path: &Path) -> impl Fn(rusqlite::Error) -> RepositoryError + '_ {
    move |source| RepositoryError::Database {
        path: path.to_path_buf(),
        source,
    }
}

fn serialization_error(path: &Path, source: serde_json::Error) -> RepositoryError {
    RepositoryError::Serialization {
        path: path.to_path_buf(),
        source,
    }
}
