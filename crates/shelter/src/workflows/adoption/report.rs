use std::collections::BTreeMap;
use std::io;

use serde::Serialize;

use super::domain::{Adopter, Animal};
use super::lifecycle::AnimalStatus;

/// Headline counts for the shelter roster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShelterSummary {
    pub total_animals: usize,
    pub total_adopters: usize,
    pub by_status: BTreeMap<AnimalStatus, usize>,
    pub active_reservations: usize,
    pub queued_candidates: usize,
}

impl ShelterSummary {
    pub fn from_roster(animals: &[Animal], adopters: &[Adopter]) -> Self {
        let mut summary = ShelterSummary {
            total_animals: animals.len(),
            total_adopters: adopters.len(),
            ..Default::default()
        };

        for status in AnimalStatus::ordered() {
            summary.by_status.insert(status, 0);
        }

        for animal in animals {
            *summary.by_status.entry(animal.status()).or_default() += 1;
            if animal.reservation().is_some() {
                summary.active_reservations += 1;
            }
            summary.queued_candidates += animal.waitlist().len();
        }

        summary
    }

    pub fn count(&self, status: AnimalStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or_default()
    }
}

/// Flat CSV row for the roster export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterRow {
    pub id: u32,
    pub name: String,
    pub species: &'static str,
    pub breed: String,
    pub size: &'static str,
    pub status: &'static str,
    pub temperament: String,
    pub reserved_by: Option<u32>,
    pub reserved_at: Option<String>,
    pub waitlist: usize,
}

impl RosterRow {
    pub fn from_animal(animal: &Animal) -> Self {
        Self {
            id: animal.id.0,
            name: animal.name.clone(),
            species: animal.kind.species(),
            breed: animal.breed.clone(),
            size: animal.size.label(),
            status: animal.status().label(),
            temperament: animal
                .temperament
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(";"),
            reserved_by: animal.reservation_holder().map(|holder| holder.0),
            reserved_at: animal
                .reservation()
                .map(|reservation| reservation.reserved_at.to_rfc3339()),
            waitlist: animal.waitlist().len(),
        }
    }
}

pub(crate) fn write_roster<W: io::Write>(animals: &[Animal], writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for animal in animals {
        csv_writer.serialize(RosterRow::from_animal(animal))?;
    }
    csv_writer.flush()?;
    Ok(())
}
