use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::AdopterId;

/// One queued candidate for an animal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistEntry {
    pub adopter: AdopterId,
    /// Compatibility score in `0..=100`.
    pub score: u8,
    pub arrived_at: DateTime<Utc>,
}

/// Per-animal queue ordered by score (highest first), then arrival (earliest first).
///
/// Holds at most one entry per adopter. Ties on both keys keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Waitlist {
    entries: Vec<WaitlistEntry>,
}

impl Waitlist {
    /// Queue an adopter. Returns `false` and leaves the queue untouched when the adopter
    /// is already present.
    pub fn add(&mut self, adopter: AdopterId, score: u8, arrived_at: DateTime<Utc>) -> bool {
        if self.contains(&adopter) {
            return false;
        }

        self.entries.push(WaitlistEntry {
            adopter,
            score,
            arrived_at,
        });
        self.sort_entries();
        true
    }

    /// Restore ordering and uniqueness on a queue read from storage.
    ///
    /// Entries are re-sorted, then only the highest-priority entry per adopter is kept.
    /// Returns how many duplicates were dropped.
    pub fn normalize(&mut self) -> usize {
        let before = self.entries.len();
        self.sort_entries();
        let mut seen = HashSet::new();
        self.entries.retain(|entry| seen.insert(entry.adopter));
        before - self.entries.len()
    }

    // stable sort keeps insertion order for full ties
    fn sort_entries(&mut self) {
        self.entries.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.arrived_at.cmp(&b.arrived_at))
        });
    }

    /// Remove and return the highest-priority entry.
    pub fn next_candidate(&mut self) -> Option<WaitlistEntry> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.remove(0))
        }
    }

    pub fn remove(&mut self, adopter: &AdopterId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.adopter != *adopter);
        self.entries.len() != before
    }

    /// Drop every entry, returning how many were queued.
    pub fn clear(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, adopter: &AdopterId) -> bool {
        self.entries.iter().any(|entry| entry.adopter == *adopter)
    }

    /// 1-indexed rank of the adopter, if queued.
    pub fn position_of(&self, adopter: &AdopterId) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.adopter == *adopter)
            .map(|index| index + 1)
    }

    pub fn entry_for(&self, adopter: &AdopterId) -> Option<&WaitlistEntry> {
        self.entries.iter().find(|entry| entry.adopter == *adopter)
    }

    pub fn entries(&self) -> &[WaitlistEntry] {
        &self.entries
    }
}
