use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{AdopterId, Animal, Reservation};

/// Shelter status of an animal.
///
/// No state is terminal at the machine level. `Unadoptable` currently has no outgoing
/// transitions because the policy table grants none, not because the machine forbids them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimalStatus {
    Available,
    Reserved,
    Adopted,
    Returned,
    Quarantine,
    Unadoptable,
}

impl AnimalStatus {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Available,
            Self::Reserved,
            Self::Adopted,
            Self::Returned,
            Self::Quarantine,
            Self::Unadoptable,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Reserved => "reserved",
            Self::Adopted => "adopted",
            Self::Returned => "returned",
            Self::Quarantine => "quarantine",
            Self::Unadoptable => "unadoptable",
        }
    }

    /// Targets reachable from this status in one step.
    pub const fn allowed_targets(self) -> &'static [AnimalStatus] {
        match self {
            Self::Available => &[Self::Reserved, Self::Adopted, Self::Unadoptable],
            Self::Reserved => &[Self::Adopted, Self::Available],
            Self::Adopted => &[Self::Returned],
            Self::Returned => &[Self::Quarantine, Self::Available, Self::Unadoptable],
            Self::Quarantine => &[Self::Available, Self::Unadoptable],
            Self::Unadoptable => &[],
        }
    }

    pub fn can_transition_to(self, target: AnimalStatus) -> bool {
        self == target || self.allowed_targets().contains(&target)
    }
}

impl fmt::Display for AnimalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let upper = match self {
            Self::Available => "AVAILABLE",
            Self::Reserved => "RESERVED",
            Self::Adopted => "ADOPTED",
            Self::Returned => "RETURNED",
            Self::Quarantine => "QUARANTINE",
            Self::Unadoptable => "UNADOPTABLE",
        };
        f.write_str(upper)
    }
}

/// Rejected status change; the animal is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot move animal from {from} to {to}")]
pub struct InvalidTransition {
    pub from: AnimalStatus,
    pub to: AnimalStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Changed {
        from: AnimalStatus,
        to: AnimalStatus,
    },
    Unchanged,
}

impl Animal {
    /// Apply one status transition.
    ///
    /// Same-state requests succeed without touching history. Leaving `Reserved` clears the
    /// reservation. Entering `Reserved` goes through [`Animal::place_reservation`] so a
    /// holder is always recorded alongside the status.
    pub(crate) fn transition_to(
        &mut self,
        target: AnimalStatus,
        at: DateTime<Utc>,
    ) -> Result<TransitionOutcome, InvalidTransition> {
        let from = self.status;
        if from == target {
            return Ok(TransitionOutcome::Unchanged);
        }
        if !from.can_transition_to(target) {
            return Err(InvalidTransition { from, to: target });
        }

        self.status = target;
        self.record(at, format!("status {from}→{target}"));
        if from == AnimalStatus::Reserved {
            self.reservation = None;
        }

        debug!(animal = %self.id, %from, to = %target, "animal status changed");
        Ok(TransitionOutcome::Changed { from, to: target })
    }

    pub(crate) fn place_reservation(
        &mut self,
        holder: AdopterId,
        at: DateTime<Utc>,
    ) -> Result<TransitionOutcome, InvalidTransition> {
        let outcome = self.transition_to(AnimalStatus::Reserved, at)?;
        self.reservation = Some(Reservation {
            holder,
            reserved_at: at,
        });
        Ok(outcome)
    }

    /// Hand an existing reservation to a new holder without a status change.
    pub(crate) fn reassign_reservation(&mut self, holder: AdopterId, at: DateTime<Utc>) {
        self.reservation = Some(Reservation {
            holder,
            reserved_at: at,
        });
        self.record(at, format!("reservation reassigned to adopter {holder}"));
    }
}
