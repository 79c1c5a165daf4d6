use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::clock::Clock;
use super::domain::{Adopter, AdopterId, Animal, AnimalId};
use super::evaluation::{AdoptionEvaluator, CompatibilityScore, PolicyConfig, PolicyViolation};
use super::fees::{Fee, FeeStrategy};
use super::lifecycle::{AnimalStatus, InvalidTransition};
use super::notify::NotificationSink;

/// Health-related return reasons send the animal to quarantine. Checked first.
const HEALTH_KEYWORDS: [&str; 9] = [
    "sick", "ill", "disease", "vomit", "injured", "doente", "doença", "vômito", "ferido",
];
/// Aggression-related return reasons mark the animal unadoptable.
const AGGRESSION_KEYWORDS: [&str; 8] = [
    "bit", "aggressive", "attacked", "fierce", "mordeu", "agressivo", "atacou", "bravo",
];

/// Error raised by reservation, adoption, return and waitlist operations.
///
/// Every variant leaves the animal exactly as it was before the call.
#[derive(Debug, thiserror::Error)]
pub enum ReservationError {
    #[error(transparent)]
    Policy(#[from] PolicyViolation),
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
    #[error("adopter {adopter} {detail}")]
    DuplicateReservation {
        animal: AnimalId,
        adopter: AdopterId,
        detail: &'static str,
    },
    #[error("animal {animal} is reserved by adopter {holder}")]
    ReservationConflict { animal: AnimalId, holder: AdopterId },
}

/// Non-error result of a reservation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReservationOutcome {
    Reserved {
        holder: AdopterId,
        reserved_at: DateTime<Utc>,
    },
    /// Someone else holds the animal; the caller decides whether to enqueue.
    AlreadyReserved { holder: AdopterId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdoptionReceipt {
    pub animal: AnimalId,
    pub adopter: AdopterId,
    pub fee: Fee,
    pub adopted_at: DateTime<Utc>,
    /// Waitlist entries dropped because the animal left circulation.
    pub released_waitlist: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnDisposition {
    Quarantine,
    Unadoptable,
    Available,
}

impl ReturnDisposition {
    /// Case-insensitive substring match; health keywords win over aggression keywords.
    pub fn classify(reason: &str) -> Self {
        let reason = reason.to_lowercase();
        if HEALTH_KEYWORDS.iter().any(|keyword| reason.contains(keyword)) {
            Self::Quarantine
        } else if AGGRESSION_KEYWORDS
            .iter()
            .any(|keyword| reason.contains(keyword))
        {
            Self::Unadoptable
        } else {
            Self::Available
        }
    }

    pub const fn status(self) -> AnimalStatus {
        match self {
            Self::Quarantine => AnimalStatus::Quarantine,
            Self::Unadoptable => AnimalStatus::Unadoptable,
            Self::Available => AnimalStatus::Available,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReturnOutcome {
    pub animal: AnimalId,
    pub disposition: ReturnDisposition,
    pub status: AnimalStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EnqueueOutcome {
    Queued {
        position: usize,
        score: CompatibilityScore,
    },
    /// The adopter was already queued; nothing changed.
    AlreadyQueued { position: usize },
}

impl EnqueueOutcome {
    pub fn position(&self) -> usize {
        match self {
            EnqueueOutcome::Queued { position, .. } => *position,
            EnqueueOutcome::AlreadyQueued { position } => *position,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SweepOutcome {
    Reassigned {
        animal: AnimalId,
        previous_holder: AdopterId,
        new_holder: AdopterId,
    },
    Released {
        animal: AnimalId,
        previous_holder: AdopterId,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub outcomes: Vec<SweepOutcome>,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn reassigned(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, SweepOutcome::Reassigned { .. }))
            .count()
    }

    pub fn released(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, SweepOutcome::Released { .. }))
            .count()
    }
}

/// Orchestrates eligibility, scoring, the status machine and waitlists.
///
/// Holds no entity state; callers hand in the records to mutate and persist them afterwards.
pub struct ReservationManager<F, N> {
    evaluator: AdoptionEvaluator,
    fees: Arc<F>,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
}

impl<F, N> ReservationManager<F, N>
where
    F: FeeStrategy + 'static,
    N: NotificationSink + 'static,
{
    pub fn new(
        policy: Arc<PolicyConfig>,
        fees: Arc<F>,
        notifier: Arc<N>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            evaluator: AdoptionEvaluator::new(policy),
            fees,
            notifier,
            clock,
        }
    }

    pub fn policy(&self) -> &PolicyConfig {
        self.evaluator.config()
    }

    pub fn evaluator(&self) -> &AdoptionEvaluator {
        &self.evaluator
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Reserve an available animal for an eligible adopter.
    pub fn reserve(
        &self,
        animal: &mut Animal,
        adopter: &Adopter,
    ) -> Result<ReservationOutcome, ReservationError> {
        match animal.reservation_holder() {
            Some(holder) if holder == adopter.id => {
                return Err(ReservationError::DuplicateReservation {
                    animal: animal.id,
                    adopter: adopter.id,
                    detail: "already holds the reservation",
                });
            }
            Some(holder) if animal.status() == AnimalStatus::Reserved => {
                debug!(animal = %animal.id, %holder, requester = %adopter.id, "animal already reserved");
                return Ok(ReservationOutcome::AlreadyReserved { holder });
            }
            _ => {}
        }

        if animal.status() != AnimalStatus::Available {
            return Err(InvalidTransition {
                from: animal.status(),
                to: AnimalStatus::Reserved,
            }
            .into());
        }

        if let Err(violation) = self.evaluator.check(animal, adopter) {
            warn!(animal = %animal.id, adopter = %adopter.id, %violation, "reservation rejected");
            return Err(violation.into());
        }

        let now = self.clock.now();
        animal.place_reservation(adopter.id, now)?;
        animal.waitlist.remove(&adopter.id);

        info!(animal = %animal.id, adopter = %adopter.id, "animal reserved");
        Ok(ReservationOutcome::Reserved {
            holder: adopter.id,
            reserved_at: now,
        })
    }

    /// Send notices collected by a deferred operation once its change is durable.
    pub fn publish(&self, notices: Vec<String>) {
        for notice in notices {
            self.notifier.notify(&notice);
        }
    }

    /// Finalise an adoption, charging the fee computed by the fee strategy.
    pub fn adopt(
        &self,
        animal: &mut Animal,
        adopter: &Adopter,
    ) -> Result<AdoptionReceipt, ReservationError> {
        let mut notices = Vec::new();
        let receipt = self.adopt_deferred(animal, adopter, &mut notices)?;
        self.publish(notices);
        Ok(receipt)
    }

    /// Like [`Self::adopt`], but the notification is pushed onto `notices` instead of sent.
    pub fn adopt_deferred(
        &self,
        animal: &mut Animal,
        adopter: &Adopter,
        notices: &mut Vec<String>,
    ) -> Result<AdoptionReceipt, ReservationError> {
        if animal.status() == AnimalStatus::Reserved {
            if let Some(holder) = animal.reservation_holder() {
                if holder != adopter.id {
                    return Err(ReservationError::ReservationConflict {
                        animal: animal.id,
                        holder,
                    });
                }
            }
        }

        if !matches!(
            animal.status(),
            AnimalStatus::Available | AnimalStatus::Reserved
        ) {
            return Err(InvalidTransition {
                from: animal.status(),
                to: AnimalStatus::Adopted,
            }
            .into());
        }

        if let Err(violation) = self.evaluator.check(animal, adopter) {
            warn!(animal = %animal.id, adopter = %adopter.id, %violation, "adoption rejected");
            return Err(violation.into());
        }

        let fee = self.fees.compute_fee(animal, adopter);
        let now = self.clock.now();
        animal.transition_to(AnimalStatus::Adopted, now)?;
        let released_waitlist = animal.waitlist.clear();

        info!(animal = %animal.id, adopter = %adopter.id, %fee, released_waitlist, "adoption completed");
        notices.push(format!(
            "adoption completed: {} ({}) adopted by {} ({}), fee {}",
            animal.name, animal.id, adopter.name, adopter.id, fee
        ));

        Ok(AdoptionReceipt {
            animal: animal.id,
            adopter: adopter.id,
            fee,
            adopted_at: now,
            released_waitlist,
        })
    }

    /// Take an adopted animal back and route it by the stated reason.
    pub fn return_animal(
        &self,
        animal: &mut Animal,
        reason: &str,
    ) -> Result<ReturnOutcome, ReservationError> {
        if animal.status() != AnimalStatus::Adopted {
            return Err(InvalidTransition {
                from: animal.status(),
                to: AnimalStatus::Returned,
            }
            .into());
        }

        let disposition = ReturnDisposition::classify(reason);
        let now = self.clock.now();
        animal.transition_to(AnimalStatus::Returned, now)?;
        animal.record(now, format!("return reason: {}", reason.trim()));
        animal.transition_to(disposition.status(), now)?;

        info!(animal = %animal.id, ?disposition, "animal returned");
        Ok(ReturnOutcome {
            animal: animal.id,
            disposition,
            status: animal.status(),
        })
    }

    /// Put an eligible adopter on the animal's waitlist.
    ///
    /// Only animals still in circulation (`Available` or `Reserved`) accept queue entries.
    pub fn enqueue(
        &self,
        animal: &mut Animal,
        adopter: &Adopter,
    ) -> Result<EnqueueOutcome, ReservationError> {
        if animal.reservation_holder() == Some(adopter.id) {
            return Err(ReservationError::DuplicateReservation {
                animal: animal.id,
                adopter: adopter.id,
                detail: "already holds reservation, cannot queue",
            });
        }

        if !matches!(
            animal.status(),
            AnimalStatus::Available | AnimalStatus::Reserved
        ) {
            return Err(InvalidTransition {
                from: animal.status(),
                to: AnimalStatus::Reserved,
            }
            .into());
        }

        if let Err(violation) = self.evaluator.check(animal, adopter) {
            warn!(animal = %animal.id, adopter = %adopter.id, %violation, "waitlist enrollment rejected");
            return Err(violation.into());
        }

        if let Some(position) = animal.waitlist.position_of(&adopter.id) {
            return Ok(EnqueueOutcome::AlreadyQueued { position });
        }

        let score = self.evaluator.score(animal, adopter);
        let now = self.clock.now();
        animal.waitlist.add(adopter.id, score.total, now);
        let position = animal.waitlist.position_of(&adopter.id).unwrap_or_default();

        info!(animal = %animal.id, adopter = %adopter.id, score = score.total, position, "adopter queued");
        Ok(EnqueueOutcome::Queued { position, score })
    }

    /// Resolve every reservation older than `ttl` at `now`.
    ///
    /// Expired reservations pass to the best waitlist candidate or, with an empty waitlist,
    /// the animal is released back to `Available`. Animals are visited in iteration order.
    pub fn sweep_expired_reservations<'a, I>(
        &self,
        animals: I,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<SweepReport, ReservationError>
    where
        I: IntoIterator<Item = &'a mut Animal>,
    {
        let mut notices = Vec::new();
        let report = self.sweep_deferred(animals, now, ttl, &mut notices)?;
        self.publish(notices);
        Ok(report)
    }

    /// Like [`Self::sweep_expired_reservations`], collecting notifications into `notices`.
    pub fn sweep_deferred<'a, I>(
        &self,
        animals: I,
        now: DateTime<Utc>,
        ttl: Duration,
        notices: &mut Vec<String>,
    ) -> Result<SweepReport, ReservationError>
    where
        I: IntoIterator<Item = &'a mut Animal>,
    {
        let mut report = SweepReport::default();

        for animal in animals {
            if animal.status() != AnimalStatus::Reserved {
                continue;
            }
            let Some(reservation) = animal.reservation().copied() else {
                continue;
            };
            if now - reservation.reserved_at <= ttl {
                continue;
            }

            let previous_holder = reservation.holder;
            notices.push(format!(
                "reservation expired: {} ({}) held by adopter {}",
                animal.name, animal.id, previous_holder
            ));

            match animal.waitlist.next_candidate() {
                Some(candidate) => {
                    animal.reassign_reservation(candidate.adopter, now);
                    info!(animal = %animal.id, from = %previous_holder, to = %candidate.adopter, "reservation reassigned");
                    notices.push(format!(
                        "reservation reassigned: {} ({}) from adopter {} to adopter {}",
                        animal.name, animal.id, previous_holder, candidate.adopter
                    ));
                    report.outcomes.push(SweepOutcome::Reassigned {
                        animal: animal.id,
                        previous_holder,
                        new_holder: candidate.adopter,
                    });
                }
                None => {
                    animal.transition_to(AnimalStatus::Available, now)?;
                    info!(animal = %animal.id, from = %previous_holder, "reservation released");
                    notices.push(format!(
                        "reservation expired, released: {} ({}) is available again",
                        animal.name, animal.id
                    ));
                    report.outcomes.push(SweepOutcome::Released {
                        animal: animal.id,
                        previous_holder,
                    });
                }
            }
        }

        Ok(report)
    }
}
