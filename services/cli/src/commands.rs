use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use shelter::error::AppError;
use shelter::workflows::adoption::{
    AdopterId, AdopterRegistration, AnimalId, AnimalIntake, AnimalKind, AnimalStatus, CatTraits,
    DogTraits, EnqueueOutcome, ReservationOutcome, ShelterSummary, SweepOutcome,
};

use crate::infra::{split_tags, CliService, HousingArg, SizeArg};

#[derive(Args, Debug)]
pub(crate) struct AdmitDogArgs {
    #[arg(long)]
    pub(crate) name: String,
    #[arg(long, default_value = "Mixed")]
    pub(crate) breed: String,
    #[arg(long, value_enum)]
    pub(crate) size: SizeArg,
    /// Comma-separated temperament tags, e.g. "calm,playful"
    #[arg(long)]
    pub(crate) temperament: Option<String>,
    /// The dog needs frequent walks
    #[arg(long)]
    pub(crate) frequent_walks: bool,
}

#[derive(Args, Debug)]
pub(crate) struct AdmitCatArgs {
    #[arg(long)]
    pub(crate) name: String,
    #[arg(long, default_value = "Mixed")]
    pub(crate) breed: String,
    #[arg(long, value_enum, default_value = "small")]
    pub(crate) size: SizeArg,
    /// Comma-separated temperament tags
    #[arg(long)]
    pub(crate) temperament: Option<String>,
    /// Independence level from 0 to 10
    #[arg(long, default_value_t = 5)]
    pub(crate) independence: u8,
}

#[derive(Args, Debug)]
pub(crate) struct RegisterAdopterArgs {
    #[arg(long)]
    pub(crate) name: String,
    #[arg(long, default_value = "")]
    pub(crate) contact: String,
    #[arg(long)]
    pub(crate) age: u8,
    #[arg(long, value_enum)]
    pub(crate) housing: HousingArg,
    /// Usable floor area in m²
    #[arg(long)]
    pub(crate) area: f32,
    #[arg(long)]
    pub(crate) children: bool,
}

#[derive(Args, Debug)]
pub(crate) struct PairArgs {
    #[arg(long)]
    pub(crate) animal: u32,
    #[arg(long)]
    pub(crate) adopter: u32,
}

#[derive(Args, Debug)]
pub(crate) struct AnimalArgs {
    #[arg(long)]
    pub(crate) animal: u32,
}

#[derive(Args, Debug)]
pub(crate) struct WaitlistArgs {
    #[arg(long)]
    pub(crate) animal: u32,
    /// Emit JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ReturnArgs {
    #[arg(long)]
    pub(crate) animal: u32,
    #[arg(long)]
    pub(crate) reason: String,
}

#[derive(Args, Debug)]
pub(crate) struct VaccinateArgs {
    #[arg(long)]
    pub(crate) animal: u32,
    #[arg(long)]
    pub(crate) vaccine: String,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ReportArgs {
    /// Write the full roster to this CSV file
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
    /// Emit the summary as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn admit_dog(service: &mut CliService, args: AdmitDogArgs) -> Result<(), AppError> {
    let id = service.admit_animal(AnimalIntake {
        name: args.name,
        breed: args.breed,
        kind: AnimalKind::Dog(DogTraits {
            needs_frequent_walks: args.frequent_walks,
            ..DogTraits::default()
        }),
        size: args.size.into(),
        temperament: split_tags(args.temperament.as_deref()),
    })?;
    println!("admitted dog {id}");
    Ok(())
}

pub(crate) fn admit_cat(service: &mut CliService, args: AdmitCatArgs) -> Result<(), AppError> {
    let id = service.admit_animal(AnimalIntake {
        name: args.name,
        breed: args.breed,
        kind: AnimalKind::Cat(CatTraits {
            independence: args.independence,
            vaccinations: Vec::new(),
        }),
        size: args.size.into(),
        temperament: split_tags(args.temperament.as_deref()),
    })?;
    println!("admitted cat {id}");
    Ok(())
}

pub(crate) fn register_adopter(
    service: &mut CliService,
    args: RegisterAdopterArgs,
) -> Result<(), AppError> {
    let id = service.register_adopter(AdopterRegistration {
        name: args.name,
        contact: args.contact,
        age: args.age,
        housing: args.housing.into(),
        usable_area: args.area,
        has_children: args.children,
    })?;
    println!("registered adopter {id}");
    Ok(())
}

pub(crate) fn reserve(service: &mut CliService, args: PairArgs) -> Result<(), AppError> {
    let animal = AnimalId(args.animal);
    match service.reserve(animal, AdopterId(args.adopter))? {
        ReservationOutcome::Reserved {
            holder,
            reserved_at,
        } => println!(
            "animal {animal} reserved for adopter {holder} at {}",
            reserved_at.to_rfc3339()
        ),
        ReservationOutcome::AlreadyReserved { holder } => println!(
            "animal {animal} is already reserved by adopter {holder}; use `enqueue` to join the waitlist"
        ),
    }
    Ok(())
}

pub(crate) fn adopt(service: &mut CliService, args: PairArgs) -> Result<(), AppError> {
    let receipt = service.adopt(AnimalId(args.animal), AdopterId(args.adopter))?;
    println!(
        "animal {} adopted by adopter {}, fee {} ({} waitlist entries released)",
        receipt.animal, receipt.adopter, receipt.fee, receipt.released_waitlist
    );
    Ok(())
}

pub(crate) fn return_animal(service: &mut CliService, args: ReturnArgs) -> Result<(), AppError> {
    let outcome = service.return_animal(AnimalId(args.animal), &args.reason)?;
    println!(
        "animal {} returned, now {}",
        outcome.animal,
        outcome.status.label()
    );
    Ok(())
}

pub(crate) fn enqueue(service: &mut CliService, args: PairArgs) -> Result<(), AppError> {
    let animal = AnimalId(args.animal);
    let adopter = AdopterId(args.adopter);
    match service.enqueue(animal, adopter)? {
        EnqueueOutcome::Queued { position, score } => println!(
            "adopter {adopter} queued for animal {animal} at position {position} (score {}: {})",
            score.total,
            score.factors().join(", ")
        ),
        EnqueueOutcome::AlreadyQueued { position } => {
            println!("adopter {adopter} already queued for animal {animal} at position {position}")
        }
    }
    Ok(())
}

pub(crate) fn sweep(service: &mut CliService) -> Result<(), AppError> {
    let report = service.sweep_expired()?;
    if report.is_empty() {
        println!("no expired reservations");
        return Ok(());
    }
    for outcome in &report.outcomes {
        match outcome {
            SweepOutcome::Reassigned {
                animal,
                previous_holder,
                new_holder,
            } => println!(
                "animal {animal}: reservation moved from adopter {previous_holder} to adopter {new_holder}"
            ),
            SweepOutcome::Released {
                animal,
                previous_holder,
            } => println!(
                "animal {animal}: reservation of adopter {previous_holder} expired, animal available again"
            ),
        }
    }
    Ok(())
}

pub(crate) fn waitlist(service: &CliService, args: WaitlistArgs) -> Result<(), AppError> {
    let animal = AnimalId(args.animal);
    let rows = service.waitlist(animal)?;
    if args.json {
        println!("{}", to_json(&rows)?);
        return Ok(());
    }
    if rows.is_empty() {
        println!("waitlist for animal {animal} is empty");
        return Ok(());
    }
    println!("waitlist for animal {animal}:");
    for row in rows {
        println!(
            "  {}. {} ({}) score {} since {}",
            row.position,
            row.adopter_name,
            row.adopter,
            row.score,
            row.arrived_at.to_rfc3339()
        );
    }
    Ok(())
}

pub(crate) fn vaccinate(service: &mut CliService, args: VaccinateArgs) -> Result<(), AppError> {
    let animal = AnimalId(args.animal);
    service.vaccinate(animal, &args.vaccine)?;
    println!("animal {animal} vaccinated against {}", args.vaccine.trim());
    Ok(())
}

pub(crate) fn train(service: &mut CliService, args: AnimalArgs) -> Result<(), AppError> {
    let animal = AnimalId(args.animal);
    let level = service.train(animal)?;
    println!("animal {animal} trained, now at level {level}");
    Ok(())
}

pub(crate) fn report(service: &CliService, args: ReportArgs) -> Result<(), AppError> {
    let summary = service.summary();
    if args.json {
        println!("{}", to_json(&summary)?);
    } else {
        print_summary(&summary);
    }

    if let Some(path) = args.csv {
        let file = File::create(&path)?;
        service.export_roster(BufWriter::new(file))?;
        println!("roster written to {}", path.display());
    }
    Ok(())
}

fn print_summary(summary: &ShelterSummary) {
    println!(
        "{} animals, {} adopters, {} active reservations, {} queued candidates",
        summary.total_animals,
        summary.total_adopters,
        summary.active_reservations,
        summary.queued_candidates
    );
    for status in AnimalStatus::ordered() {
        println!("  {:<12} {}", status.label(), summary.count(status));
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(value)?)
}
