use crate::commands::{
    self, AdmitCatArgs, AdmitDogArgs, AnimalArgs, PairArgs, RegisterAdopterArgs, ReportArgs,
    ReturnArgs, VaccinateArgs, WaitlistArgs,
};
use crate::infra::open_service;
use clap::{Parser, Subcommand};
use shelter::config::AppConfig;
use shelter::error::AppError;
use shelter::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "shelter-cli",
    about = "Manage shelter intake, reservations, waitlists and adoptions from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Admit a dog to the shelter
    AdmitDog(AdmitDogArgs),
    /// Admit a cat to the shelter
    AdmitCat(AdmitCatArgs),
    /// Register a prospective adopter
    RegisterAdopter(RegisterAdopterArgs),
    /// Reserve an available animal for an adopter
    Reserve(PairArgs),
    /// Finalise an adoption and charge the fee
    Adopt(PairArgs),
    /// Take an adopted animal back with a stated reason
    Return(ReturnArgs),
    /// Put an adopter on an animal's waitlist
    Enqueue(PairArgs),
    /// Expire stale reservations and hand them to the next candidate
    Sweep,
    /// Show an animal's waitlist in priority order
    Waitlist(WaitlistArgs),
    /// Record a vaccination
    Vaccinate(VaccinateArgs),
    /// Record a training session (dogs only)
    Train(AnimalArgs),
    /// Print status counts and optionally export the roster as CSV
    Report(ReportArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    tracing::debug!(
        environment = ?config.environment,
        backend = ?config.storage.backend,
        data_dir = %config.storage.data_dir.display(),
        "configuration loaded"
    );

    let mut service = open_service(&config)?;

    match cli.command {
        Command::AdmitDog(args) => commands::admit_dog(&mut service, args),
        Command::AdmitCat(args) => commands::admit_cat(&mut service, args),
        Command::RegisterAdopter(args) => commands::register_adopter(&mut service, args),
        Command::Reserve(args) => commands::reserve(&mut service, args),
        Command::Adopt(args) => commands::adopt(&mut service, args),
        Command::Return(args) => commands::return_animal(&mut service, args),
        Command::Enqueue(args) => commands::enqueue(&mut service, args),
        Command::Sweep => commands::sweep(&mut service),
        Command::Waitlist(args) => commands::waitlist(&service, args),
        Command::Vaccinate(args) => commands::vaccinate(&mut service, args),
        Command::Train(args) => commands::train(&mut service, args),
        Command::Report(args) => commands::report(&service, args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_dog_intake_with_tags() {
        let cli = Cli::try_parse_from([
            "shelter-cli",
            "admit-dog",
            "--name",
            "Rex",
            "--breed",
            "Shepherd",
            "--size",
            "large",
            "--temperament",
            "calm,playful",
        ])
        .expect("arguments parse");

        match cli.command {
            Command::AdmitDog(args) => {
                assert_eq!(args.name, "Rex");
                assert_eq!(args.temperament.as_deref(), Some("calm,playful"));
            }
            other => panic!("expected admit-dog, got {other:?}"),
        }
    }

    #[test]
    fn report_accepts_optional_csv_path() {
        let cli = Cli::try_parse_from(["shelter-cli", "report", "--csv", "roster.csv"])
            .expect("arguments parse");
        match cli.command {
            Command::Report(args) => {
                assert_eq!(args.csv.as_deref(), Some(std::path::Path::new("roster.csv")))
            }
            other => panic!("expected report, got {other:?}"),
        }
    }
}
