use std::sync::Arc;

use shelter::config::{AppConfig, StorageBackend, StorageConfig};
use shelter::error::AppError;
use shelter::workflows::adoption::{
    Adopter, Animal, AnimalSize, HousingType, JsonFileRepository, LogFileNotifier,
    NotificationHub, RepositoryError, ReservationManager, ShelterError, ShelterRepository,
    ShelterService, SqliteRepository, SystemClock, TieredFeeSchedule, TracingNotifier,
};

pub(crate) type CliService =
    ShelterService<ConfiguredRepository, TieredFeeSchedule, NotificationHub>;

/// Repository chosen by `SHELTER_STORAGE_BACKEND`.
pub(crate) enum ConfiguredRepository {
    Json(JsonFileRepository),
    Sqlite(SqliteRepository),
}

impl ConfiguredRepository {
    pub(crate) fn open(storage: &StorageConfig) -> Result<Self, RepositoryError> {
        match storage.backend {
            StorageBackend::Json => Ok(Self::Json(JsonFileRepository::new(&storage.data_dir))),
            StorageBackend::Sqlite => {
                SqliteRepository::open(storage.database_path()).map(Self::Sqlite)
            }
        }
    }

    fn inner(&self) -> &dyn ShelterRepository {
        match self {
            Self::Json(repository) => repository,
            Self::Sqlite(repository) => repository,
        }
    }
}

impl ShelterRepository for ConfiguredRepository {
    fn load_animals(&self) -> Result<Vec<Animal>, RepositoryError> {
        self.inner().load_animals()
    }

    fn save_animals(&self, animals: &[Animal]) -> Result<(), RepositoryError> {
        self.inner().save_animals(animals)
    }

    fn load_adopters(&self) -> Result<Vec<Adopter>, RepositoryError> {
        self.inner().load_adopters()
    }

    fn save_adopters(&self, adopters: &[Adopter]) -> Result<(), RepositoryError> {
        self.inner().save_adopters(adopters)
    }
}

/// Wire the service against the configured data directory: the chosen record store, the
/// event log and tracing as notification sinks, the tiered fee schedule and the wall clock.
pub(crate) fn open_service(config: &AppConfig) -> Result<CliService, AppError> {
    let repository =
        Arc::new(ConfiguredRepository::open(&config.storage).map_err(ShelterError::from)?);
    let notifier = NotificationHub::new()
        .with(TracingNotifier)
        .with(LogFileNotifier::new(config.storage.event_log()));
    let manager = ReservationManager::new(
        Arc::new(config.policy.clone()),
        Arc::new(TieredFeeSchedule::default()),
        Arc::new(notifier),
        Arc::new(SystemClock),
    );

    Ok(ShelterService::open(repository, manager)?)
}

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
pub(crate) enum SizeArg {
    Small,
    Medium,
    Large,
}

impl From<SizeArg> for AnimalSize {
    fn from(value: SizeArg) -> Self {
        match value {
            SizeArg::Small => AnimalSize::Small,
            SizeArg::Medium => AnimalSize::Medium,
            SizeArg::Large => AnimalSize::Large,
        }
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
pub(crate) enum HousingArg {
    House,
    Apartment,
}

impl From<HousingArg> for HousingType {
    fn from(value: HousingArg) -> Self {
        match value {
            HousingArg::House => HousingType::House,
            HousingArg::Apartment => HousingType::Apartment,
        }
    }
}

pub(crate) fn split_tags(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}
