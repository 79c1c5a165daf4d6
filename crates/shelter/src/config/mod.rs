use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::workflows::adoption::{PolicyConfig, ScoreWeights};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the shelter tooling.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub storage: StorageConfig,
    pub telemetry: TelemetryConfig,
    pub policy: PolicyConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );
        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let data_dir = env::var("SHELTER_DATA_DIR").unwrap_or_else(|_| "data".to_string());
        let backend = parse_var("SHELTER_STORAGE_BACKEND", StorageBackend::Json)?;

        let defaults = PolicyConfig::default();
        let policy = PolicyConfig {
            min_age: parse_var("SHELTER_MIN_AGE", defaults.min_age)?,
            min_area_large: parse_var("SHELTER_MIN_AREA_LARGE", defaults.min_area_large)?,
            reservation_ttl_hours: parse_var(
                "SHELTER_RESERVATION_TTL_HOURS",
                defaults.reservation_ttl_hours,
            )?,
            score_weights: ScoreWeights {
                housing: parse_var("SHELTER_WEIGHT_HOUSING", defaults.score_weights.housing)?,
                children: parse_var("SHELTER_WEIGHT_CHILDREN", defaults.score_weights.children)?,
                experience: parse_var(
                    "SHELTER_WEIGHT_EXPERIENCE",
                    defaults.score_weights.experience,
                )?,
                energy: parse_var("SHELTER_WEIGHT_ENERGY", defaults.score_weights.energy)?,
            },
        };

        if !policy.min_area_large.is_finite() || policy.min_area_large < 0.0 {
            return Err(ConfigError::OutOfRange {
                key: "SHELTER_MIN_AREA_LARGE",
                reason: "must be a non-negative area in m²",
            });
        }
        if policy.reservation_ttl_hours == 0 {
            return Err(ConfigError::OutOfRange {
                key: "SHELTER_RESERVATION_TTL_HOURS",
                reason: "must be at least one hour",
            });
        }

        Ok(Self {
            environment,
            storage: StorageConfig {
                data_dir: PathBuf::from(data_dir),
                backend,
            },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            policy,
        })
    }
}

fn parse_var<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Persistence format for shelter records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// `animals.json` and `adopters.json` in the data directory.
    Json,
    /// `shelter.db` in the data directory.
    Sqlite,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            other => Err(format!("unknown storage backend '{other}'")),
        }
    }
}

/// Where shelter records and the event log live.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub backend: StorageBackend,
}

impl StorageConfig {
    pub fn event_log(&self) -> PathBuf {
        self.data_dir.join("events.log")
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("shelter.db")
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    /// Colored output; only enabled for local development.
    pub ansi: bool,
}

#[derive(Debug)]
pub enum ConfigError {
    Invalid {
        key: &'static str,
        value: String,
    },
    OutOfRange {
        key: &'static str,
        reason: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid { key, value } => {
                write!(f, "{key} has an unparseable value '{value}'")
            }
            ConfigError::OutOfRange { key, reason } => write!(f, "{key} {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}
