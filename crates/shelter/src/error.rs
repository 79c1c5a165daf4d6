use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::adoption::ShelterError;

/// Failure surfaced by the command-line front end.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to render output: {0}")]
    Render(#[from] serde_json::Error),
    #[error(transparent)]
    Shelter(#[from] ShelterError),
}

impl AppError {
    /// Rejections caused by the caller's request rather than the environment.
    pub fn is_user_error(&self) -> bool {
        match self {
            AppError::Shelter(ShelterError::Repository(_) | ShelterError::Export(_)) => false,
            AppError::Shelter(_) => true,
            AppError::Config(_) => true,
            AppError::Telemetry(_) | AppError::Io(_) | AppError::Render(_) => false,
        }
    }
}
