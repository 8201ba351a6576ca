//! Error taxonomy shared by the data source adapter and the history store.

use thiserror::Error;

/// Message shown to the user whenever a primary weather lookup fails.
///
/// Provider detail is logged, never surfaced.
pub const SEARCH_FAILED_MESSAGE: &str = "City not found or API error";

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("No location matches '{0}'")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected provider response: {0}")]
    Provider(String),

    #[error("Storage error: {0}")]
    Persistence(String),
}

impl WeatherError {
    /// Emit this error on the diagnostic channel at the level its kind deserves.
    pub fn log(&self, operation: &str) {
        match self {
            Self::NotFound(_) => tracing::info!(operation, "{}", self),
            Self::Network(_) => tracing::warn!(operation, "{}", self),
            Self::Provider(_) => tracing::error!(operation, "{}", self),
            Self::Persistence(_) => tracing::warn!(operation, "{}", self),
        }
    }
}
