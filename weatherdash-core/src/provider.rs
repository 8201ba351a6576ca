use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;

use crate::{
    Config, ForecastEntry, WeatherError, WeatherSnapshot,
    provider::openweather::OpenWeatherProvider,
};

pub mod openweather;

/// Prefixes shorter than this never reach the geocoding endpoint.
pub const MIN_SUGGESTION_CHARS: usize = 2;
pub const MAX_SUGGESTIONS: usize = 3;

pub fn is_suggestible(prefix: &str) -> bool {
    prefix.chars().count() >= MIN_SUGGESTION_CHARS
}

/// Read-only access to a weather data source.
///
/// Implementations never touch application state; every call returns a fresh value.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_current_by_name(&self, city: &str) -> Result<WeatherSnapshot, WeatherError>;

    async fn fetch_current_by_coordinates(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<WeatherSnapshot, WeatherError>;

    /// One entry per day, nearest to local midday, at most five, oldest first.
    async fn fetch_forecast(&self, city: &str) -> Result<Vec<ForecastEntry>, WeatherError>;

    /// City names starting with `prefix`; empty on short input or any failure.
    async fn fetch_suggestions(&self, prefix: &str) -> Vec<String>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    build_provider(config.api_key(), &config.base_url)
}

fn build_provider(
    api_key: Option<String>,
    base_url: &str,
) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = api_key.ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeather API key configured.\n\
             Hint: run `weatherdash configure` or set {}.",
            crate::config::API_KEY_ENV
        )
    })?;

    let provider: Arc<dyn WeatherProvider> =
        Arc::new(OpenWeatherProvider::new(&api_key, base_url)?);

    Ok(provider)
}
