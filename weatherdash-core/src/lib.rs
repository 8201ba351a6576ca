//! Core library for the `weatherdash` dashboard.
//!
//! This crate defines:
//! - The OpenWeather data source adapter and forecast reduction
//! - The persisted recent-search history
//! - The dashboard state coordinator and its published state
//! - Pure presentation helpers (day/night, condition category, labels)
//! - Configuration & credentials handling
//!
//! It is used by `weatherdash-cli`, but any other front end can drive a
//! [`Dashboard`] and render its [`DashboardState`].

pub mod appearance;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod forecast;
pub mod history;
pub mod model;
pub mod provider;

pub use appearance::{ConditionCategory, condition_category, is_daytime};
pub use config::Config;
pub use dashboard::{Dashboard, DashboardOptions, DashboardState};
pub use error::WeatherError;
pub use history::{FileStorage, HistoryStore, MemoryStorage, Storage};
pub use model::{Coordinates, ForecastEntry, RequestStatus, Theme, WeatherSnapshot};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider, provider_from_config};
