use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    error::WeatherError,
    forecast::select_midday,
    model::{Coordinates, ForecastEntry, WeatherSnapshot},
    provider::{MAX_SUGGESTIONS, is_suggestible},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

const REQUEST_TIMEOUT_SECS: u64 = 10;
const UNITS: &str = "metric";
const LANG: &str = "en";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    /// `base_url` is the scheme and host, e.g. [`DEFAULT_BASE_URL`]; paths are appended.
    pub fn new(api_key: &str, base_url: &str) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            api_key: api_key.to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            http,
        })
    }

    /// GET `path`, mapping 404 to [`WeatherError::NotFound`] for `subject`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        what: &str,
        subject: &str,
    ) -> Result<T, WeatherError> {
        let url = format!("{}{}", self.base_url, path);

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(WeatherError::NotFound(subject.to_owned()));
        }

        if !status.is_success() {
            return Err(WeatherError::Provider(format!(
                "OpenWeather {} request failed with status {}: {}",
                what,
                status,
                truncate_body(&body),
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            WeatherError::Provider(format!("Failed to parse OpenWeather {what} JSON: {e}"))
        })
    }

    async fn fetch_current(
        &self,
        query: &[(&str, &str)],
        subject: &str,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let mut params = query.to_vec();
        params.extend([("units", UNITS), ("lang", LANG)]);

        let parsed: OwCurrentResponse = self
            .get_json("/data/2.5/weather", &params, "current weather", subject)
            .await?;

        tracing::debug!(location = %parsed.name, "Fetched current weather");
        parsed.into_snapshot()
    }
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    pressure: u32,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    coord: OwCoord,
    weather: Vec<OwWeather>,
    main: OwMain,
    visibility: Option<u32>,
    wind: OwWind,
    sys: OwSys,
    dt: i64,
    #[serde(default)]
    timezone: i32,
}

impl OwCurrentResponse {
    fn into_snapshot(self) -> Result<WeatherSnapshot, WeatherError> {
        let weather = self.weather.into_iter().next().ok_or_else(|| {
            WeatherError::Provider(format!(
                "OpenWeather current weather for '{}' contained no condition",
                self.name
            ))
        })?;

        Ok(WeatherSnapshot {
            country: self.sys.country,
            coordinates: Coordinates {
                lat: self.coord.lat,
                lon: self.coord.lon,
            },
            condition: weather.main,
            description: weather.description,
            icon: weather.icon,
            temperature_c: self.main.temp,
            feels_like_c: self.main.feels_like,
            temp_min_c: self.main.temp_min,
            temp_max_c: self.main.temp_max,
            humidity_pct: self.main.humidity,
            wind_speed_mps: self.wind.speed,
            pressure_hpa: self.main.pressure,
            visibility_m: self.visibility,
            sunrise: unix_to_utc(self.sys.sunrise)?,
            sunset: unix_to_utc(self.sys.sunset)?,
            observed_at: unix_to_utc(self.dt)?,
            utc_offset_secs: self.timezone,
            name: self.name,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastSample {
    dt: i64,
    main: OwForecastMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    #[serde(default)]
    timezone: i32,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastSample>,
}

impl OwForecastResponse {
    fn samples(self) -> Vec<ForecastEntry> {
        let offset = self.city.timezone;

        self.list
            .into_iter()
            .filter_map(|sample| {
                let time = DateTime::from_timestamp(sample.dt, 0)?;
                let weather = sample.weather.into_iter().next()?;
                Some(ForecastEntry {
                    time,
                    utc_offset_secs: offset,
                    temperature_c: sample.main.temp,
                    condition: weather.main,
                    description: weather.description,
                    icon: weather.icon,
                })
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct OwGeoResult {
    name: String,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_current_by_name(&self, city: &str) -> Result<WeatherSnapshot, WeatherError> {
        self.fetch_current(&[("q", city)], city).await
    }

    async fn fetch_current_by_coordinates(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let (lat_s, lon_s) = (lat.to_string(), lon.to_string());
        let subject = format!("{lat},{lon}");

        self.fetch_current(&[("lat", lat_s.as_str()), ("lon", lon_s.as_str())], &subject)
            .await
    }

    async fn fetch_forecast(&self, city: &str) -> Result<Vec<ForecastEntry>, WeatherError> {
        let parsed: OwForecastResponse = self
            .get_json(
                "/data/2.5/forecast",
                &[("q", city), ("units", UNITS), ("lang", LANG)],
                "forecast",
                city,
            )
            .await?;

        let location = parsed.city.name.clone();
        let daily = select_midday(&parsed.samples());

        tracing::debug!(%location, days = daily.len(), "Fetched forecast");
        Ok(daily)
    }

    async fn fetch_suggestions(&self, prefix: &str) -> Vec<String> {
        if !is_suggestible(prefix) {
            return Vec::new();
        }

        let limit = MAX_SUGGESTIONS.to_string();
        let result: Result<Vec<OwGeoResult>, WeatherError> = self
            .get_json(
                "/geo/1.0/direct",
                &[("q", prefix), ("limit", limit.as_str())],
                "geocoding",
                prefix,
            )
            .await;

        match result {
            Ok(places) => places
                .into_iter()
                .map(|place| place.name)
                .take(MAX_SUGGESTIONS)
                .collect(),
            Err(err) => {
                tracing::warn!(%prefix, "Suggestion lookup failed: {}", err);
                Vec::new()
            }
        }
    }
}

fn unix_to_utc(ts: i64) -> Result<DateTime<Utc>, WeatherError> {
    DateTime::from_timestamp(ts, 0)
        .ok_or_else(|| WeatherError::Provider(format!("Timestamp {ts} is out of range")))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
