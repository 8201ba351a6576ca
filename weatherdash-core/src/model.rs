use std::{fmt, str::FromStr};

use anyhow::anyhow;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4},{:.4}", self.lat, self.lon)
    }
}

/// Parses `"lat,lon"`, e.g. `"51.5072,-0.1276"`.
impl FromStr for Coordinates {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| anyhow!("Expected coordinates as 'lat,lon', got '{s}'"))?;

        let lat: f64 = lat.trim().parse().map_err(|_| anyhow!("Invalid latitude '{lat}'"))?;
        let lon: f64 = lon.trim().parse().map_err(|_| anyhow!("Invalid longitude '{lon}'"))?;

        if !(-90.0..=90.0).contains(&lat) {
            return Err(anyhow!("Latitude {lat} is out of range -90..90"));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(anyhow!("Longitude {lon} is out of range -180..180"));
        }

        Ok(Self { lat, lon })
    }
}

/// Current conditions at one location, as reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub name: String,
    pub country: Option<String>,
    pub coordinates: Coordinates,
    /// Short condition group, e.g. "Clouds" or "Thunderstorm".
    pub condition: String,
    pub description: String,
    pub icon: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub pressure_hpa: u32,
    /// Metres; some stations do not report it.
    pub visibility_m: Option<u32>,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    pub observed_at: DateTime<Utc>,
    pub utc_offset_secs: i32,
}

impl WeatherSnapshot {
    pub fn utc_offset(&self) -> FixedOffset {
        offset_or_utc(self.utc_offset_secs)
    }
}

/// One representative forecast sample for a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub time: DateTime<Utc>,
    pub utc_offset_secs: i32,
    pub temperature_c: f64,
    pub condition: String,
    pub description: String,
    pub icon: String,
}

impl ForecastEntry {
    pub fn local_time(&self) -> DateTime<FixedOffset> {
        self.time.with_timezone(&offset_or_utc(self.utc_offset_secs))
    }
}

/// Provider offsets are whole seconds east of UTC; anything out of range falls back to UTC.
pub(crate) fn offset_or_utc(secs: i32) -> FixedOffset {
    FixedOffset::east_opt(secs).unwrap_or(Utc.fix())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestStatus {
    Idle,
    Loading,
    Error(String),
}
