//! Pure values derived from a snapshot for whatever renders the dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{ForecastEntry, WeatherSnapshot};

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

/// Temperature at which the gauge reads full.
const GAUGE_MAX_C: f64 = 45.0;

/// Whether `now` falls strictly between sunrise and sunset. Without a snapshot it is day.
pub fn is_daytime(snapshot: Option<&WeatherSnapshot>, now: DateTime<Utc>) -> bool {
    match snapshot {
        Some(s) => now > s.sunrise && now < s.sunset,
        None => true,
    }
}

/// Visual treatment for the current conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConditionCategory {
    ClearDay,
    ClearNight,
    Cloudy,
    Rainy,
    Stormy,
    Snowy,
    Foggy,
    Default,
}

impl ConditionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClearDay => "clear-day",
            Self::ClearNight => "clear-night",
            Self::Cloudy => "cloudy",
            Self::Rainy => "rainy",
            Self::Stormy => "stormy",
            Self::Snowy => "snowy",
            Self::Foggy => "foggy",
            Self::Default => "default",
        }
    }
}

/// Classify by case-insensitive substring match on the provider's condition text.
pub fn condition_category(snapshot: Option<&WeatherSnapshot>, now: DateTime<Utc>) -> ConditionCategory {
    let Some(s) = snapshot else {
        return ConditionCategory::Default;
    };

    let condition = s.condition.to_lowercase();
    let has = |needle: &str| condition.contains(needle);

    if has("clear") {
        if is_daytime(snapshot, now) {
            ConditionCategory::ClearDay
        } else {
            ConditionCategory::ClearNight
        }
    } else if has("cloud") {
        ConditionCategory::Cloudy
    } else if has("rain") || has("drizzle") {
        ConditionCategory::Rainy
    } else if has("thunderstorm") {
        ConditionCategory::Stormy
    } else if has("snow") {
        ConditionCategory::Snowy
    } else if has("mist") || has("fog") {
        ConditionCategory::Foggy
    } else {
        ConditionCategory::Default
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureBand {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl TemperatureBand {
    pub fn from_celsius(temp: f64) -> Self {
        if temp < 8.0 {
            Self::VeryLow
        } else if temp < 18.0 {
            Self::Low
        } else if temp < 28.0 {
            Self::Medium
        } else if temp < 38.0 {
            Self::High
        } else {
            Self::VeryHigh
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::VeryLow => "Very Low",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::VeryHigh => "Very High",
        }
    }
}

/// Fill level of the temperature gauge, 0..=100.
pub fn gauge_percent(temp: f64) -> f64 {
    (temp / GAUGE_MAX_C * 100.0).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconSize {
    Small,
    Large,
}

pub fn icon_url(icon: &str, size: IconSize) -> String {
    match size {
        IconSize::Small => format!("{ICON_BASE_URL}/{icon}.png"),
        IconSize::Large => format!("{ICON_BASE_URL}/{icon}@4x.png"),
    }
}

/// Label such as `"May 1 (Mon)"`, in the forecast location's local time.
pub fn forecast_label(entry: &ForecastEntry) -> String {
    entry.local_time().format("%b %-d (%a)").to_string()
}

/// Header date such as `"Monday, May 1"`, in the snapshot's local time.
pub fn today_label(snapshot: &WeatherSnapshot, now: DateTime<Utc>) -> String {
    now.with_timezone(&snapshot.utc_offset())
        .format("%A, %b %-d")
        .to_string()
}

/// Visibility in kilometres with one decimal, when the station reports it.
pub fn visibility_km(snapshot: &WeatherSnapshot) -> Option<String> {
    snapshot
        .visibility_m
        .map(|m| format!("{:.1}", f64::from(m) / 1000.0))
}
