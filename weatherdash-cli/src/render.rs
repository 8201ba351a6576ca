use std::fmt;

use chrono::{DateTime, Utc};
use weatherdash_core::{
    DashboardState, RequestStatus, Theme, WeatherSnapshot,
    appearance::{
        IconSize, TemperatureBand, condition_category, forecast_label, gauge_percent, icon_url,
        today_label, visibility_km,
    },
};

const WIDTH: usize = 44;

fn rule(theme: Theme) -> String {
    match theme {
        Theme::Light => "-".repeat(WIDTH),
        Theme::Dark => "=".repeat(WIDTH),
    }
}

/// Plain-text view of the whole dashboard at a given instant.
pub struct DashboardView<'a> {
    pub state: &'a DashboardState,
    pub now: DateTime<Utc>,
}

pub fn dashboard(state: &DashboardState, now: DateTime<Utc>) -> DashboardView<'_> {
    DashboardView { state, now }
}

impl fmt::Display for DashboardView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state;
        let rule = rule(state.theme);

        writeln!(f, "{rule}")?;

        match state.status() {
            RequestStatus::Loading => writeln!(f, "Loading...")?,
            RequestStatus::Error(message) => writeln!(f, "{message}")?,
            RequestStatus::Idle => {}
        }

        if let Some(weather) = &state.weather {
            current(f, weather, self.now)?;
        }

        if let Some(days) = &state.forecast {
            writeln!(f, "{rule}")?;
            writeln!(f, "5-Day Forecast")?;
            if days.is_empty() {
                writeln!(f, "  No forecast data available")?;
            }
            for day in days {
                writeln!(
                    f,
                    "  {:<13} {:>4.0}°C  {}",
                    forecast_label(day),
                    day.temperature_c,
                    day.description
                )?;
            }
        }

        if !state.history.is_empty() {
            writeln!(f, "{rule}")?;
            writeln!(f, "Recent: {}", state.history.join(", "))?;
        }

        writeln!(f, "{rule}")
    }
}

fn current(
    f: &mut fmt::Formatter<'_>,
    weather: &WeatherSnapshot,
    now: DateTime<Utc>,
) -> fmt::Result {
    let place = match &weather.country {
        Some(country) => format!("{}, {}", weather.name, country),
        None => weather.name.clone(),
    };
    let category = condition_category(Some(weather), now);
    let band = TemperatureBand::from_celsius(weather.temperature_c);

    writeln!(f, "{place} [{}]", category.as_str())?;
    writeln!(f, "{}", today_label(weather, now))?;
    writeln!(f, "{}", weather.description)?;
    writeln!(
        f,
        "{:.1}°C  {} ({:.0}% of gauge)",
        weather.temperature_c,
        band.label(),
        gauge_percent(weather.temperature_c)
    )?;
    writeln!(
        f,
        "Feels like {:.0}°C | Min: {:.0}°C | Max: {:.0}°C",
        weather.feels_like_c, weather.temp_min_c, weather.temp_max_c
    )?;
    writeln!(
        f,
        "Humidity {}% | Wind {:.1} m/s | Pressure {} hPa",
        weather.humidity_pct, weather.wind_speed_mps, weather.pressure_hpa
    )?;
    if let Some(km) = visibility_km(weather) {
        writeln!(f, "Visibility {km} km")?;
    }
    writeln!(f, "Location {}", weather.coordinates)?;
    writeln!(f, "Icon {}", icon_url(&weather.icon, IconSize::Large))
}

pub fn suggestions(names: &[String]) -> String {
    if names.is_empty() {
        return "No suggestions".to_string();
    }
    names.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use weatherdash_core::{Coordinates, ForecastEntry};

    fn snapshot() -> WeatherSnapshot {
        let sunrise = Utc.with_ymd_and_hms(2025, 5, 1, 4, 30, 0).unwrap();
        WeatherSnapshot {
            name: "London".into(),
            country: Some("GB".into()),
            coordinates: Coordinates { lat: 51.5085, lon: -0.1257 },
            condition: "Clouds".into(),
            description: "broken clouds".into(),
            icon: "04d".into(),
            temperature_c: 14.3,
            feels_like_c: 13.6,
            temp_min_c: 12.9,
            temp_max_c: 15.4,
            humidity_pct: 72,
            wind_speed_mps: 4.63,
            pressure_hpa: 1014,
            visibility_m: Some(10_000),
            sunrise,
            sunset: sunrise + chrono::Duration::hours(15),
            observed_at: sunrise,
            utc_offset_secs: 3600,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn renders_current_conditions_and_history() {
        let state = DashboardState {
            weather: Some(snapshot()),
            history: vec!["London".into(), "Paris".into()],
            ..DashboardState::default()
        };

        let text = dashboard(&state, now()).to_string();

        assert!(text.contains("London, GB [cloudy]"));
        assert!(text.contains("Thursday, May 1"));
        assert!(text.contains("14.3°C  Low"));
        assert!(text.contains("Visibility 10.0 km"));
        assert!(text.contains("https://openweathermap.org/img/wn/04d@4x.png"));
        assert!(text.contains("Recent: London, Paris"));
    }

    #[test]
    fn renders_forecast_rows() {
        let state = DashboardState {
            forecast: Some(vec![ForecastEntry {
                time: Utc.with_ymd_and_hms(2025, 5, 2, 12, 0, 0).unwrap(),
                utc_offset_secs: 0,
                temperature_c: 16.4,
                condition: "Rain".into(),
                description: "light rain".into(),
                icon: "10d".into(),
            }]),
            ..DashboardState::default()
        };

        let text = dashboard(&state, now()).to_string();

        assert!(text.contains("5-Day Forecast"));
        assert!(text.contains("May 2 (Fri)"));
        assert!(text.contains("light rain"));
    }

    #[test]
    fn renders_error_and_theme() {
        let state = DashboardState {
            error: Some("City not found or API error".into()),
            theme: Theme::Dark,
            ..DashboardState::default()
        };

        let text = dashboard(&state, now()).to_string();

        assert!(text.contains("City not found or API error"));
        assert!(text.starts_with(&"=".repeat(WIDTH)));
    }

    #[test]
    fn empty_suggestions_say_so() {
        assert_eq!(suggestions(&[]), "No suggestions");
        assert_eq!(
            suggestions(&["London".into(), "Londrina".into()]),
            "London\nLondrina"
        );
    }
}
