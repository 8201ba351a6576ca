//! Reduction of the provider's 3-hour forecast to one sample per day.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime, Timelike};

use crate::model::ForecastEntry;

pub const MAX_FORECAST_DAYS: usize = 5;

/// A day whose closest sample is further than this from noon has no midday entry.
const MIDDAY_TOLERANCE_MINUTES: i64 = 90;

/// Pick, for each local calendar day, the sample nearest to 12:00 local time.
///
/// Days without a sample inside the midday window are skipped, the result is
/// chronological and holds at most [`MAX_FORECAST_DAYS`] entries. Ties go to
/// the earlier sample.
pub fn select_midday(samples: &[ForecastEntry]) -> Vec<ForecastEntry> {
    let mut by_day: BTreeMap<NaiveDate, (i64, &ForecastEntry)> = BTreeMap::new();

    for sample in samples {
        let local = sample.local_time();
        let distance = minutes_from_noon(local.time());
        if distance > MIDDAY_TOLERANCE_MINUTES {
            continue;
        }

        by_day
            .entry(local.date_naive())
            .and_modify(|best| {
                if distance < best.0 || (distance == best.0 && sample.time < best.1.time) {
                    *best = (distance, sample);
                }
            })
            .or_insert((distance, sample));
    }

    by_day
        .into_values()
        .take(MAX_FORECAST_DAYS)
        .map(|(_, entry)| entry.clone())
        .collect()
}

fn minutes_from_noon(time: NaiveTime) -> i64 {
    let secs = i64::from(time.num_seconds_from_midnight());
    (secs - 12 * 3600).abs() / 60
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Datelike, TimeZone, Utc};

    fn sample(time: DateTime<Utc>, offset: i32) -> ForecastEntry {
        ForecastEntry {
            time,
            utc_offset_secs: offset,
            temperature_c: f64::from(time.hour()),
            condition: "Clouds".into(),
            description: "few clouds".into(),
            icon: "02d".into(),
        }
    }

    /// Six days of 3-hourly samples starting at 00:00 UTC on 2025-05-01.
    fn six_days(offset: i32) -> Vec<ForecastEntry> {
        let start = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
        (0..48)
            .map(|i| sample(start + chrono::Duration::hours(3 * i), offset))
            .collect()
    }

    #[test]
    fn picks_one_midday_entry_per_day_capped_at_five() {
        let picked = select_midday(&six_days(0));

        assert_eq!(picked.len(), 5);
        for (i, entry) in picked.iter().enumerate() {
            let local = entry.local_time();
            assert_eq!(local.hour(), 12);
            assert_eq!(local.day(), 1 + i as u32);
        }
        assert!(picked.windows(2).all(|w| w[0].time < w[1].time));
    }

    #[test]
    fn uses_the_location_offset_to_find_midday() {
        // UTC+2: the 09:00 and 12:00 UTC samples are 11:00 and 14:00 local.
        let picked = select_midday(&six_days(2 * 3600));

        assert_eq!(picked.len(), 5);
        assert!(picked.iter().all(|e| e.local_time().hour() == 11));
    }

    #[test]
    fn skips_days_without_a_midday_sample() {
        let start = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
        let samples: Vec<_> = [0, 3, 12, 24 + 18, 24 + 21, 48 + 12]
            .into_iter()
            .map(|h| sample(start + chrono::Duration::hours(h), 0))
            .collect();

        let picked = select_midday(&samples);

        assert_eq!(picked.len(), 2);
        assert_eq!(picked[0].local_time().day(), 1);
        assert_eq!(picked[1].local_time().day(), 3);
    }

    #[test]
    fn equidistant_samples_prefer_the_earlier_one() {
        // UTC+01:30 puts samples at 10:30 and 13:30 local, both 90 minutes off.
        let picked = select_midday(&six_days(3600 + 1800));

        assert!(!picked.is_empty());
        assert!(picked.iter().all(|e| e.local_time().hour() == 10));
    }

    #[test]
    fn empty_input_yields_empty_forecast() {
        assert!(select_midday(&[]).is_empty());
    }
}
