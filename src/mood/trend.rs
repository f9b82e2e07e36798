//! Trailing seven-day mood trend.
//!
//! Plays are bucketed by the calendar date they fall on in the caller's time
//! zone. A day without plays is reported as [`NEUTRAL`]; it is never
//! interpolated or carried forward from a neighbouring day. Plays without a
//! usable timestamp, or outside the window, do not contribute.

use chrono::{DateTime, Duration, NaiveDate, TimeZone};

use crate::mood::{NEUTRAL, TREND_DAYS, model::TrackMood};

/// Which per-track value is averaged per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendMetric {
    #[default]
    MoodScore,
    Valence,
}

impl TrendMetric {
    fn value(self, mood: &TrackMood) -> f64 {
        match self {
            TrendMetric::MoodScore => mood.mood_score,
            TrendMetric::Valence => mood.valence,
        }
    }
}

/// The seven calendar days of the window ending on `today`, oldest first.
pub fn trend_days(today: NaiveDate) -> [NaiveDate; TREND_DAYS] {
    std::array::from_fn(|i| today - Duration::days((TREND_DAYS - 1 - i) as i64))
}

/// Daily mean mood score for the window ending on `now`'s local date.
pub fn aggregate<Tz: TimeZone>(moods: &[TrackMood], now: &DateTime<Tz>) -> [f64; TREND_DAYS] {
    aggregate_metric(moods, now, TrendMetric::MoodScore)
}

/// Daily mean of `metric` for the window ending on `now`'s local date.
pub fn aggregate_metric<Tz: TimeZone>(
    moods: &[TrackMood],
    now: &DateTime<Tz>,
    metric: TrendMetric,
) -> [f64; TREND_DAYS] {
    let tz = now.timezone();
    let today = now.date_naive();

    let mut sums = [0.0_f64; TREND_DAYS];
    let mut counts = [0_u32; TREND_DAYS];

    for mood in moods {
        let Some(played_at) = mood.played_at else {
            continue;
        };
        let day = played_at.with_timezone(&tz).date_naive();
        let age = (today - day).num_days();
        if !(0..TREND_DAYS as i64).contains(&age) {
            continue;
        }

        let slot = TREND_DAYS - 1 - age as usize;
        sums[slot] += metric.value(mood);
        counts[slot] += 1;
    }

    std::array::from_fn(|i| {
        if counts[i] == 0 {
            NEUTRAL
        } else {
            sums[i] / counts[i] as f64
        }
    })
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, Utc};

    use super::*;
    use crate::mood::model::TrackRef;

    fn mood_at(played_at: &str, score: f64) -> TrackMood {
        TrackMood {
            track: TrackRef {
                id: played_at.to_string(),
                name: "Song".into(),
                artist: "Artist".into(),
            },
            played_at: Some(
                DateTime::parse_from_rfc3339(played_at)
                    .unwrap()
                    .with_timezone(&Utc),
            ),
            mood_score: score,
            energy: 0.5,
            valence: 1.0 - score,
        }
    }

    fn now_utc(ts: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(ts).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn empty_input_is_neutral() {
        let trend = aggregate(&[], &now_utc("2025-03-27T12:00:00Z"));
        assert_eq!(trend, [0.5; 7]);
    }

    #[test]
    fn averages_per_day_and_fills_gaps_with_neutral() {
        let moods = vec![
            mood_at("2025-03-27T10:00:00Z", 0.8),
            mood_at("2025-03-27T09:00:00Z", 0.6),
            mood_at("2025-03-25T09:00:00Z", 0.2),
            mood_at("2025-03-21T09:00:00Z", 0.9),
        ];
        let trend = aggregate(&moods, &now_utc("2025-03-27T12:00:00Z"));

        assert_eq!(trend.len(), 7);
        assert!((trend[6] - 0.7).abs() < 1e-9);
        assert_eq!(trend[5], 0.5);
        assert!((trend[4] - 0.2).abs() < 1e-9);
        assert!((trend[0] - 0.9).abs() < 1e-9);
        assert_eq!(trend[1], 0.5);
    }

    #[test]
    fn plays_outside_window_or_without_timestamp_are_ignored() {
        let mut undated = mood_at("2025-03-27T10:00:00Z", 0.1);
        undated.played_at = None;
        let moods = vec![
            undated,
            mood_at("2025-03-20T10:00:00Z", 0.1),
            mood_at("2025-03-28T10:00:00Z", 0.1),
        ];
        let trend = aggregate(&moods, &now_utc("2025-03-27T12:00:00Z"));
        assert_eq!(trend, [0.5; 7]);
    }

    #[test]
    fn buckets_use_the_callers_local_date() {
        // 23:30 UTC on the 26th is already the 27th at UTC+2.
        let moods = vec![mood_at("2025-03-26T23:30:00Z", 0.9)];
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = now_utc("2025-03-27T08:00:00Z").with_timezone(&tz);

        let local = aggregate(&moods, &now);
        assert!((local[6] - 0.9).abs() < 1e-9);
        assert_eq!(local[5], 0.5);

        let utc = aggregate(&moods, &now_utc("2025-03-27T08:00:00Z"));
        assert_eq!(utc[6], 0.5);
        assert!((utc[5] - 0.9).abs() < 1e-9);
    }

    #[test]
    fn valence_metric_uses_valence() {
        let moods = vec![mood_at("2025-03-27T10:00:00Z", 0.8)];
        let trend = aggregate_metric(&moods, &now_utc("2025-03-27T12:00:00Z"), TrendMetric::Valence);
        assert!((trend[6] - 0.2).abs() < 1e-9);
    }

    #[test]
    fn window_days_are_consecutive_and_end_today() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let days = trend_days(today);
        assert_eq!(days[6], today);
        assert_eq!(days[0], NaiveDate::from_ymd_opt(2025, 2, 23).unwrap());
        for i in 1..7 {
            assert_eq!(days[i], days[i - 1] + Duration::days(1));
        }
    }
}
