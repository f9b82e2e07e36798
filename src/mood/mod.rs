//! Mood scoring, trend aggregation and recommendations.
//!
//! Everything in here is synchronous and free of I/O. [`analyze`] turns a
//! batch of tracks into a [`MoodAnalysis`]; the async orchestration around it
//! lives in [`crate::pipeline`].

pub mod model;
pub mod recommend;
pub mod scorer;
pub mod summary;
pub mod trend;

use chrono::{DateTime, TimeZone};

pub use model::{AudioFeatures, MoodAnalysis, Recommendation, Track, TrackMood, TrackRef};
pub use summary::{MoodDirection, MoodReport};

/// Value used wherever there is not enough data for a real score.
pub const NEUTRAL: f64 = 0.5;

/// Length of the trend window in days.
pub const TREND_DAYS: usize = 7;

/// Builds the analysis for `tracks`, with the trend window ending on `now`'s
/// local date.
///
/// Overall mood and energy are means over every scored track. The trend only
/// sees tracks with a usable timestamp; the two statistics are independent.
pub fn analyze<Tz: TimeZone>(tracks: &[Track], now: &DateTime<Tz>) -> MoodAnalysis {
    let moods = scorer::score_tracks(tracks);
    if moods.is_empty() {
        return MoodAnalysis::neutral();
    }

    let count = moods.len() as f64;
    let overall_mood = moods.iter().map(|m| m.mood_score).sum::<f64>() / count;
    let average_energy = moods.iter().map(|m| m.energy).sum::<f64>() / count;

    MoodAnalysis {
        overall_mood,
        average_energy,
        mood_trend: trend::aggregate(&moods, now),
        tracks: moods,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn tracks_without_features_give_neutral_analysis() {
        let tracks = vec![Track {
            id: "1".into(),
            name: "Song".into(),
            artist: "Artist".into(),
            played_at: None,
            features: None,
        }];
        assert_eq!(analyze(&tracks, &Utc::now()), MoodAnalysis::neutral());
    }

    #[test]
    fn undated_tracks_still_count_towards_the_mean() {
        let features = AudioFeatures {
            valence: 0.8,
            energy: 0.7,
            danceability: 0.6,
            instrumentalness: 0.1,
            tempo: 120.0,
            mode: 1,
        };
        let tracks = vec![Track {
            id: "1".into(),
            name: "Song".into(),
            artist: "Artist".into(),
            played_at: Some("not a date".into()),
            features: Some(features),
        }];

        let analysis = analyze(&tracks, &Utc::now());
        assert!((analysis.overall_mood - 0.765).abs() < 1e-9);
        assert!((analysis.average_energy - 0.7).abs() < 1e-9);
        assert_eq!(analysis.mood_trend, [NEUTRAL; TREND_DAYS]);
        assert_eq!(analysis.tracks.len(), 1);
    }
}
