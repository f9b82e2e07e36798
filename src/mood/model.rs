use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    mood::{NEUTRAL, TREND_DAYS},
    types::AudioFeaturesObject,
};

/// Audio descriptors the upstream attaches to a track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub valence: f64,
    pub energy: f64,
    pub danceability: f64,
    pub instrumentalness: f64,
    pub tempo: f64,
    /// 0 = minor, 1 = major.
    pub mode: u8,
}

impl AudioFeatures {
    /// `true` for a major key (`mode == 1`).
    pub fn is_major(&self) -> bool {
        self.mode == 1
    }
}

impl From<AudioFeaturesObject> for AudioFeatures {
    fn from(obj: AudioFeaturesObject) -> Self {
        AudioFeatures {
            valence: obj.valence,
            energy: obj.energy,
            danceability: obj.danceability,
            instrumentalness: obj.instrumentalness,
            tempo: obj.tempo,
            mode: obj.mode,
        }
    }
}

/// One play from the listening history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artist: String,
    /// Raw upstream timestamp, RFC 3339.
    pub played_at: Option<String>,
    pub features: Option<AudioFeatures>,
}

impl Track {
    /// Parsed play time, `None` when absent or unparsable.
    pub fn played_at_utc(&self) -> Option<DateTime<Utc>> {
        self.played_at
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|ts| ts.with_timezone(&Utc))
    }
}

/// Identity of a scored track, kept on [`TrackMood`] for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRef {
    pub id: String,
    pub name: String,
    pub artist: String,
}

impl From<&Track> for TrackRef {
    fn from(track: &Track) -> Self {
        TrackRef {
            id: track.id.clone(),
            name: track.name.clone(),
            artist: track.artist.clone(),
        }
    }
}

/// Score derived from a track that carried audio features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackMood {
    pub track: TrackRef,
    pub played_at: Option<DateTime<Utc>>,
    pub mood_score: f64,
    pub energy: f64,
    pub valence: f64,
}

/// Result of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodAnalysis {
    pub overall_mood: f64,
    pub average_energy: f64,
    /// Daily means, oldest first; the last entry is today.
    pub mood_trend: [f64; TREND_DAYS],
    pub tracks: Vec<TrackMood>,
}

impl MoodAnalysis {
    /// The analysis returned when there is nothing to score.
    pub fn neutral() -> Self {
        MoodAnalysis {
            overall_mood: NEUTRAL,
            average_energy: NEUTRAL,
            mood_trend: [NEUTRAL; TREND_DAYS],
            tracks: Vec::new(),
        }
    }

    /// `false` when nothing could be scored and every value is neutral.
    pub fn has_data(&self) -> bool {
        !self.tracks.is_empty()
    }
}

/// One suggestion from [`crate::mood::recommend`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    /// Fixed per tier. Not a probability.
    pub confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(played_at: Option<&str>) -> Track {
        Track {
            id: "1".into(),
            name: "Song".into(),
            artist: "Artist".into(),
            played_at: played_at.map(str::to_string),
            features: None,
        }
    }

    #[test]
    fn parses_upstream_timestamps() {
        let ts = track(Some("2025-03-27T10:00:00.123Z")).played_at_utc().unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-03-27T10:00:00.123+00:00");

        let offset = track(Some("2025-03-27T10:00:00+02:00")).played_at_utc().unwrap();
        assert_eq!(offset.to_rfc3339(), "2025-03-27T08:00:00+00:00");
    }

    #[test]
    fn bad_or_missing_timestamps_are_none() {
        assert!(track(Some("yesterday")).played_at_utc().is_none());
        assert!(track(None).played_at_utc().is_none());
    }

    #[test]
    fn neutral_analysis_has_full_trend() {
        let analysis = MoodAnalysis::neutral();
        assert_eq!(analysis.mood_trend, [0.5; 7]);
        assert!(!analysis.has_data());
    }
}
