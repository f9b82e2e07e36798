//! Per-track mood score.
//!
//! The score is a weighted sum of the audio descriptors. Valence carries the
//! most weight, energy and danceability follow, and a major key adds a fixed
//! bonus because mode is binary.

use tracing::debug;

use crate::mood::model::{AudioFeatures, Track, TrackMood, TrackRef};

pub const VALENCE_WEIGHT: f64 = 0.5;
pub const ENERGY_WEIGHT: f64 = 0.25;
pub const DANCEABILITY_WEIGHT: f64 = 0.15;
pub const MAJOR_MODE_BONUS: f64 = 0.10;

/// Clamps to `[0, 1]`. NaN maps to 0.
pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Mood score of a single set of audio features, always within `[0, 1]`.
pub fn score(features: &AudioFeatures) -> f64 {
    let mode_bonus = if features.is_major() {
        MAJOR_MODE_BONUS
    } else {
        0.0
    };

    clamp01(
        VALENCE_WEIGHT * features.valence
            + ENERGY_WEIGHT * features.energy
            + DANCEABILITY_WEIGHT * features.danceability
            + mode_bonus,
    )
}

/// Scores a track, or `None` if it has no audio features.
pub fn score_track(track: &Track) -> Option<TrackMood> {
    let features = track.features.as_ref()?;
    Some(TrackMood {
        track: TrackRef::from(track),
        played_at: track.played_at_utc(),
        mood_score: score(features),
        energy: clamp01(features.energy),
        valence: clamp01(features.valence),
    })
}

/// Scores every track that carries features, preserving input order.
pub fn score_tracks(tracks: &[Track]) -> Vec<TrackMood> {
    tracks
        .iter()
        .filter_map(|track| {
            let mood = score_track(track);
            if mood.is_none() {
                debug!(track_id = %track.id, "No audio features, skipping track");
            }
            mood
        })
        .collect()
}
