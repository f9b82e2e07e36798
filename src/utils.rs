use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Local, Utc};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::{
    mood::{MoodReport, Track, scorer},
    types::{RecommendationTableRow, TrackTableRow, TrendTableRow},
};

/// Random 128-character PKCE code verifier (RFC 7636, section 4.1).
pub fn generate_code_verifier() -> String {
    random_alphanumeric(128)
}

/// S256 code challenge for `verifier`: base64url without padding of its
/// SHA-256 digest.
///
/// # Example
///
/// ```ignore
/// let verifier = generate_code_verifier();
/// let challenge = generate_code_challenge(&verifier);
/// assert_eq!(challenge.len(), 43);
/// ```
pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Opaque value round-tripped through the authorization redirect.
pub fn generate_state() -> String {
    random_alphanumeric(32)
}

fn random_alphanumeric(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Score in `[0, 1]` as a percentage, e.g. `76%`.
pub fn format_score(score: f64) -> String {
    format!("{:.0}%", score * 100.0)
}

/// Play time in local time, `-` when unknown.
pub fn format_played_at(played_at: Option<DateTime<Utc>>) -> String {
    match played_at {
        Some(ts) => ts.with_timezone(&Local).format("%b %d %H:%M").to_string(),
        None => "-".to_string(),
    }
}

/// One row per play. Plays without audio features show `-` for the scores.
///
/// # Arguments
///
/// * `plays` - Fetched plays in upstream order (newest first)
pub fn track_rows(plays: &[Track]) -> Vec<TrackTableRow> {
    let score_or_dash = |value: Option<f64>| {
        value
            .map(format_score)
            .unwrap_or_else(|| "-".to_string())
    };

    plays
        .iter()
        .map(|t| TrackTableRow {
            played: format_played_at(t.played_at_utc()),
            name: t.name.clone(),
            artist: t.artist.clone(),
            mood: score_or_dash(t.features.as_ref().map(scorer::score)),
            energy: score_or_dash(t.features.map(|f| scorer::clamp01(f.energy))),
            valence: score_or_dash(t.features.map(|f| scorer::clamp01(f.valence))),
        })
        .collect()
}

/// One row per trend day, oldest first, labelled with its date.
pub fn trend_rows(report: &MoodReport) -> Vec<TrendTableRow> {
    report
        .trend_labels
        .iter()
        .zip(report.analysis.mood_trend.iter())
        .map(|(day, score)| TrendTableRow {
            day: day.clone(),
            mood: format_score(*score),
        })
        .collect()
}

/// Recommendations with the confidence as a percentage.
pub fn recommendation_rows(report: &MoodReport) -> Vec<RecommendationTableRow> {
    report
        .recommendations
        .iter()
        .map(|r| RecommendationTableRow {
            title: r.title.clone(),
            description: r.description.clone(),
            confidence: format_score(r.confidence),
        })
        .collect()
}
