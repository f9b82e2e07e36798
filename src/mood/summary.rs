use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    mood::{
        TREND_DAYS,
        model::{MoodAnalysis, Recommendation, Track},
        recommend,
        trend::trend_days,
    },
    types::UserProfile,
};

pub const NO_DATA_DESCRIPTION: &str = "Start listening to music to see your mood analysis!";

/// Minimum change between the oldest and newest days to call a direction.
pub const DIRECTION_DEAD_BAND: f64 = 0.05;

/// One-line description of the current mood.
pub fn describe_mood(overall_mood: f64, has_data: bool) -> &'static str {
    if !has_data {
        NO_DATA_DESCRIPTION
    } else if overall_mood > 0.7 {
        "Your recent music choices reflect a very positive mood!"
    } else if overall_mood > 0.5 {
        "You're in a balanced and content mood."
    } else {
        "Your music suggests a more reflective mood."
    }
}

/// Where the seven-day trend is heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodDirection {
    Improving,
    Declining,
    Stable,
}

impl MoodDirection {
    /// Compares the mean of the newest three days with the oldest three.
    pub fn from_trend(trend: &[f64; TREND_DAYS]) -> Self {
        let oldest = trend[..3].iter().sum::<f64>() / 3.0;
        let newest = trend[TREND_DAYS - 3..].iter().sum::<f64>() / 3.0;
        let delta = newest - oldest;

        if delta > DIRECTION_DEAD_BAND {
            MoodDirection::Improving
        } else if delta < -DIRECTION_DEAD_BAND {
            MoodDirection::Declining
        } else {
            MoodDirection::Stable
        }
    }
}

impl std::fmt::Display for MoodDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MoodDirection::Improving => "improving",
            MoodDirection::Declining => "declining",
            MoodDirection::Stable => "stable",
        };
        write!(f, "{}", s)
    }
}

/// `"%b %d"` labels for the trend window ending on `today`, oldest first.
pub fn trend_labels(today: NaiveDate) -> [String; TREND_DAYS] {
    trend_days(today).map(|day| day.format("%b %d").to_string())
}

/// Everything the presentation layer shows for one analysis.
#[derive(Debug, Clone, Serialize)]
pub struct MoodReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
    pub description: String,
    pub direction: MoodDirection,
    pub trend_labels: [String; TREND_DAYS],
    pub analysis: MoodAnalysis,
    pub recommendations: Vec<Recommendation>,
    /// Every fetched play, scored or not, newest first.
    pub plays: Vec<Track>,
}

impl MoodReport {
    /// Builds the report for `analysis`; `today` must be the date the trend
    /// window was bucketed against so labels and buckets line up.
    pub fn new(analysis: MoodAnalysis, today: NaiveDate) -> Self {
        MoodReport {
            profile: None,
            description: describe_mood(analysis.overall_mood, analysis.has_data()).to_string(),
            direction: MoodDirection::from_trend(&analysis.mood_trend),
            trend_labels: trend_labels(today),
            recommendations: recommend::for_analysis(&analysis),
            analysis,
            plays: Vec::new(),
        }
    }

    /// Attaches the raw plays shown in the track table.
    pub fn with_plays(mut self, plays: Vec<Track>) -> Self {
        self.plays = plays;
        self
    }

    /// Attaches the signed-in user's profile, if it could be fetched.
    pub fn with_profile(mut self, profile: Option<UserProfile>) -> Self {
        self.profile = profile;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptions_follow_thresholds() {
        assert_eq!(describe_mood(0.9, false), NO_DATA_DESCRIPTION);
        assert!(describe_mood(0.71, true).contains("very positive"));
        assert!(describe_mood(0.7, true).contains("balanced"));
        assert!(describe_mood(0.5, true).contains("reflective"));
    }

    #[test]
    fn direction_detects_declines_and_flat_trends() {
        let declining = [0.9, 0.8, 0.8, 0.5, 0.3, 0.2, 0.2];
        assert_eq!(MoodDirection::from_trend(&declining), MoodDirection::Declining);

        let improving = [0.2, 0.2, 0.3, 0.5, 0.7, 0.8, 0.9];
        assert_eq!(MoodDirection::from_trend(&improving), MoodDirection::Improving);

        assert_eq!(MoodDirection::from_trend(&[0.5; 7]), MoodDirection::Stable);
        assert_eq!(MoodDirection::Stable.to_string(), "stable");
    }

    #[test]
    fn labels_run_oldest_to_today() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 27).unwrap();
        let labels = trend_labels(today);
        assert_eq!(labels[0], "Mar 21");
        assert_eq!(labels[6], "Mar 27");
    }

    #[test]
    fn report_for_empty_history() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 27).unwrap();
        let report = MoodReport::new(MoodAnalysis::neutral(), today);
        assert_eq!(report.description, NO_DATA_DESCRIPTION);
        assert_eq!(report.direction, MoodDirection::Stable);
        assert_eq!(report.recommendations.len(), 2);
    }
}
