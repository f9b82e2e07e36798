//! Rule-based recommendations.
//!
//! Every call yields exactly one mood-tier recommendation followed by one
//! energy-tier recommendation. Thresholds are strict, so a value sitting on a
//! boundary falls into the lower tier.
//!
//! Confidence values are fixed per tier by policy. They are not derived from
//! the data and must not be read as probabilities.

use crate::mood::model::{MoodAnalysis, Recommendation};

pub const HIGH_MOOD_THRESHOLD: f64 = 0.7;
pub const LOW_MOOD_THRESHOLD: f64 = 0.4;
pub const HIGH_ENERGY_THRESHOLD: f64 = 0.6;

pub const SUSTAIN_CONFIDENCE: f64 = 0.8;
pub const BALANCED_CONFIDENCE: f64 = 0.7;
pub const MOOD_LIFT_CONFIDENCE: f64 = 0.75;
pub const ENERGY_CONFIDENCE: f64 = 0.6;

/// Band of the overall mood score.
///
/// | Tier | Range |
/// |---|---|
/// | `Sustain` | `mood > 0.7` |
/// | `Balanced` | `0.4 < mood <= 0.7` |
/// | `Lift` | `mood <= 0.4` |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoodTier {
    Sustain,
    Balanced,
    Lift,
}

impl MoodTier {
    /// Tier for `mood`; a value on a threshold goes to the lower tier.
    ///
    /// # Example
    ///
    /// ```ignore
    /// assert_eq!(MoodTier::from_score(0.7), MoodTier::Balanced);
    /// ```
    pub fn from_score(mood: f64) -> Self {
        if mood > HIGH_MOOD_THRESHOLD {
            MoodTier::Sustain
        } else if mood > LOW_MOOD_THRESHOLD {
            MoodTier::Balanced
        } else {
            MoodTier::Lift
        }
    }

    pub fn recommendation(self) -> Recommendation {
        let (title, description, confidence) = match self {
            MoodTier::Sustain => (
                "Keep the Vibe Going!",
                "Your music choices reflect a very positive mood. Queue up similar upbeat tracks to keep the momentum.",
                SUSTAIN_CONFIDENCE,
            ),
            MoodTier::Balanced => (
                "Balanced Mood",
                "Your listening shows a good balance. Consider exploring a new genre to discover more music you might enjoy.",
                BALANCED_CONFIDENCE,
            ),
            MoodTier::Lift => (
                "Mood Boost",
                "Your recent tracks suggest a more reflective mood. Some uplifting songs might help lift your spirits.",
                MOOD_LIFT_CONFIDENCE,
            ),
        };
        build(title, description, confidence)
    }
}

/// Band of the average energy: above 0.6 suggests winding down, anything
/// else a boost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyTier {
    WindDown,
    Boost,
}

impl EnergyTier {
    /// Tier for `energy`; exactly 0.6 is `Boost`.
    pub fn from_score(energy: f64) -> Self {
        if energy > HIGH_ENERGY_THRESHOLD {
            EnergyTier::WindDown
        } else {
            EnergyTier::Boost
        }
    }

    pub fn recommendation(self) -> Recommendation {
        let (title, description) = match self {
            EnergyTier::WindDown => (
                "Energy Management",
                "Consider adding some calming tracks to balance your high-energy listening.",
            ),
            EnergyTier::Boost => (
                "Energy Boost",
                "Try adding some upbeat tracks to raise your energy levels.",
            ),
        };
        build(title, description, ENERGY_CONFIDENCE)
    }
}

fn build(title: &str, description: &str, confidence: f64) -> Recommendation {
    Recommendation {
        title: title.to_string(),
        description: description.to_string(),
        confidence,
    }
}

/// Recommendations for an aggregate mood/energy reading, mood tier first.
pub fn recommend(overall_mood: f64, average_energy: f64) -> Vec<Recommendation> {
    vec![
        MoodTier::from_score(overall_mood).recommendation(),
        EnergyTier::from_score(average_energy).recommendation(),
    ]
}

/// Shorthand for [`recommend`] over an analysis' overall mood and energy.
pub fn for_analysis(analysis: &MoodAnalysis) -> Vec<Recommendation> {
    recommend(analysis.overall_mood, analysis.average_energy)
}
