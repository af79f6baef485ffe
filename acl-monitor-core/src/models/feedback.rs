use serde::{Deserialize, Serialize};

/// Category of a spoken coaching cue
///
/// Repeat suppression works on the category, not the exact text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCategory {
    HighValgus,
    LowFlexion,
    HighRisk,
    ModerateValgus,
    ModerateFlexion,
    ModerateGeneral,
    Positive,
}

impl FeedbackCategory {
    /// Coaching phrase for this category, addressed to the athlete
    pub fn phrase(&self, athlete_name: &str) -> String {
        match self {
            Self::HighValgus => format!(
                "{}, your knee is caving inward too much. Keep your knee aligned over your foot. Push your knee out slightly.",
                athlete_name
            ),
            Self::LowFlexion => format!(
                "{}, bend your knees more. You need at least 30 degrees of knee bend for safe movement.",
                athlete_name
            ),
            Self::HighRisk => format!(
                "{}, high risk detected. Focus on bending your knees and keeping them aligned.",
                athlete_name
            ),
            Self::ModerateValgus => format!(
                "{}, slight knee valgus detected. Keep your knee tracking over your second toe.",
                athlete_name
            ),
            Self::ModerateFlexion => format!(
                "{}, try bending your knees a bit more for better control.",
                athlete_name
            ),
            Self::ModerateGeneral => format!("{}, good form, keep it up.", athlete_name),
            Self::Positive => format!("Great form, {}. Keep your knees aligned.", athlete_name),
        }
    }
}

impl std::fmt::Display for FeedbackCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::HighValgus => "high_valgus",
            Self::LowFlexion => "low_flexion",
            Self::HighRisk => "high_risk",
            Self::ModerateValgus => "moderate_valgus",
            Self::ModerateFlexion => "moderate_flexion",
            Self::ModerateGeneral => "moderate_general",
            Self::Positive => "positive",
        };
        write!(f, "{}", name)
    }
}

/// A spoken coaching cue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Advisory {
    pub category: FeedbackCategory,
    pub text: String,
    pub timestamp_ms: u64,
}

/// Throttle state carried between frames
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedbackState {
    pub last_feedback_ms: Option<u64>,
    pub last_category: Option<FeedbackCategory>,
    pub is_speaking: bool,
}

impl FeedbackState {
    /// Milliseconds since the last spoken cue; saturates when nothing was spoken yet
    pub fn elapsed_since_last(&self, now_ms: u64) -> u64 {
        match self.last_feedback_ms {
            Some(last) => now_ms.saturating_sub(last),
            None => u64::MAX,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
