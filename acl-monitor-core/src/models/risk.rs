use serde::{Deserialize, Serialize};

use super::landmark::LegSide;

pub const NO_DATA_MESSAGE: &str = "Position your legs in frame";
pub const HIGH_RISK_MESSAGE: &str = "HIGH RISK: Knee too straight or excessive valgus";
pub const MODERATE_RISK_MESSAGE: &str = "MODERATE RISK: Improve knee control";
pub const LOW_RISK_MESSAGE: &str = "Good knee alignment";

/// Injury-risk tier of the current posture
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// Presentation message for an analyzed frame at this tier
    pub fn message(&self) -> &'static str {
        match self {
            RiskLevel::Low => LOW_RISK_MESSAGE,
            RiskLevel::Moderate => MODERATE_RISK_MESSAGE,
            RiskLevel::High => HIGH_RISK_MESSAGE,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Moderate => write!(f, "moderate"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

/// Knee angles of one leg, in whole degrees
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LegAngles {
    pub side: LegSide,
    /// Interior hip-knee-ankle angle (180 = fully extended)
    pub knee_angle: i32,
    /// Signed frontal-plane deviation of the knee from the hip-ankle line
    pub valgus_angle: i32,
}

/// Per-frame risk assessment
///
/// Angles are `None` in the no-data state, which is reported as `low` and must
/// not be read as a genuine low-risk judgment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RiskAssessment {
    pub knee_angle: Option<i32>,
    pub valgus_angle: Option<i32>,
    pub risk_level: RiskLevel,
    pub message: String,
}

impl RiskAssessment {
    /// Assessment reported when no leg could be measured
    pub fn no_data() -> Self {
        Self {
            knee_angle: None,
            valgus_angle: None,
            risk_level: RiskLevel::Low,
            message: NO_DATA_MESSAGE.to_string(),
        }
    }

    pub fn from_angles(knee_angle: i32, valgus_angle: i32, risk_level: RiskLevel) -> Self {
        Self {
            knee_angle: Some(knee_angle),
            valgus_angle: Some(valgus_angle),
            risk_level,
            message: risk_level.message().to_string(),
        }
    }

    /// True when both angles were measured this frame
    pub fn has_measurement(&self) -> bool {
        self.knee_angle.is_some() && self.valgus_angle.is_some()
    }
}

impl Default for RiskAssessment {
    fn default() -> Self {
        Self::no_data()
    }
}
