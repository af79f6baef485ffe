use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::feedback::Advisory;
use super::landmark::{LegJoint, LegSide, PixelPoint};
use super::risk::{RiskAssessment, RiskLevel};

/// Analysis mode of a monitoring session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Analyze every frame
    #[default]
    Continuous,
    /// Freeze after the first analyzed frame until a rescan
    Single,
}

impl std::str::FromStr for ScanMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "continuous" => Ok(ScanMode::Continuous),
            "single" => Ok(ScanMode::Single),
            other => Err(format!("unknown scan mode '{}'", other)),
        }
    }
}

impl std::fmt::Display for ScanMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanMode::Continuous => write!(f, "continuous"),
            ScanMode::Single => write!(f, "single"),
        }
    }
}

/// Stabilized joint position
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SmoothedJoint {
    /// X in canvas pixels
    pub x: f64,
    /// Y in canvas pixels
    pub y: f64,
    /// X normalized to the canvas (0-1)
    pub x_norm: f64,
    /// Y normalized to the canvas (0-1)
    pub y_norm: f64,
    /// Mean visibility over the joint's buffer
    pub visibility: f64,
}

impl SmoothedJoint {
    pub fn pixel(&self) -> PixelPoint {
        PixelPoint::new(self.x, self.y)
    }
}

/// Smoothed positions for the six leg joints, in slot order
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct SmoothedLegs {
    joints: [Option<SmoothedJoint>; 6],
}

impl SmoothedLegs {
    pub fn new(joints: [Option<SmoothedJoint>; 6]) -> Self {
        Self { joints }
    }

    pub fn get(&self, joint: LegJoint) -> Option<&SmoothedJoint> {
        self.joints[joint.slot()].as_ref()
    }

    pub fn joints(&self) -> &[Option<SmoothedJoint>; 6] {
        &self.joints
    }

    /// Number of joints whose mean visibility exceeds `threshold`
    pub fn count_visible_above(&self, threshold: f64) -> usize {
        self.joints
            .iter()
            .flatten()
            .filter(|joint| joint.visibility > threshold)
            .count()
    }
}

/// Output of one processed frame
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrameReport {
    pub frame_number: u64,
    pub timestamp_ms: u64,
    pub legs_detected: bool,
    pub assessment: RiskAssessment,
    pub analyzed_side: Option<LegSide>,
    pub joints: SmoothedLegs,
    pub advisory: Option<Advisory>,
}

/// Running counters for a monitoring session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionStats {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub frames_processed: u64,
    pub frames_with_legs: u64,
    pub frames_without_legs: u64,
    pub low_risk_frames: u64,
    pub moderate_risk_frames: u64,
    pub high_risk_frames: u64,
    pub advisories_spoken: u64,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            frames_processed: 0,
            frames_with_legs: 0,
            frames_without_legs: 0,
            low_risk_frames: 0,
            moderate_risk_frames: 0,
            high_risk_frames: 0,
            advisories_spoken: 0,
        }
    }

    /// Count an analyzed frame at the given tier
    pub fn record_risk(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::Low => self.low_risk_frames += 1,
            RiskLevel::Moderate => self.moderate_risk_frames += 1,
            RiskLevel::High => self.high_risk_frames += 1,
        }
    }

    /// Share of analyzed frames classified high risk
    pub fn high_risk_ratio(&self) -> Option<f64> {
        let analyzed = self.low_risk_frames + self.moderate_risk_frames + self.high_risk_frames;
        if analyzed == 0 {
            return None;
        }
        Some(self.high_risk_frames as f64 / analyzed as f64)
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}
