pub mod app;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{MonitorError, MonitorResult};
use crate::models::ScanMode;

pub use app::apply_env_overrides;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    #[serde(default)]
    pub smoothing: SmoothingConfig,

    #[serde(default)]
    pub detection: DetectionConfig,

    #[serde(default)]
    pub risk: RiskThresholds,

    #[serde(default)]
    pub feedback: FeedbackConfig,

    #[serde(default)]
    pub session: SessionConfig,
}

/// Temporal smoothing parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SmoothingConfig {
    /// Observations kept per joint
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Buffered samples required before a joint position may move
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,

    /// Weight of the buffer average in the exponential moving average
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Largest accepted per-frame move, as a fraction of the frame
    #[serde(default = "default_dead_zone")]
    pub dead_zone: f64,
}

/// Landmark acceptance thresholds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectionConfig {
    /// Landmarks at or below this visibility are treated as missing
    #[serde(default = "default_visibility_floor")]
    pub visibility_floor: f64,

    /// Smoothed joints must exceed this visibility to count toward the render gate
    #[serde(default = "default_render_visibility")]
    pub render_visibility: f64,

    /// Joints that must pass the render gate before geometry runs
    #[serde(default = "default_min_rendered_joints")]
    pub min_rendered_joints: usize,
}

/// Classification thresholds in degrees
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskThresholds {
    #[serde(default = "default_high_flexion")]
    pub high_flexion_below: i32,

    #[serde(default = "default_high_valgus")]
    pub high_valgus_above: i32,

    #[serde(default = "default_moderate_valgus")]
    pub moderate_valgus_above: i32,

    #[serde(default = "default_moderate_flexion")]
    pub moderate_flexion_below: i32,
}

/// Spoken advisory throttling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedbackConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_athlete_name")]
    pub athlete_name: String,

    #[serde(default = "default_global_cooldown")]
    pub global_cooldown_ms: u64,

    #[serde(default = "default_category_cooldown")]
    pub category_cooldown_ms: u64,

    #[serde(default = "default_positive_silence")]
    pub positive_silence_ms: u64,

    #[serde(default = "default_positive_probability")]
    pub positive_probability: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    #[serde(default)]
    pub scan_mode: ScanMode,

    /// Frames between detection diagnostics
    #[serde(default = "default_diagnostics_interval")]
    pub diagnostics_interval: u64,
}

// Default value functions
fn default_buffer_size() -> usize {
    20
}

fn default_min_samples() -> usize {
    5
}

fn default_alpha() -> f64 {
    0.1
}

fn default_dead_zone() -> f64 {
    0.05
}

fn default_visibility_floor() -> f64 {
    0.02
}

fn default_render_visibility() -> f64 {
    0.15
}

fn default_min_rendered_joints() -> usize {
    2
}

fn default_high_flexion() -> i32 {
    30
}

fn default_high_valgus() -> i32 {
    15
}

fn default_moderate_valgus() -> i32 {
    8
}

fn default_moderate_flexion() -> i32 {
    45
}

fn default_athlete_name() -> String {
    "Athlete".to_string()
}

fn default_global_cooldown() -> u64 {
    3_000
}

fn default_category_cooldown() -> u64 {
    8_000
}

fn default_positive_silence() -> u64 {
    10_000
}

fn default_positive_probability() -> f64 {
    0.3
}

fn default_diagnostics_interval() -> u64 {
    30
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            smoothing: SmoothingConfig::default(),
            detection: DetectionConfig::default(),
            risk: RiskThresholds::default(),
            feedback: FeedbackConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
            min_samples: default_min_samples(),
            alpha: default_alpha(),
            dead_zone: default_dead_zone(),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            visibility_floor: default_visibility_floor(),
            render_visibility: default_render_visibility(),
            min_rendered_joints: default_min_rendered_joints(),
        }
    }
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            high_flexion_below: default_high_flexion(),
            high_valgus_above: default_high_valgus(),
            moderate_valgus_above: default_moderate_valgus(),
            moderate_flexion_below: default_moderate_flexion(),
        }
    }
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            athlete_name: default_athlete_name(),
            global_cooldown_ms: default_global_cooldown(),
            category_cooldown_ms: default_category_cooldown(),
            positive_silence_ms: default_positive_silence(),
            positive_probability: default_positive_probability(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            scan_mode: ScanMode::default(),
            diagnostics_interval: default_diagnostics_interval(),
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> MonitorResult<Self> {
        let config: PipelineConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> MonitorResult<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Render as pretty TOML
    pub fn to_toml_string(&self) -> MonitorResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check value ranges and threshold ordering
    pub fn validate(&self) -> MonitorResult<()> {
        let s = &self.smoothing;
        if s.buffer_size == 0 {
            return Err(invalid("smoothing.buffer_size must be at least 1"));
        }
        if s.min_samples == 0 || s.min_samples > s.buffer_size {
            return Err(invalid(format!(
                "smoothing.min_samples must be between 1 and buffer_size ({})",
                s.buffer_size
            )));
        }
        if !(0.0..=1.0).contains(&s.alpha) {
            return Err(invalid("smoothing.alpha must be within [0, 1]"));
        }
        if !(s.dead_zone > 0.0 && s.dead_zone <= 1.0) {
            return Err(invalid("smoothing.dead_zone must be within (0, 1]"));
        }

        let d = &self.detection;
        if !(0.0..1.0).contains(&d.visibility_floor) {
            return Err(invalid("detection.visibility_floor must be within [0, 1)"));
        }
        if d.min_rendered_joints > 6 {
            return Err(invalid("detection.min_rendered_joints cannot exceed 6"));
        }

        let r = &self.risk;
        if r.high_flexion_below > r.moderate_flexion_below {
            return Err(invalid(
                "risk.high_flexion_below must not exceed risk.moderate_flexion_below",
            ));
        }
        if r.moderate_valgus_above > r.high_valgus_above {
            return Err(invalid(
                "risk.moderate_valgus_above must not exceed risk.high_valgus_above",
            ));
        }

        let f = &self.feedback;
        if !(0.0..=1.0).contains(&f.positive_probability) {
            return Err(invalid("feedback.positive_probability must be within [0, 1]"));
        }
        if f.global_cooldown_ms == 0 {
            return Err(invalid("feedback.global_cooldown_ms must be positive"));
        }
        if f.athlete_name.trim().is_empty() {
            return Err(invalid("feedback.athlete_name must not be empty"));
        }

        if self.session.diagnostics_interval == 0 {
            return Err(invalid("session.diagnostics_interval must be positive"));
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> MonitorError {
    MonitorError::InvalidConfig(message.into())
}
