/// Feedback throttle and advisory stage
///
/// Turns a frame's risk assessment into at most one spoken coaching cue. Three
/// independent guards keep the coach from talking over the athlete:
/// - a global cooldown between any two cues,
/// - a longer cooldown before the same cue category may repeat,
/// - a probabilistic gate on praise for low-risk frames after a quiet period.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{FeedbackConfig, RiskThresholds};
use crate::models::{Advisory, FeedbackCategory, FeedbackState, RiskAssessment, RiskLevel};

/// Speech output capability
#[cfg_attr(test, mockall::automock)]
pub trait Speaker {
    /// Start speaking `text`
    fn speak(&mut self, text: &str);
    /// Stop any utterance in progress
    fn cancel(&mut self);
    /// Whether an utterance is in progress
    fn is_speaking(&self) -> bool;
}

/// Speaker that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSpeaker;

impl Speaker for NoopSpeaker {
    fn speak(&mut self, _text: &str) {}

    fn cancel(&mut self) {}

    fn is_speaking(&self) -> bool {
        false
    }
}

/// Rate-limited advisory generator
pub struct FeedbackThrottle {
    config: FeedbackConfig,
    thresholds: RiskThresholds,
    state: FeedbackState,
    rng: StdRng,
}

impl FeedbackThrottle {
    pub fn new(config: FeedbackConfig, thresholds: RiskThresholds) -> Self {
        Self {
            config,
            thresholds,
            state: FeedbackState::default(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Use a specific random source for the low-risk praise gate
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn state(&self) -> &FeedbackState {
        &self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Toggle advisories; turning them off silences any cue in progress
    pub fn set_enabled<S: Speaker>(&mut self, enabled: bool, speaker: &mut S) {
        self.config.enabled = enabled;
        if !enabled && speaker.is_speaking() {
            speaker.cancel();
        }
        self.state.is_speaking = speaker.is_speaking();
    }

    pub fn athlete_name(&self) -> &str {
        &self.config.athlete_name
    }

    pub fn set_athlete_name(&mut self, name: impl Into<String>) {
        self.config.athlete_name = name.into();
    }

    /// Choose a cue category for the assessment, or `None` to stay quiet
    ///
    /// `elapsed_ms` is the time since the last spoken cue.
    pub fn select_category(&mut self, assessment: &RiskAssessment, elapsed_ms: u64) -> Option<FeedbackCategory> {
        let knee = assessment.knee_angle?;
        let valgus = assessment.valgus_angle?;
        let t = &self.thresholds;

        let category = match assessment.risk_level {
            RiskLevel::High => {
                if valgus > t.high_valgus_above {
                    FeedbackCategory::HighValgus
                } else if knee < t.high_flexion_below {
                    FeedbackCategory::LowFlexion
                } else {
                    FeedbackCategory::HighRisk
                }
            }
            RiskLevel::Moderate => {
                if valgus > t.moderate_valgus_above {
                    FeedbackCategory::ModerateValgus
                } else if knee < t.moderate_flexion_below {
                    FeedbackCategory::ModerateFlexion
                } else {
                    FeedbackCategory::ModerateGeneral
                }
            }
            RiskLevel::Low => {
                let probability = self.config.positive_probability.clamp(0.0, 1.0);
                if elapsed_ms > self.config.positive_silence_ms && self.rng.gen_bool(probability) {
                    FeedbackCategory::Positive
                } else {
                    return None;
                }
            }
        };

        Some(category)
    }

    /// Decide whether to speak for this frame and speak if so
    pub fn evaluate<S: Speaker>(
        &mut self,
        assessment: &RiskAssessment,
        now_ms: u64,
        speaker: &mut S,
    ) -> Option<Advisory> {
        self.state.is_speaking = speaker.is_speaking();

        if !self.config.enabled || !assessment.has_measurement() {
            return None;
        }

        let elapsed = self.state.elapsed_since_last(now_ms);
        if elapsed < self.config.global_cooldown_ms {
            return None;
        }

        let category = self.select_category(assessment, elapsed)?;

        if self.state.last_category == Some(category) && elapsed < self.config.category_cooldown_ms {
            tracing::debug!(%category, elapsed_ms = elapsed, "Suppressed repeated cue");
            return None;
        }

        let text = category.phrase(&self.config.athlete_name);
        if speaker.is_speaking() {
            speaker.cancel();
        }
        speaker.speak(&text);

        self.state.last_feedback_ms = Some(now_ms);
        self.state.last_category = Some(category);
        self.state.is_speaking = speaker.is_speaking();

        tracing::info!(%category, timestamp_ms = now_ms, "Coach cue");

        Some(Advisory {
            category,
            text,
            timestamp_ms: now_ms,
        })
    }

    /// Cancel speech and forget all throttle history
    pub fn reset<S: Speaker>(&mut self, speaker: &mut S) {
        if speaker.is_speaking() {
            speaker.cancel();
        }
        self.state.reset();
    }
}
