/// Monitoring session
///
/// Owns all per-session pipeline state (smoothing buffers, last stable
/// positions, feedback throttle) and runs one frame at a time through
/// ingest, smoothing, geometry and advisory. Frames must be fed in arrival
/// order; smoothing depends on the previous frame's result.

use std::sync::{Arc, Mutex, MutexGuard};

use rand::rngs::StdRng;

use crate::config::PipelineConfig;
use crate::error::MonitorResult;
use crate::models::{
    CanvasSize, FeedbackState, FrameReport, PoseFrame, RiskAssessment, ScanMode, SessionStats,
};
use crate::services::feedback_service::{FeedbackThrottle, NoopSpeaker, Speaker};
use crate::services::knee_analysis_service::{KneeAnalysis, KneeAnalyzer};
use crate::services::landmark_filter::LegLandmarkFilter;
use crate::services::smoothing_service::TemporalSmoother;

pub struct MonitoringSession<S: Speaker = NoopSpeaker> {
    config: PipelineConfig,
    filter: LegLandmarkFilter,
    smoother: TemporalSmoother,
    analyzer: KneeAnalyzer,
    throttle: FeedbackThrottle,
    speaker: S,
    scan_mode: ScanMode,
    scan_completed: bool,
    last_report: Option<FrameReport>,
    stats: SessionStats,
    frames_without_legs_streak: u64,
}

impl MonitoringSession<NoopSpeaker> {
    /// Create a session without speech output
    pub fn new(config: PipelineConfig) -> MonitorResult<Self> {
        Self::with_speaker(config, NoopSpeaker)
    }
}

impl<S: Speaker> MonitoringSession<S> {
    /// Create a session that speaks advisories through `speaker`
    ///
    /// Fails with `MonitorError::InvalidConfig` when `config` does not validate.
    pub fn with_speaker(config: PipelineConfig, speaker: S) -> MonitorResult<Self> {
        config.validate()?;

        let stats = SessionStats::new();
        tracing::info!(
            session_id = %stats.session_id,
            scan_mode = %config.session.scan_mode,
            coach = config.feedback.enabled,
            "Monitoring session started"
        );

        Ok(Self {
            filter: LegLandmarkFilter::from_config(&config.detection),
            smoother: TemporalSmoother::with_config(config.smoothing.clone()),
            analyzer: KneeAnalyzer::new(config.risk.clone(), &config.detection),
            throttle: FeedbackThrottle::new(config.feedback.clone(), config.risk.clone()),
            scan_mode: config.session.scan_mode,
            config,
            speaker,
            scan_completed: false,
            last_report: None,
            stats,
            frames_without_legs_streak: 0,
        })
    }

    /// Use a specific random source for the advisory stage
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.throttle = self.throttle.with_rng(rng);
        self
    }

    /// Run one frame through the pipeline
    pub fn process_frame(&mut self, frame: &PoseFrame, canvas: CanvasSize) -> FrameReport {
        if self.scan_mode == ScanMode::Single && self.scan_completed {
            if let Some(report) = &self.last_report {
                return report.clone();
            }
        }

        self.stats.frames_processed += 1;
        let frame_number = self.stats.frames_processed;

        let legs = self.filter.filter(frame);
        let joints = self.smoother.smooth(&legs, canvas);

        if legs.is_empty() {
            self.stats.frames_without_legs += 1;
            self.frames_without_legs_streak += 1;
            if self.frames_without_legs_streak == self.config.session.diagnostics_interval {
                tracing::warn!(
                    frames = self.frames_without_legs_streak,
                    "No leg landmarks detected; hips, knees and ankles must be in frame"
                );
            }
        } else {
            self.stats.frames_with_legs += 1;
            self.frames_without_legs_streak = 0;
        }

        let analysis = if !legs.is_empty() && self.analyzer.passes_render_gate(&joints) {
            self.analyzer.analyze(&joints)
        } else {
            KneeAnalysis::no_data()
        };

        let legs_detected = analysis.assessment.has_measurement();
        let advisory = if legs_detected {
            self.stats.record_risk(analysis.assessment.risk_level);
            self.throttle
                .evaluate(&analysis.assessment, frame.timestamp_ms, &mut self.speaker)
        } else {
            None
        };
        if advisory.is_some() {
            self.stats.advisories_spoken += 1;
        }

        if frame_number == 1 || frame_number % self.config.session.diagnostics_interval == 0 {
            tracing::debug!(
                frame = frame_number,
                landmarks = frame.landmarks.len(),
                leg_joints = legs.detected_count(),
                risk = %analysis.assessment.risk_level,
                "Frame diagnostics"
            );
        }

        let report = FrameReport {
            frame_number,
            timestamp_ms: frame.timestamp_ms,
            legs_detected,
            assessment: analysis.assessment,
            analyzed_side: analysis.analyzed.map(|angles| angles.side),
            joints,
            advisory,
        };

        if self.scan_mode == ScanMode::Single && legs_detected && !self.scan_completed {
            self.scan_completed = true;
            tracing::info!(frame = frame_number, "Single scan completed");
        }

        self.last_report = Some(report.clone());
        report
    }

    /// Tear down: clear smoothing state, silence speech, forget throttle history
    pub fn stop(&mut self) {
        self.smoother.reset();
        self.throttle.reset(&mut self.speaker);
        self.scan_completed = false;
        self.last_report = None;
        self.frames_without_legs_streak = 0;
        tracing::info!(
            session_id = %self.stats.session_id,
            frames = self.stats.frames_processed,
            "Monitoring session stopped"
        );
    }

    /// Start a new single scan from empty smoothing state
    pub fn rescan(&mut self) {
        self.smoother.reset();
        self.scan_completed = false;
        self.last_report = None;
    }

    pub fn scan_mode(&self) -> ScanMode {
        self.scan_mode
    }

    pub fn set_scan_mode(&mut self, mode: ScanMode) {
        self.scan_mode = mode;
        if mode == ScanMode::Continuous {
            self.scan_completed = false;
        }
    }

    pub fn is_scan_completed(&self) -> bool {
        self.scan_completed
    }

    pub fn advisory_enabled(&self) -> bool {
        self.throttle.is_enabled()
    }

    pub fn set_advisory_enabled(&mut self, enabled: bool) {
        self.throttle.set_enabled(enabled, &mut self.speaker);
    }

    pub fn set_athlete_name(&mut self, name: impl Into<String>) {
        self.throttle.set_athlete_name(name);
    }

    /// Assessment of the most recently processed frame
    pub fn assessment(&self) -> RiskAssessment {
        self.last_report
            .as_ref()
            .map(|report| report.assessment.clone())
            .unwrap_or_default()
    }

    pub fn last_report(&self) -> Option<&FrameReport> {
        self.last_report.as_ref()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn feedback_state(&self) -> &FeedbackState {
        self.throttle.state()
    }

    pub fn smoother(&self) -> &TemporalSmoother {
        &self.smoother
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn speaker(&self) -> &S {
        &self.speaker
    }

    pub fn speaker_mut(&mut self) -> &mut S {
        &mut self.speaker
    }
}

/// Session shared across threads
///
/// Every operation holds one lock for its whole duration, so a frame is never
/// interleaved with another frame or with a stop.
pub struct SharedMonitoringSession<S: Speaker + Send = NoopSpeaker> {
    inner: Arc<Mutex<MonitoringSession<S>>>,
}

impl<S: Speaker + Send> Clone for SharedMonitoringSession<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Speaker + Send> SharedMonitoringSession<S> {
    pub fn new(session: MonitoringSession<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MonitoringSession<S>> {
        // State is consistent between frames even if a holder panicked
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn process_frame(&self, frame: &PoseFrame, canvas: CanvasSize) -> FrameReport {
        self.lock().process_frame(frame, canvas)
    }

    pub fn stop(&self) {
        self.lock().stop()
    }

    pub fn rescan(&self) {
        self.lock().rescan()
    }

    pub fn set_advisory_enabled(&self, enabled: bool) {
        self.lock().set_advisory_enabled(enabled)
    }

    pub fn stats(&self) -> SessionStats {
        self.lock().stats().clone()
    }

    pub fn assessment(&self) -> RiskAssessment {
        self.lock().assessment()
    }

    /// Run `f` with exclusive access to the session
    pub fn with_session<R>(&self, f: impl FnOnce(&mut MonitoringSession<S>) -> R) -> R {
        let mut guard = self.lock();
        f(&mut *guard)
    }
}
