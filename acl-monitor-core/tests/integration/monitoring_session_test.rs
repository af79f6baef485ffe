use acl_monitor_core::config::PipelineConfig;
use acl_monitor_core::models::{
    CanvasSize, FeedbackCategory, LegJoint, LegSide, PoseFrame, RiskAssessment, RiskLevel, ScanMode,
};
use acl_monitor_core::services::{MonitoringSession, SharedMonitoringSession};
use acl_monitor_core::MonitorError;
use assert_matches::assert_matches;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::common::{init_test_logging, straight_leg_frame, valgus_frame, FrameBuilder, RecordingSpeaker};

#[cfg(test)]
mod monitoring_session_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn coached_session() -> MonitoringSession<RecordingSpeaker> {
        coached_session_with(PipelineConfig::default())
    }

    fn coached_session_with(mut config: PipelineConfig) -> MonitoringSession<RecordingSpeaker> {
        init_test_logging();
        config.feedback.enabled = true;
        MonitoringSession::with_speaker(config, RecordingSpeaker::new())
            .unwrap()
            .with_rng(StdRng::seed_from_u64(42))
    }

    #[test]
    fn test_high_risk_frames_inside_global_cooldown_speak_once() {
        let mut session = coached_session();

        let first = session.process_frame(&valgus_frame(0), CanvasSize::default());
        let second = session.process_frame(&valgus_frame(1_000), CanvasSize::default());

        assert_eq!(first.assessment.risk_level, RiskLevel::High);
        assert_eq!(second.assessment.risk_level, RiskLevel::High);
        assert_eq!(first.advisory.map(|a| a.category), Some(FeedbackCategory::HighValgus));
        assert!(second.advisory.is_none());
        assert_eq!(session.speaker().spoken.len(), 1);
    }

    #[test]
    fn test_same_category_after_category_cooldown_speaks_twice() {
        let mut session = coached_session();

        session.process_frame(&valgus_frame(0), CanvasSize::default());
        let later = session.process_frame(&valgus_frame(9_000), CanvasSize::default());

        assert_eq!(later.advisory.map(|a| a.category), Some(FeedbackCategory::HighValgus));
        assert_eq!(session.speaker().spoken.len(), 2);
        // First cue was still playing and had to be cut off
        assert_eq!(session.speaker().cancels, 1);
    }

    #[test]
    fn test_same_category_inside_category_cooldown_is_suppressed() {
        let mut session = coached_session();

        session.process_frame(&valgus_frame(0), CanvasSize::default());
        let report = session.process_frame(&valgus_frame(5_000), CanvasSize::default());

        assert!(report.advisory.is_none());
        assert_eq!(session.speaker().spoken.len(), 1);
        assert_eq!(session.feedback_state().last_feedback_ms, Some(0));
    }

    #[test]
    fn test_cues_are_addressed_to_the_athlete() {
        let mut config = PipelineConfig::default();
        config.feedback.athlete_name = "Maya".to_string();
        let mut session = coached_session_with(config);

        session.process_frame(&valgus_frame(0), CanvasSize::default());
        assert!(session.speaker().spoken[0].starts_with("Maya, your knee is caving inward"));
    }

    #[test]
    fn test_disabling_advisories_cancels_and_silences() {
        let mut session = coached_session();
        session.process_frame(&valgus_frame(0), CanvasSize::default());
        assert!(session.speaker().speaking);

        session.set_advisory_enabled(false);
        assert!(!session.advisory_enabled());
        assert!(!session.speaker().speaking);
        assert_eq!(session.speaker().cancels, 1);

        let report = session.process_frame(&valgus_frame(60_000), CanvasSize::default());
        assert_eq!(report.assessment.risk_level, RiskLevel::High);
        assert!(report.advisory.is_none());
        assert_eq!(session.speaker().spoken.len(), 1);
    }

    #[test]
    fn test_stop_resets_feedback_so_next_cue_fires_immediately() {
        let mut session = coached_session();
        session.process_frame(&valgus_frame(0), CanvasSize::default());

        session.stop();
        assert_eq!(session.speaker().cancels, 1);
        assert!(session.smoother().is_empty());
        assert!(session.feedback_state().last_feedback_ms.is_none());

        let report = session.process_frame(&valgus_frame(500), CanvasSize::default());
        assert!(report.advisory.is_some());
        assert_eq!(session.speaker().spoken.len(), 2);
    }

    #[test]
    fn test_positive_cue_needs_long_silence() {
        let mut config = PipelineConfig::default();
        config.feedback.positive_probability = 1.0;
        let mut session = coached_session_with(config);

        let first = session.process_frame(&straight_leg_frame(0), CanvasSize::default());
        assert_eq!(first.assessment.risk_level, RiskLevel::Low);
        assert_eq!(first.advisory.map(|a| a.category), Some(FeedbackCategory::Positive));

        session.speaker_mut().finish();
        let quiet = session.process_frame(&straight_leg_frame(5_000), CanvasSize::default());
        assert!(quiet.advisory.is_none());

        let again = session.process_frame(&straight_leg_frame(10_001), CanvasSize::default());
        assert_eq!(again.advisory.map(|a| a.category), Some(FeedbackCategory::Positive));
        assert_eq!(session.speaker().cancels, 0);
    }

    #[test]
    fn test_positive_cue_never_fires_at_zero_probability() {
        let mut config = PipelineConfig::default();
        config.feedback.positive_probability = 0.0;
        let mut session = coached_session_with(config);

        for i in 0..20 {
            session.process_frame(&straight_leg_frame(i * 20_000), CanvasSize::default());
        }
        assert!(session.speaker().spoken.is_empty());
    }

    #[test]
    fn test_frames_without_legs_report_no_data() {
        let mut session = coached_session();
        session.process_frame(&valgus_frame(0), CanvasSize::default());

        let report = session.process_frame(&PoseFrame::empty(40), CanvasSize::default());
        assert!(!report.legs_detected);
        assert_eq!(report.assessment, RiskAssessment::no_data());
        assert_eq!(report.assessment.message, "Position your legs in frame");
        assert!(report.joints.joints().iter().all(Option::is_none));
        assert!(session.smoother().is_empty());

        let stats = session.stats();
        assert_eq!(stats.frames_processed, 2);
        assert_eq!(stats.frames_with_legs, 1);
        assert_eq!(stats.frames_without_legs, 1);
    }

    #[test]
    fn test_render_gate_blocks_sparse_frames() {
        let mut session = coached_session();
        let frame = FrameBuilder::new().joint(LegJoint::LeftKnee, 0.5, 0.6).build(0);

        let report = session.process_frame(&frame, CanvasSize::default());
        assert!(!report.legs_detected);
        assert_eq!(report.assessment, RiskAssessment::no_data());
        // Smoothing still tracked the joint
        assert_eq!(session.smoother().buffer_len(LegJoint::LeftKnee), 1);
        assert!(report.joints.get(LegJoint::LeftKnee).is_some());
    }

    #[test]
    fn test_worse_leg_is_reported() {
        let mut session = MonitoringSession::new(PipelineConfig::default()).unwrap();
        let frame = FrameBuilder::new().left_leg(0.0).right_leg(0.05).build(0);

        let report = session.process_frame(&frame, CanvasSize::default());
        assert_eq!(report.analyzed_side, Some(LegSide::Right));
        assert_eq!(report.assessment.valgus_angle, Some(18));
        assert_eq!(report.assessment.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_static_frame_gives_stable_assessment() {
        let mut session = MonitoringSession::new(PipelineConfig::default()).unwrap();
        let canvas = CanvasSize::new(1280, 720);

        let mut reports = Vec::new();
        for i in 0..30 {
            reports.push(session.process_frame(&valgus_frame(i * 33), canvas));
        }
        let settled = &reports[10];
        for report in &reports[10..] {
            assert_eq!(report.assessment, settled.assessment);
            for joint in LegJoint::ALL {
                match (report.joints.get(joint), settled.joints.get(joint)) {
                    (Some(a), Some(b)) => {
                        assert!((a.x - b.x).abs() < 1e-6);
                        assert!((a.y - b.y).abs() < 1e-6);
                    }
                    (None, None) => {}
                    other => panic!("joint {} changed presence: {:?}", joint.name(), other),
                }
            }
        }
    }

    #[test]
    fn test_single_scan_freezes_until_rescan() {
        let mut config = PipelineConfig::default();
        config.session.scan_mode = ScanMode::Single;
        let mut session = coached_session_with(config);

        // Frames before the first analyzed one are processed normally
        let waiting = session.process_frame(&PoseFrame::empty(0), CanvasSize::default());
        assert!(!waiting.legs_detected);
        assert!(!session.is_scan_completed());

        let scanned = session.process_frame(&valgus_frame(100), CanvasSize::default());
        assert!(session.is_scan_completed());

        let frozen = session.process_frame(&straight_leg_frame(20_000), CanvasSize::default());
        assert_eq!(frozen, scanned);
        assert_eq!(session.stats().frames_processed, 2);
        assert_eq!(session.speaker().spoken.len(), 1);

        session.rescan();
        let rescanned = session.process_frame(&straight_leg_frame(20_100), CanvasSize::default());
        assert_eq!(rescanned.assessment.risk_level, RiskLevel::Low);
        assert_eq!(rescanned.assessment.knee_angle, Some(180));
        assert_eq!(session.stats().frames_processed, 3);
    }

    #[test]
    fn test_switching_to_continuous_unfreezes() {
        let mut config = PipelineConfig::default();
        config.session.scan_mode = ScanMode::Single;
        let mut session = MonitoringSession::new(config).unwrap();

        session.process_frame(&valgus_frame(0), CanvasSize::default());
        session.set_scan_mode(ScanMode::Continuous);

        let report = session.process_frame(&PoseFrame::empty(33), CanvasSize::default());
        assert!(!report.legs_detected);
        assert_eq!(session.scan_mode(), ScanMode::Continuous);
    }

    #[test]
    fn test_stats_track_risk_tiers() {
        let mut session = MonitoringSession::new(PipelineConfig::default()).unwrap();
        session.process_frame(&valgus_frame(0), CanvasSize::default());
        session.process_frame(&PoseFrame::empty(33), CanvasSize::default());
        session.process_frame(&straight_leg_frame(66), CanvasSize::default());

        let stats = session.stats();
        assert_eq!(stats.high_risk_frames, 1);
        assert_eq!(stats.low_risk_frames, 1);
        assert_eq!(stats.moderate_risk_frames, 0);
        assert_eq!(stats.high_risk_ratio(), Some(0.5));
    }

    #[test]
    fn test_shared_session_survives_poisoned_lock() {
        let shared = SharedMonitoringSession::new(MonitoringSession::new(PipelineConfig::default()).unwrap());
        let poisoner = shared.clone();

        let result = std::thread::spawn(move || {
            poisoner.with_session(|_| panic!("processing thread died"));
        })
        .join();
        assert!(result.is_err());

        let report = shared.process_frame(&straight_leg_frame(0), CanvasSize::default());
        assert!(report.legs_detected);
        assert_eq!(shared.stats().frames_processed, 1);
    }

    #[test]
    fn test_zero_diagnostics_interval_is_rejected() {
        let mut config = PipelineConfig::default();
        config.session.diagnostics_interval = 0;

        let error = MonitoringSession::with_speaker(config, RecordingSpeaker::new()).err();
        assert_matches!(error, Some(MonitorError::InvalidConfig(message)) if message.contains("diagnostics_interval"));
    }

    #[test]
    fn test_zero_buffer_size_is_rejected() {
        let mut config = PipelineConfig::default();
        config.smoothing.buffer_size = 0;

        assert_matches!(MonitoringSession::new(config).err(), Some(MonitorError::InvalidConfig(_)));
    }
}
