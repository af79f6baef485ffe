use acl_monitor_core::models::{Landmark, LegJoint, PoseFrame, BODY_LANDMARK_COUNT};
use acl_monitor_core::services::Speaker;
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize test logging
pub fn init_test_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .init();
    });
}

/// Speaker fake that records everything it is asked to do
#[derive(Debug, Default)]
pub struct RecordingSpeaker {
    pub spoken: Vec<String>,
    pub cancels: usize,
    pub speaking: bool,
}

impl RecordingSpeaker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the current utterance finishing on its own
    pub fn finish(&mut self) {
        self.speaking = false;
    }
}

impl Speaker for RecordingSpeaker {
    fn speak(&mut self, text: &str) {
        self.spoken.push(text.to_string());
        self.speaking = true;
    }

    fn cancel(&mut self) {
        self.cancels += 1;
        self.speaking = false;
    }

    fn is_speaking(&self) -> bool {
        self.speaking
    }
}

/// Builds 33-landmark frames with chosen leg joints
pub struct FrameBuilder {
    landmarks: Vec<Landmark>,
}

impl FrameBuilder {
    pub fn new() -> Self {
        Self {
            landmarks: vec![Landmark::new(0.5, 0.5, 0.0); BODY_LANDMARK_COUNT],
        }
    }

    pub fn joint(mut self, joint: LegJoint, x: f64, y: f64) -> Self {
        self.landmarks[joint.body_index()] = Landmark::new(x, y, 0.9);
        self
    }

    /// Left hip, knee and ankle; `knee_dx` shifts the knee sideways
    pub fn left_leg(self, knee_dx: f64) -> Self {
        self.joint(LegJoint::LeftHip, 0.40, 0.40)
            .joint(LegJoint::LeftKnee, 0.40 + knee_dx, 0.60)
            .joint(LegJoint::LeftAnkle, 0.40, 0.80)
    }

    /// Right hip, knee and ankle; `knee_dx` shifts the knee sideways
    pub fn right_leg(self, knee_dx: f64) -> Self {
        self.joint(LegJoint::RightHip, 0.60, 0.40)
            .joint(LegJoint::RightKnee, 0.60 + knee_dx, 0.60)
            .joint(LegJoint::RightAnkle, 0.60, 0.80)
    }

    pub fn build(self, timestamp_ms: u64) -> PoseFrame {
        PoseFrame::new(timestamp_ms, self.landmarks)
    }
}

impl Default for FrameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Frame with a straight left leg
pub fn straight_leg_frame(timestamp_ms: u64) -> PoseFrame {
    FrameBuilder::new().left_leg(0.0).build(timestamp_ms)
}

/// Frame whose left knee sits far enough off the hip-ankle line to be high risk
pub fn valgus_frame(timestamp_ms: u64) -> PoseFrame {
    FrameBuilder::new().left_leg(0.05).build(timestamp_ms)
}
