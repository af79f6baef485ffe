/// Landmark models for pose-estimation input
///
/// This module provides the per-frame landmark representation delivered by the
/// pose source, the lower-body joint indices the pipeline consumes, and the
/// six-slot leg landmark view derived from each frame.

use serde::{Deserialize, Serialize};

/// Number of landmarks produced by the 33-point body model
pub const BODY_LANDMARK_COUNT: usize = 33;

/// Canvas size used when the video source reports no dimensions
pub const DEFAULT_CANVAS_WIDTH: u32 = 640;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 480;

/// Single landmark as reported by the pose model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// X coordinate (normalized 0-1)
    pub x: f64,
    /// Y coordinate (normalized 0-1)
    pub y: f64,
    /// Visibility score (0-1), a confidence proxy
    #[serde(default)]
    pub visibility: f64,
}

impl Landmark {
    /// Create a new landmark
    pub fn new(x: f64, y: f64, visibility: f64) -> Self {
        Self { x, y, visibility }
    }

    /// Check if the landmark is usable at the given visibility floor
    pub fn is_detected(&self, visibility_floor: f64) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.visibility > visibility_floor
    }

    /// Convert to pixel space
    pub fn to_pixels(&self, canvas: CanvasSize) -> PixelPoint {
        PixelPoint {
            x: self.x * canvas.width_f64(),
            y: self.y * canvas.height_f64(),
        }
    }
}

/// A point in canvas pixel space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &PixelPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Pixel dimensions of the canvas the frame is rendered onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    /// Create a canvas size, falling back to 640x480 when a dimension is zero
    pub fn new(width: u32, height: u32) -> Self {
        if width == 0 || height == 0 {
            return Self::default();
        }
        Self { width, height }
    }

    pub fn width_f64(&self) -> f64 {
        f64::from(self.width)
    }

    pub fn height_f64(&self) -> f64 {
        f64::from(self.height)
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
        }
    }
}

/// One pose-estimation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    /// Frame timestamp in milliseconds
    pub timestamp_ms: u64,
    /// Landmarks in body-model order (empty when no subject was found)
    #[serde(default)]
    pub landmarks: Vec<Landmark>,
}

impl PoseFrame {
    /// Create a new pose frame
    pub fn new(timestamp_ms: u64, landmarks: Vec<Landmark>) -> Self {
        Self {
            timestamp_ms,
            landmarks,
        }
    }

    /// Frame in which the pose model found no subject
    pub fn empty(timestamp_ms: u64) -> Self {
        Self::new(timestamp_ms, Vec::new())
    }

    /// Get landmark by body-model index
    pub fn landmark(&self, index: usize) -> Option<&Landmark> {
        self.landmarks.get(index)
    }
}

/// Lower-body joints tracked by the pipeline, with their body-model indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegJoint {
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl LegJoint {
    /// All tracked joints in slot order
    pub const ALL: [LegJoint; 6] = [
        LegJoint::LeftHip,
        LegJoint::RightHip,
        LegJoint::LeftKnee,
        LegJoint::RightKnee,
        LegJoint::LeftAnkle,
        LegJoint::RightAnkle,
    ];

    /// Index of this joint in the 33-point body model
    pub fn body_index(&self) -> usize {
        match self {
            Self::LeftHip => 23,
            Self::RightHip => 24,
            Self::LeftKnee => 25,
            Self::RightKnee => 26,
            Self::LeftAnkle => 27,
            Self::RightAnkle => 28,
        }
    }

    /// Position of this joint in a six-slot leg set
    pub fn slot(&self) -> usize {
        match self {
            Self::LeftHip => 0,
            Self::RightHip => 1,
            Self::LeftKnee => 2,
            Self::RightKnee => 3,
            Self::LeftAnkle => 4,
            Self::RightAnkle => 5,
        }
    }

    /// Get joint name
    pub fn name(&self) -> &'static str {
        match self {
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
        }
    }
}

/// Leg side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegSide {
    Left,
    Right,
}

impl LegSide {
    /// Hip, knee and ankle of this side
    pub fn joints(&self) -> [LegJoint; 3] {
        match self {
            Self::Left => [LegJoint::LeftHip, LegJoint::LeftKnee, LegJoint::LeftAnkle],
            Self::Right => [LegJoint::RightHip, LegJoint::RightKnee, LegJoint::RightAnkle],
        }
    }
}

impl std::fmt::Display for LegSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LegSide::Left => write!(f, "left"),
            LegSide::Right => write!(f, "right"),
        }
    }
}

/// Six-slot view of a frame restricted to hips, knees and ankles
///
/// Each slot is `None` when the landmark is missing or below the detection floor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LegLandmarkSet {
    slots: [Option<Landmark>; 6],
}

impl LegLandmarkSet {
    pub fn new(slots: [Option<Landmark>; 6]) -> Self {
        Self { slots }
    }

    pub fn get(&self, joint: LegJoint) -> Option<&Landmark> {
        self.slots[joint.slot()].as_ref()
    }

    pub fn slots(&self) -> &[Option<Landmark>; 6] {
        &self.slots
    }

    /// Number of joints detected in this frame
    pub fn detected_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// True when no leg landmark was detected
    pub fn is_empty(&self) -> bool {
        self.detected_count() == 0
    }
}
