/// Temporal smoothing of leg landmarks
///
/// Each joint keeps a bounded history of its valid observations. Per frame the
/// history is averaged, blended into the previous stable position with an
/// exponential moving average, and passed through a dead-zone filter that
/// discards jumps larger than a fraction of the frame as noise.

use std::collections::VecDeque;

use crate::config::SmoothingConfig;
use crate::models::{CanvasSize, Landmark, LegJoint, LegLandmarkSet, SmoothedJoint, SmoothedLegs};

/// What the smoother did with a joint this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmoothingOutcome {
    /// No observation has been buffered since the last reset
    Undefined,
    /// First position after a reset, taken from the buffer average
    Initialized,
    /// Too few samples to move; previous position kept
    Held,
    /// Exponential moving average applied
    Smoothed,
    /// Move exceeded the dead zone; previous position kept
    Rejected,
}

/// Normalized position (0-1 on both axes)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

/// History and last stable position of a single joint
#[derive(Debug, Clone, Default)]
struct JointTrack {
    buffer: VecDeque<Landmark>,
    last: Option<NormalizedPoint>,
}

impl JointTrack {
    fn push(&mut self, observation: Landmark, capacity: usize) {
        // A zero capacity still keeps the newest observation
        let capacity = capacity.max(1);
        while self.buffer.len() >= capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(observation);
    }

    fn average(&self) -> Option<(NormalizedPoint, f64)> {
        if self.buffer.is_empty() {
            return None;
        }
        let n = self.buffer.len() as f64;
        let (sum_x, sum_y, sum_vis) = self
            .buffer
            .iter()
            .fold((0.0, 0.0, 0.0), |(x, y, v), lm| (x + lm.x, y + lm.y, v + lm.visibility));
        Some((
            NormalizedPoint {
                x: sum_x / n,
                y: sum_y / n,
            },
            sum_vis / n,
        ))
    }

    fn clear(&mut self) {
        self.buffer.clear();
        self.last = None;
    }
}

/// Temporal smoothing stage
pub struct TemporalSmoother {
    config: SmoothingConfig,
    tracks: [JointTrack; 6],
}

impl TemporalSmoother {
    /// Create a new smoother with default configuration
    pub fn new() -> Self {
        Self::with_config(SmoothingConfig::default())
    }

    /// Create a new smoother with custom configuration
    pub fn with_config(config: SmoothingConfig) -> Self {
        Self {
            config,
            tracks: Default::default(),
        }
    }

    pub fn config(&self) -> &SmoothingConfig {
        &self.config
    }

    /// Smooth one frame of leg landmarks
    ///
    /// A frame with no detected leg landmark resets every joint and yields no
    /// positions.
    pub fn smooth(&mut self, legs: &LegLandmarkSet, canvas: CanvasSize) -> SmoothedLegs {
        if legs.is_empty() {
            if !self.is_empty() {
                tracing::debug!("No leg landmarks detected, clearing smoothing state");
            }
            self.reset();
            return SmoothedLegs::default();
        }

        let mut joints = [None; 6];
        for joint in LegJoint::ALL {
            let (smoothed, outcome) = self.smooth_joint(joint, legs.get(joint).copied(), canvas);
            if outcome == SmoothingOutcome::Rejected {
                tracing::debug!(joint = joint.name(), "Rejected jump beyond dead zone");
            }
            joints[joint.slot()] = smoothed;
        }
        SmoothedLegs::new(joints)
    }

    fn smooth_joint(
        &mut self,
        joint: LegJoint,
        observation: Option<Landmark>,
        canvas: CanvasSize,
    ) -> (Option<SmoothedJoint>, SmoothingOutcome) {
        let capacity = self.config.buffer_size;
        let min_samples = self.config.min_samples;
        let alpha = self.config.alpha;
        let dead_zone = self.config.dead_zone;

        let track = &mut self.tracks[joint.slot()];
        if let Some(observation) = observation {
            track.push(observation, capacity);
        }

        let Some((average, visibility)) = track.average() else {
            return (None, SmoothingOutcome::Undefined);
        };

        let (position, outcome) = match track.last {
            Some(last) if track.buffer.len() >= min_samples => {
                let dx = (average.x - last.x).abs();
                let dy = (average.y - last.y).abs();
                if dx < dead_zone && dy < dead_zone {
                    let blended = NormalizedPoint {
                        x: alpha * average.x + (1.0 - alpha) * last.x,
                        y: alpha * average.y + (1.0 - alpha) * last.y,
                    };
                    (blended, SmoothingOutcome::Smoothed)
                } else {
                    (last, SmoothingOutcome::Rejected)
                }
            }
            Some(last) => (last, SmoothingOutcome::Held),
            None => (average, SmoothingOutcome::Initialized),
        };

        track.last = Some(position);

        let smoothed = SmoothedJoint {
            x: position.x * canvas.width_f64(),
            y: position.y * canvas.height_f64(),
            x_norm: position.x,
            y_norm: position.y,
            visibility,
        };
        (Some(smoothed), outcome)
    }

    /// Clear all buffers and last positions
    pub fn reset(&mut self) {
        for track in &mut self.tracks {
            track.clear();
        }
    }

    /// True when no joint holds history or a last position
    pub fn is_empty(&self) -> bool {
        self.tracks
            .iter()
            .all(|track| track.buffer.is_empty() && track.last.is_none())
    }

    /// Number of buffered observations for a joint
    pub fn buffer_len(&self, joint: LegJoint) -> usize {
        self.tracks[joint.slot()].buffer.len()
    }

    /// Last stable position of a joint, normalized
    pub fn last_position(&self, joint: LegJoint) -> Option<NormalizedPoint> {
        self.tracks[joint.slot()].last
    }
}

impl Default for TemporalSmoother {
    fn default() -> Self {
        Self::new()
    }
}
