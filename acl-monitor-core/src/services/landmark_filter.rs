/// Landmark ingest and leg filter
///
/// Projects a full-body pose frame onto the six lower-body joints the pipeline
/// tracks. Landmarks that are missing, non-finite or at/below the visibility
/// floor leave their slot empty.

use crate::config::DetectionConfig;
use crate::models::{LegJoint, LegLandmarkSet, PoseFrame};

#[derive(Debug, Clone)]
pub struct LegLandmarkFilter {
    visibility_floor: f64,
}

impl LegLandmarkFilter {
    pub fn new(visibility_floor: f64) -> Self {
        Self { visibility_floor }
    }

    pub fn from_config(config: &DetectionConfig) -> Self {
        Self::new(config.visibility_floor)
    }

    pub fn visibility_floor(&self) -> f64 {
        self.visibility_floor
    }

    /// Extract the leg landmark set from a frame
    pub fn filter(&self, frame: &PoseFrame) -> LegLandmarkSet {
        let mut slots = [None; 6];
        for joint in LegJoint::ALL {
            slots[joint.slot()] = frame
                .landmark(joint.body_index())
                .filter(|lm| lm.is_detected(self.visibility_floor))
                .copied();
        }
        LegLandmarkSet::new(slots)
    }
}

impl Default for LegLandmarkFilter {
    fn default() -> Self {
        Self::from_config(&DetectionConfig::default())
    }
}
