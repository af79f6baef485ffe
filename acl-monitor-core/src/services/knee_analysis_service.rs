/// Knee geometry and risk classification
///
/// Computes knee flexion and a frontal-plane valgus proxy from stabilized
/// hip/knee/ankle positions, picks the worse leg and classifies injury risk.
///
/// The valgus measurement is a 2D projection: the horizontal deviation of the
/// knee from the straight hip-ankle line, converted to an angle against the
/// thigh length. It is not a clinical 3D valgus angle. The classification
/// thresholds are calibrated to this formula and must change together with it.

use crate::config::{DetectionConfig, RiskThresholds};
use crate::models::{LegAngles, LegSide, PixelPoint, RiskAssessment, RiskLevel, SmoothedLegs};

/// Guards the hip-ankle slope against a vertical line
const SLOPE_EPSILON: f64 = 1e-4;

/// Round to the nearest integer, halves toward positive infinity
pub fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// Calculate the angle at `vertex` between `vertex -> a` and `vertex -> c`, in degrees
///
/// Returns `None` when either vector has zero length.
pub fn calculate_joint_angle(a: &PixelPoint, vertex: &PixelPoint, c: &PixelPoint) -> Option<f64> {
    let ba_x = a.x - vertex.x;
    let ba_y = a.y - vertex.y;
    let bc_x = c.x - vertex.x;
    let bc_y = c.y - vertex.y;

    let dot = ba_x * bc_x + ba_y * bc_y;
    let mag_ba = (ba_x * ba_x + ba_y * ba_y).sqrt();
    let mag_bc = (bc_x * bc_x + bc_y * bc_y).sqrt();

    if mag_ba == 0.0 || mag_bc == 0.0 {
        return None;
    }

    let cos_angle = (dot / (mag_ba * mag_bc)).clamp(-1.0, 1.0);
    Some(cos_angle.acos().to_degrees())
}

/// Knee flexion in whole degrees (180 = straight leg)
pub fn knee_flexion_angle(hip: &PixelPoint, knee: &PixelPoint, ankle: &PixelPoint) -> Option<i32> {
    calculate_joint_angle(hip, knee, ankle).map(round_half_up)
}

/// Signed valgus proxy in whole degrees
///
/// Positive when the knee lies toward +x of the hip-ankle line.
pub fn valgus_angle(hip: &PixelPoint, knee: &PixelPoint, ankle: &PixelPoint) -> Option<i32> {
    let slope = (ankle.y - hip.y) / (ankle.x - hip.x + SLOPE_EPSILON);
    if slope == 0.0 || slope.is_nan() {
        return None;
    }

    let expected_knee_x = hip.x + (knee.y - hip.y) / slope;
    let deviation = knee.x - expected_knee_x;

    let hip_knee = hip.distance_to(knee);
    if hip_knee == 0.0 {
        return None;
    }

    let degrees = (deviation.abs() / hip_knee).atan().to_degrees();
    let signed = if deviation > 0.0 { degrees } else { -degrees };
    signed.is_finite().then(|| round_half_up(signed))
}

/// Result of analyzing one frame of smoothed joints
#[derive(Debug, Clone, PartialEq)]
pub struct KneeAnalysis {
    pub assessment: RiskAssessment,
    pub analyzed: Option<LegAngles>,
    pub left: Option<LegAngles>,
    pub right: Option<LegAngles>,
}

impl KneeAnalysis {
    pub fn no_data() -> Self {
        Self {
            assessment: RiskAssessment::no_data(),
            analyzed: None,
            left: None,
            right: None,
        }
    }
}

/// Geometric analysis stage
#[derive(Debug, Clone)]
pub struct KneeAnalyzer {
    thresholds: RiskThresholds,
    visibility_floor: f64,
    render_visibility: f64,
    min_rendered_joints: usize,
}

impl KneeAnalyzer {
    pub fn new(thresholds: RiskThresholds, detection: &DetectionConfig) -> Self {
        Self {
            thresholds,
            visibility_floor: detection.visibility_floor,
            render_visibility: detection.render_visibility,
            min_rendered_joints: detection.min_rendered_joints,
        }
    }

    pub fn thresholds(&self) -> &RiskThresholds {
        &self.thresholds
    }

    /// Whether enough joints are clearly visible to attempt geometry
    pub fn passes_render_gate(&self, joints: &SmoothedLegs) -> bool {
        joints.count_visible_above(self.render_visibility) >= self.min_rendered_joints
    }

    /// Measure one leg; `None` unless hip, knee and ankle are present and both angles are defined
    pub fn measure_leg(&self, side: LegSide, joints: &SmoothedLegs) -> Option<LegAngles> {
        let [hip, knee, ankle] = side.joints().map(|joint| {
            joints
                .get(joint)
                .filter(|j| j.visibility >= self.visibility_floor)
                .map(|j| j.pixel())
        });
        let (hip, knee, ankle) = (hip?, knee?, ankle?);

        Some(LegAngles {
            side,
            knee_angle: knee_flexion_angle(&hip, &knee, &ankle)?,
            valgus_angle: valgus_angle(&hip, &knee, &ankle)?,
        })
    }

    /// Pick the leg to report: the right leg wins only with a strictly larger valgus
    pub fn select_leg(left: Option<LegAngles>, right: Option<LegAngles>) -> Option<LegAngles> {
        match (left, right) {
            (Some(l), Some(r)) if r.valgus_angle > l.valgus_angle => Some(r),
            (Some(l), _) => Some(l),
            (None, r) => r,
        }
    }

    /// Classify risk, first matching rule wins
    pub fn classify(&self, knee_angle: i32, valgus_angle: i32) -> RiskLevel {
        let t = &self.thresholds;
        if knee_angle < t.high_flexion_below || valgus_angle > t.high_valgus_above {
            RiskLevel::High
        } else if valgus_angle > t.moderate_valgus_above || knee_angle < t.moderate_flexion_below {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }

    /// Analyze both legs and produce the frame's assessment
    pub fn analyze(&self, joints: &SmoothedLegs) -> KneeAnalysis {
        let left = self.measure_leg(LegSide::Left, joints);
        let right = self.measure_leg(LegSide::Right, joints);

        let Some(analyzed) = Self::select_leg(left, right) else {
            return KneeAnalysis {
                left,
                right,
                ..KneeAnalysis::no_data()
            };
        };

        let risk_level = self.classify(analyzed.knee_angle, analyzed.valgus_angle);
        KneeAnalysis {
            assessment: RiskAssessment::from_angles(analyzed.knee_angle, analyzed.valgus_angle, risk_level),
            analyzed: Some(analyzed),
            left,
            right,
        }
    }
}

impl Default for KneeAnalyzer {
    fn default() -> Self {
        Self::new(RiskThresholds::default(), &DetectionConfig::default())
    }
}
