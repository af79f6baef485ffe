use acl_monitor_core::models::{PixelPoint, RiskLevel};
use acl_monitor_core::services::knee_analysis_service::{
    calculate_joint_angle, knee_flexion_angle, valgus_angle,
};
use acl_monitor_core::services::KneeAnalyzer;
use proptest::prelude::*;

#[cfg(test)]
mod knee_analysis_tests {
    use super::*;

    #[test]
    fn test_straight_and_right_angle_legs() {
        let hip = PixelPoint::new(320.0, 100.0);
        let knee = PixelPoint::new(320.0, 250.0);
        let ankle = PixelPoint::new(320.0, 400.0);
        assert_eq!(knee_flexion_angle(&hip, &knee, &ankle), Some(180));

        let bent_ankle = PixelPoint::new(470.0, 250.0);
        assert_eq!(knee_flexion_angle(&hip, &knee, &bent_ankle), Some(90));
    }

    #[test]
    fn test_reference_classifications() {
        let analyzer = KneeAnalyzer::default();

        // Flexion rule
        assert_eq!(analyzer.classify(25, 5), RiskLevel::High);
        // Valgus between 8 and 15
        assert_eq!(analyzer.classify(50, 10), RiskLevel::Moderate);
        assert_eq!(analyzer.classify(60, 3), RiskLevel::Low);
    }

    #[test]
    fn test_valgus_is_relative_to_thigh_length() {
        let hip = PixelPoint::new(200.0, 100.0);
        let ankle = PixelPoint::new(200.0, 400.0);

        // Same sideways offset, longer thigh: smaller angle
        let short = valgus_angle(&hip, &PixelPoint::new(230.0, 200.0), &ankle).unwrap();
        let long = valgus_angle(&hip, &PixelPoint::new(230.0, 300.0), &ankle).unwrap();
        assert!(short > long, "short={short} long={long}");
    }

    proptest! {
        #[test]
        fn prop_joint_angle_within_half_turn(
            ax in -1000.0f64..1000.0, ay in -1000.0f64..1000.0,
            bx in -1000.0f64..1000.0, by in -1000.0f64..1000.0,
            cx in -1000.0f64..1000.0, cy in -1000.0f64..1000.0,
        ) {
            let a = PixelPoint::new(ax, ay);
            let b = PixelPoint::new(bx, by);
            let c = PixelPoint::new(cx, cy);
            if let Some(angle) = calculate_joint_angle(&a, &b, &c) {
                prop_assert!(angle >= 0.0 && angle <= 180.0 + 1e-9, "angle={}", angle);
            }
        }

        #[test]
        fn prop_more_valgus_never_lowers_risk(knee in 0i32..=180, v1 in -30i32..=30, extra in 0i32..=30) {
            let analyzer = KneeAnalyzer::default();
            prop_assert!(analyzer.classify(knee, v1) <= analyzer.classify(knee, v1 + extra));
        }

        #[test]
        fn prop_more_flexion_never_raises_risk(valgus in -30i32..=30, k1 in 0i32..=180, extra in 0i32..=180) {
            let analyzer = KneeAnalyzer::default();
            prop_assert!(analyzer.classify(k1 + extra, valgus) <= analyzer.classify(k1, valgus));
        }
    }
}
