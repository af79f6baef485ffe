// Terminal output for replayed frames

mod speaker;

use acl_monitor_core::models::{FrameReport, RiskLevel, SessionStats};
use colored::{ColoredString, Colorize};

pub use speaker::ConsoleSpeaker;

/// Risk tier label, coloured by severity
pub fn risk_label(level: RiskLevel) -> ColoredString {
    match level {
        RiskLevel::Low => "LOW".green().bold(),
        RiskLevel::Moderate => "MODERATE".yellow().bold(),
        RiskLevel::High => "HIGH".red().bold(),
    }
}

/// One line describing a processed frame
pub fn format_report(report: &FrameReport) -> String {
    let prefix = format!("[frame {:>5} @ {:>7} ms]", report.frame_number, report.timestamp_ms);

    let assessment = &report.assessment;
    match (report.legs_detected, assessment.knee_angle, assessment.valgus_angle) {
        (true, Some(knee), Some(valgus)) => {
            let side = report
                .analyzed_side
                .map(|side| format!(" ({} leg)", side))
                .unwrap_or_default();
            format!(
                "{} {:<8} knee {:>3}°  valgus {:>3}°{}  {}",
                prefix.dimmed(),
                risk_label(assessment.risk_level),
                knee,
                valgus,
                side,
                assessment.message
            )
        }
        _ => format!("{} {}", prefix.dimmed(), assessment.message.dimmed()),
    }
}

/// Multi-line summary printed when a replay ends
pub fn format_summary(stats: &SessionStats) -> String {
    let mut lines = vec![
        "Session Summary".bold().to_string(),
        "────────────────────────────────".to_string(),
        format!("Session:          {}", stats.session_id),
        format!("Started:          {}", stats.started_at.format("%Y-%m-%d %H:%M:%S UTC")),
        format!("Frames processed: {}", stats.frames_processed),
        format!("  with legs:      {}", stats.frames_with_legs),
        format!("  without legs:   {}", stats.frames_without_legs),
        format!(
            "Risk frames:      {} low / {} moderate / {} high",
            stats.low_risk_frames, stats.moderate_risk_frames, stats.high_risk_frames
        ),
    ];

    if let Some(ratio) = stats.high_risk_ratio() {
        let share = format!("{:.1}%", ratio * 100.0);
        let share = if ratio > 0.25 { share.red() } else { share.green() };
        lines.push(format!("High-risk share:  {}", share));
    }
    lines.push(format!("Coach cues:       {}", stats.advisories_spoken));

    lines.join("\n")
}
