use std::env;

use super::PipelineConfig;
use crate::error::{MonitorError, MonitorResult};
use crate::models::ScanMode;

pub const ENV_ATHLETE_NAME: &str = "ACL_MONITOR_ATHLETE_NAME";
pub const ENV_COACH_ENABLED: &str = "ACL_MONITOR_COACH_ENABLED";
pub const ENV_SCAN_MODE: &str = "ACL_MONITOR_SCAN_MODE";

/// Apply environment overrides on top of a loaded configuration
pub fn apply_env_overrides(mut config: PipelineConfig) -> MonitorResult<PipelineConfig> {
    if let Ok(name) = env::var(ENV_ATHLETE_NAME) {
        if !name.trim().is_empty() {
            config.feedback.athlete_name = name.trim().to_string();
        }
    }

    if let Ok(value) = env::var(ENV_COACH_ENABLED) {
        config.feedback.enabled = parse_flag(&value).ok_or_else(|| {
            MonitorError::InvalidConfig(format!("{} must be a boolean, got '{}'", ENV_COACH_ENABLED, value))
        })?;
    }

    if let Ok(value) = env::var(ENV_SCAN_MODE) {
        config.session.scan_mode = value
            .parse::<ScanMode>()
            .map_err(|e| MonitorError::InvalidConfig(format!("{}: {}", ENV_SCAN_MODE, e)))?;
    }

    config.validate()?;
    Ok(config)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
