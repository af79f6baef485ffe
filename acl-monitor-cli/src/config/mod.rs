use acl_monitor_core::config::apply_env_overrides;
use acl_monitor_core::PipelineConfig;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Get config directory path (~/.acl-monitor/)
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".acl-monitor"))
}

/// Get config file path (~/.acl-monitor/config.toml)
pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Config file to use: the explicit path if given, the default location otherwise
pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => config_file(),
    }
}

/// Load the pipeline configuration and apply environment overrides
///
/// A missing file at the default location means defaults; a missing file
/// that was asked for explicitly is an error.
pub fn load(explicit: Option<&Path>) -> Result<PipelineConfig> {
    let path = resolve_path(explicit)?;

    let config = if path.exists() {
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        PipelineConfig::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?
    } else if explicit.is_some() {
        anyhow::bail!("Config file not found: {}", path.display());
    } else {
        tracing::info!("Config file not found, using defaults");
        PipelineConfig::default()
    };

    apply_env_overrides(config).context("Invalid configuration from environment")
}

/// Save configuration to file, creating parent directories
pub fn save(config: &PipelineConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let contents = config.to_toml_string().context("Failed to serialize config")?;
    fs::write(path, contents).context("Failed to write config file")?;

    Ok(())
}
