use anyhow::Result;
use std::path::Path;

use acl_monitor_core::PipelineConfig;

use crate::config;

pub fn show_config(explicit: Option<&Path>) -> Result<()> {
    let path = config::resolve_path(explicit)?;
    let effective = config::load(explicit)?;
    let config_str = effective.to_toml_string()?;

    println!("Current Configuration");
    println!("────────────────────────────────");
    println!("File: {}", path.display());
    println!();
    println!("{}", config_str);

    Ok(())
}

pub fn init_config(explicit: Option<&Path>, force: bool) -> Result<()> {
    let path = config::resolve_path(explicit)?;

    if path.exists() && !force {
        println!("Configuration file already exists at: {}", path.display());
        println!("Use --force to overwrite");
        return Ok(());
    }

    config::save(&PipelineConfig::default(), &path)?;

    println!("✓ Configuration initialized at: {}", path.display());

    Ok(())
}
