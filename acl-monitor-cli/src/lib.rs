// Library exports for the acl-monitor CLI
// This allows testing of internal modules

pub mod commands;
pub mod config;
pub mod ui;
