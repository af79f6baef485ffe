//! Real-time knee alignment monitoring from pose-estimation landmarks.
//!
//! Frames flow through a fixed pipeline: leg landmark filtering, temporal
//! smoothing, knee geometry and risk classification, and a rate-limited
//! spoken advisory. [`services::MonitoringSession`] owns all per-session
//! state and is the entry point for callers.

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::PipelineConfig;
pub use error::{MonitorError, MonitorResult};
pub use services::{MonitoringSession, SharedMonitoringSession, Speaker};
