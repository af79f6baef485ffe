// Frame-processing pipeline stages

pub mod feedback_service;
pub mod knee_analysis_service;
pub mod landmark_filter;
pub mod monitoring_session;
pub mod smoothing_service;

pub use feedback_service::{FeedbackThrottle, NoopSpeaker, Speaker};
pub use knee_analysis_service::{KneeAnalysis, KneeAnalyzer};
pub use landmark_filter::LegLandmarkFilter;
pub use monitoring_session::{MonitoringSession, SharedMonitoringSession};
pub use smoothing_service::{NormalizedPoint, SmoothingOutcome, TemporalSmoother};
