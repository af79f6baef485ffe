pub mod knee_analysis_test;
