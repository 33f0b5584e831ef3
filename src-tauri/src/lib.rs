//! On-device family habit tracking: records, encrypted storage and the
//! habit trend forecaster behind the dashboard.

pub mod config;
pub mod crypto;
pub mod journal;
pub mod models;
pub mod prediction;
pub mod storage;

pub use config::PredictionConfig;
pub use prediction::{aggregate_analytics, habit_stats, Forecaster, Trajectory};
