//! Shared domain types, profile schema and environment configuration for the
//! discourse-profile pipeline.

mod app_config;
mod clock;
mod config;
pub mod post;
pub mod profile;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, KeyPair};
pub use clock::{Clock, SystemClock};
pub use config::{load_app_config, load_app_config_from_env};
pub use post::{InteractionType, Post, SubjectProfileMeta};
pub use profile::{
    AnalysisProfile, AxisScore, ConfidenceLevel, ProfileError, TendencyDistribution,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
