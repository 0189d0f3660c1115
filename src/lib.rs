// Library interface for CoachRS modules
// The binary and the integration tests both go through this crate root

pub mod advice;
pub mod baseline;
pub mod config;
pub mod energy;
pub mod error;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod power;
pub mod readiness;
pub mod report;
pub mod training_load;

// Re-export commonly used types for convenience
pub use models::*;
pub use advice::{AdvicePayload, WeatherSnapshot};
pub use baseline::{baseline, Baseline, BaselineCalculator, BaselineConfig};
pub use config::{AppConfig, AthleteProfile};
pub use energy::{estimate_balance, EnergyBalance};
pub use error::{CoachError, ProfileError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use power::{PowerConfig, PowerProfile, PowerProfileExtractor};
pub use readiness::{AlertCode, ReadinessClassifier, ReadinessLevel, ThresholdConfig};
pub use report::{AnalysisReport, AthleteStateAnalyzer};
