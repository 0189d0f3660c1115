//! Unified error hierarchy for CoachRS
//!
//! Data sparsity is never an error in this crate: missing readings, short
//! windows and empty power curves all degrade into "unknown" values inside
//! the report. The variants here cover configuration problems and the I/O
//! performed by the command-line glue.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for all CoachRS operations
#[derive(Debug, Error)]
pub enum CoachError {
    /// Static athlete profile is invalid
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    /// Configuration errors other than the athlete profile
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Input payload is not the expected shape at all (e.g. not a JSON array)
    #[error("Validation error: {0}")]
    Validation(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML decoding errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// File could not be found
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },
}

/// Athlete profile validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    /// Height outside the plausible human range
    #[error("Invalid height: {0} cm (valid range: 50-272 cm)")]
    InvalidHeight(f64),

    /// Age outside the plausible range
    #[error("Invalid age: {0} years (valid range: 1-120)")]
    InvalidAge(i64),

    /// Neither birth date nor fixed age configured
    #[error("Missing age: profile needs a birth date or a fixed age")]
    MissingAge,

    /// Activity multiplier must be positive
    #[error("Invalid activity multiplier: {0}")]
    InvalidActivityMultiplier(f64),

    /// Fallback weight must be positive
    #[error("Invalid fallback weight: {0} kg")]
    InvalidFallbackWeight(f64),
}

/// Result type alias for CoachRS operations
pub type Result<T> = std::result::Result<T, CoachError>;

impl CoachError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoachError::Profile(_) => ErrorSeverity::Critical,
            CoachError::Configuration(_) => ErrorSeverity::Critical,
            CoachError::Validation(_) => ErrorSeverity::Warning,
            CoachError::FileNotFound { .. } => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            CoachError::Profile(err) => {
                format!("Athlete profile is misconfigured: {}. Check config.toml.", err)
            }
            CoachError::FileNotFound { path } => {
                format!("Could not find input file: {}", path.display())
            }
            CoachError::Json(_) => {
                "Input data is not valid JSON. Re-export it from the training log.".to_string()
            }
            CoachError::Toml(err) => format!("config.toml could not be parsed: {}", err),
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical error, the analysis cannot run at all
    Critical,
    /// Error that prevents the operation
    Error,
    /// Warning that doesn't prevent operation
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical | ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}
