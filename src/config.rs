use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::baseline::BaselineConfig;
use crate::error::{CoachError, ProfileError};
use crate::logging::LogConfig;
use crate::power::PowerConfig;
use crate::readiness::ThresholdConfig;

/// Default sedentary activity multiplier applied to BMR
pub const SEDENTARY_MULTIPLIER: f64 = 1.2;

const MIN_HEIGHT_CM: f64 = 50.0;
const MAX_HEIGHT_CM: f64 = 272.0;
const MIN_AGE_YEARS: i64 = 1;
const MAX_AGE_YEARS: i64 = 120;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// The single athlete analyzed
    pub profile: AthleteProfile,

    /// Readiness rule thresholds
    #[serde(default)]
    pub thresholds: ThresholdConfig,

    /// Power-curve selection settings
    #[serde(default)]
    pub power: PowerConfig,

    /// Baseline window settings
    #[serde(default)]
    pub baseline: BaselineConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LogConfig,
}

/// Static athlete profile
///
/// Owned by the caller and never mutated by the analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteProfile {
    /// Height in centimeters
    pub height_cm: f64,

    /// Date of birth; preferred over `age_years` when both are set
    pub birth_date: Option<NaiveDate>,

    /// Fixed age in years
    pub age_years: Option<u32>,

    /// Multiplier turning BMR into sedentary daily need
    #[serde(default = "default_activity_multiplier")]
    pub activity_multiplier: f64,

    /// Weight used when the window has no weight reading (kg)
    pub fallback_weight_kg: f64,
}

fn default_activity_multiplier() -> f64 {
    SEDENTARY_MULTIPLIER
}

impl Default for AthleteProfile {
    fn default() -> Self {
        AthleteProfile {
            height_cm: 180.0,
            birth_date: None,
            age_years: Some(35),
            activity_multiplier: SEDENTARY_MULTIPLIER,
            fallback_weight_kg: 75.0,
        }
    }
}

impl AthleteProfile {
    /// Check height, multiplier, fallback weight and the presence of an age
    pub fn validate(&self) -> std::result::Result<(), ProfileError> {
        if !(MIN_HEIGHT_CM..=MAX_HEIGHT_CM).contains(&self.height_cm) {
            return Err(ProfileError::InvalidHeight(self.height_cm));
        }
        if !(self.activity_multiplier.is_finite() && self.activity_multiplier > 0.0) {
            return Err(ProfileError::InvalidActivityMultiplier(
                self.activity_multiplier,
            ));
        }
        if !(self.fallback_weight_kg.is_finite() && self.fallback_weight_kg > 0.0) {
            return Err(ProfileError::InvalidFallbackWeight(self.fallback_weight_kg));
        }
        if self.birth_date.is_none() && self.age_years.is_none() {
            return Err(ProfileError::MissingAge);
        }
        Ok(())
    }

    /// Age in whole years on `date`
    pub fn age_on(&self, date: NaiveDate) -> std::result::Result<u32, ProfileError> {
        let age = match (self.birth_date, self.age_years) {
            (Some(birth), _) => {
                let mut years = (date.year() - birth.year()) as i64;
                if (date.month(), date.day()) < (birth.month(), birth.day()) {
                    years -= 1;
                }
                years
            }
            (None, Some(years)) => years as i64,
            (None, None) => return Err(ProfileError::MissingAge),
        };

        if !(MIN_AGE_YEARS..=MAX_AGE_YEARS).contains(&age) {
            return Err(ProfileError::InvalidAge(age));
        }
        Ok(age as u32)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            profile: AthleteProfile::default(),
            thresholds: ThresholdConfig::default(),
            power: PowerConfig::default(),
            baseline: BaselineConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        Self::from_toml_str(&content).with_context(|| "Invalid TOML configuration")
    }

    /// Parse and validate configuration text
    pub fn from_toml_str(content: &str) -> crate::error::Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the athlete profile and the consistency of the tuning values
    pub fn validate(&self) -> crate::error::Result<()> {
        self.profile.validate()?;

        let t = &self.thresholds;
        if t.hrv_alert_drop > t.hrv_caution_drop {
            return Err(CoachError::Configuration(format!(
                "hrv_alert_drop ({}) must not be above hrv_caution_drop ({})",
                t.hrv_alert_drop, t.hrv_caution_drop
            )));
        }
        if t.rhr_alert_rise < t.rhr_caution_rise {
            return Err(CoachError::Configuration(format!(
                "rhr_alert_rise ({}) must not be below rhr_caution_rise ({})",
                t.rhr_alert_rise, t.rhr_caution_rise
            )));
        }
        if t.load_ramp_lookback == 0 {
            return Err(CoachError::Configuration(
                "load_ramp_lookback must be at least 1".to_string(),
            ));
        }

        let power = &self.power;
        if power.rolling_min_days > power.rolling_max_days {
            return Err(CoachError::Configuration(format!(
                "rolling window range {}..={} days is empty",
                power.rolling_min_days, power.rolling_max_days
            )));
        }
        if let Some(tolerance) = power.marker_tolerance {
            if !(tolerance.is_finite() && tolerance > 0.0) {
                return Err(CoachError::Configuration(format!(
                    "marker_tolerance must be positive, got {}",
                    tolerance
                )));
            }
        }

        if self.baseline.window == Some(0) {
            return Err(CoachError::Configuration(
                "baseline window must cover at least one sample".to_string(),
            ));
        }

        Ok(())
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".coachrs")
            .join("config.toml")
    }
}
