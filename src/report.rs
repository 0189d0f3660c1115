//! Analysis entry point and the immutable report it produces

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::baseline::{Baseline, BaselineCalculator};
use crate::config::{AppConfig, AthleteProfile};
use crate::energy::{self, EnergyBalance};
use crate::error::Result;
use crate::models::{DailySample, PowerCurveCandidate};
use crate::normalize::{self, NormalizeSummary};
use crate::power::{PowerProfile, PowerProfileExtractor};
use crate::readiness::{AlertCode, ReadinessClassifier, ReadinessLevel, RuleFinding};
use crate::training_load::TrainingLoadSummary;

/// Baseline figures behind the verdict, so it can be audited
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineFigures {
    pub hrv: Baseline,
    pub resting_heart_rate: Baseline,
    pub hrv_change_ratio: Option<f64>,
    pub rhr_change: Option<f64>,
    pub load_ramp: Option<Decimal>,
}

/// Complete result of one analysis call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Date the analysis describes (ages are computed on this date)
    pub as_of: NaiveDate,
    /// Date of the latest sample used, if any
    pub latest_sample: Option<NaiveDate>,
    pub samples_analyzed: usize,
    pub verdict: ReadinessLevel,
    pub alerts: Vec<AlertCode>,
    pub findings: Vec<RuleFinding>,
    pub baselines: BaselineFigures,
    pub power: PowerProfile,
    pub energy: EnergyBalance,
    pub training_load: TrainingLoadSummary,
    /// Present when the report was built from raw records
    pub input: Option<NormalizeSummary>,
}

impl AnalysisReport {
    pub fn has_alert(&self, code: AlertCode) -> bool {
        self.alerts.contains(&code)
    }

    /// `(seconds, W/kg)` at each canonical marker, using the current weight
    pub fn relative_power(&self) -> [(u32, Option<f64>); 4] {
        self.power.watts_per_kg(self.energy.current_weight)
    }
}

/// Runs every analysis stage over one window
///
/// Stateless between calls; the same analyzer can be shared freely.
#[derive(Debug, Clone)]
pub struct AthleteStateAnalyzer {
    profile: AthleteProfile,
    classifier: ReadinessClassifier,
    power: PowerProfileExtractor,
}

impl AthleteStateAnalyzer {
    /// Analyzer with default thresholds; fails on an invalid profile
    pub fn new(profile: AthleteProfile) -> Result<Self> {
        profile.validate()?;
        Ok(AthleteStateAnalyzer {
            profile,
            classifier: ReadinessClassifier::new(),
            power: PowerProfileExtractor::new(),
        })
    }

    /// Analyzer configured from an [`AppConfig`]
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate()?;
        Ok(AthleteStateAnalyzer {
            profile: config.profile.clone(),
            classifier: ReadinessClassifier::with_config(
                config.thresholds.clone(),
                BaselineCalculator::with_config(config.baseline.clone()),
            ),
            power: PowerProfileExtractor::with_config(config.power.clone()),
        })
    }

    pub fn profile(&self) -> &AthleteProfile {
        &self.profile
    }

    /// Analyze typed samples and power-curve candidates
    ///
    /// Samples dated after `as_of` are ignored. Without `as_of` the latest
    /// sample date is used, or today's date for an empty window.
    #[tracing::instrument(skip_all, fields(samples = samples.len(), candidates = candidates.len()))]
    pub fn analyze(
        &self,
        samples: &[DailySample],
        candidates: &[PowerCurveCandidate],
        as_of: Option<NaiveDate>,
    ) -> Result<AnalysisReport> {
        let mut window = normalize::sort_samples(samples);
        if let Some(cutoff) = as_of {
            window.retain(|s| s.date <= cutoff);
        }
        let latest_sample = window.last().map(|s| s.date);
        let as_of = as_of
            .or(latest_sample)
            .unwrap_or_else(|| chrono::Utc::now().date_naive());

        let energy = energy::estimate_balance(&window, &self.profile, as_of)?;
        let readiness = self.classifier.classify(&window);
        let power = self.power.extract(candidates);
        let training_load = TrainingLoadSummary::from_window(&window);

        info!(
            verdict = %readiness.level,
            alerts = readiness.alerts.len(),
            power_source = ?power.source,
            "analysis complete"
        );

        Ok(AnalysisReport {
            as_of,
            latest_sample,
            samples_analyzed: window.len(),
            verdict: readiness.level,
            alerts: readiness.alerts,
            findings: readiness.findings,
            baselines: BaselineFigures {
                hrv: readiness.hrv_baseline,
                resting_heart_rate: readiness.rhr_baseline,
                hrv_change_ratio: readiness.hrv_change_ratio,
                rhr_change: readiness.rhr_change,
                load_ramp: readiness.load_ramp,
            },
            power,
            energy,
            training_load,
            input: None,
        })
    }

    /// Parse raw training-log exports, then analyze them
    pub fn analyze_raw(
        &self,
        wellness: &Value,
        power_curves: &Value,
        as_of: Option<NaiveDate>,
    ) -> Result<AnalysisReport> {
        let window = normalize::parse_wellness(wellness)?;
        let candidates = normalize::parse_power_curves(power_curves)?;

        let mut report = self.analyze(&window.samples, &candidates, as_of)?;
        report.input = Some(window.summary);
        Ok(report)
    }
}
