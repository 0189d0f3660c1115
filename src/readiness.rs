//! Readiness classification from daily physiological signals
//!
//! Every rule is evaluated independently against the latest sample and its
//! own baseline. The verdict is the highest level any rule raised:
//! `Alert` dominates `Caution` dominates `Ok`. Rules that cannot be evaluated
//! (missing reading, too little history) are recorded as skipped and never
//! lower the level.
//!
//! | Rule          | Caution                 | Alert                      | Code                |
//! |---------------|-------------------------|----------------------------|---------------------|
//! | HRV drop      | < -10% vs baseline      | < -15% vs baseline         | `HRV_DROP`          |
//! | RHR rise      | > +2 bpm vs baseline    | > +5 bpm vs baseline       | `RHR_SPIKE`         |
//! | Illness       |                         | HRV and RHR both at caution| `ILLNESS_SUSPECTED` |
//! | SpO2          |                         | < 95%                      | `LOW_SPO2`          |
//! | Sleep         | < 6 h                   |                            | `LOW_SLEEP`         |
//! | Water weight  | informational, +1.2 kg day over day  |               | `WATER_RETENTION`   |
//! | Load ramp     |                         | ATL > 1.3x ATL 7 days back | `LOAD_RAMP_UNSAFE`  |

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::baseline::{Baseline, BaselineCalculator};
use crate::models::{DailySample, Metric};
use crate::normalize::sort_samples;

/// Tri-state readiness verdict, ordered by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadinessLevel {
    Ok,
    Caution,
    Alert,
}

impl fmt::Display for ReadinessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadinessLevel::Ok => write!(f, "OK"),
            ReadinessLevel::Caution => write!(f, "CAUTION"),
            ReadinessLevel::Alert => write!(f, "ALERT"),
        }
    }
}

/// Discrete alert codes attached to a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertCode {
    HrvDrop,
    RhrSpike,
    IllnessSuspected,
    LowSpo2,
    LowSleep,
    WaterRetention,
    LoadRampUnsafe,
}

impl AlertCode {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            AlertCode::HrvDrop => "HRV_DROP",
            AlertCode::RhrSpike => "RHR_SPIKE",
            AlertCode::IllnessSuspected => "ILLNESS_SUSPECTED",
            AlertCode::LowSpo2 => "LOW_SPO2",
            AlertCode::LowSleep => "LOW_SLEEP",
            AlertCode::WaterRetention => "WATER_RETENTION",
            AlertCode::LoadRampUnsafe => "LOAD_RAMP_UNSAFE",
        }
    }

    /// Human-readable explanation
    pub fn description(&self) -> &'static str {
        match self {
            AlertCode::HrvDrop => "HRV well below personal baseline",
            AlertCode::RhrSpike => "Resting heart rate well above personal baseline",
            AlertCode::IllnessSuspected => {
                "HRV down and resting heart rate up on the same day, possible illness"
            }
            AlertCode::LowSpo2 => "Blood oxygen below normal range",
            AlertCode::LowSleep => "Short sleep",
            AlertCode::WaterRetention => {
                "Sudden day-over-day weight gain, likely water; ignore for diet decisions"
            }
            AlertCode::LoadRampUnsafe => "Acute training load ramping faster than is safe",
        }
    }
}

impl fmt::Display for AlertCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Individual readiness rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    HrvDrop,
    RhrRise,
    IllnessSignal,
    BloodOxygen,
    Sleep,
    WaterWeight,
    LoadRamp,
}

/// Why a rule could not be evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The window is empty
    NoSamples,
    /// Today's reading is absent
    MissingReading,
    /// Not enough prior samples for a baseline
    InsufficientHistory { required: usize, available: usize },
    /// The comparison day is absent or lacks the reading
    NoComparisonDay,
    /// The baseline mean is zero or negative, so a relative change is undefined
    NonPositiveBaseline,
}

/// Outcome of one rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOutcome {
    /// Rule fired; `level` is `None` for informational rules
    Triggered { level: Option<ReadinessLevel> },
    Clear,
    Skipped { reason: SkipReason },
}

/// Audit record for one rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleFinding {
    pub rule: Rule,
    pub outcome: RuleOutcome,
}

/// Readiness rule thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Prior samples a HRV/RHR baseline needs before it is trusted
    pub min_baseline_samples: usize,

    /// Relative HRV change below which the level becomes CAUTION
    pub hrv_caution_drop: f64,

    /// Relative HRV change below which the level becomes ALERT
    pub hrv_alert_drop: f64,

    /// RHR rise (bpm) above which the level becomes CAUTION
    pub rhr_caution_rise: f64,

    /// RHR rise (bpm) above which the level becomes ALERT
    pub rhr_alert_rise: f64,

    /// SpO2 (%) below which the level becomes ALERT
    pub min_blood_oxygen: f64,

    /// Sleep (hours) below which the level becomes CAUTION
    pub min_sleep_hours: f64,

    /// Day-over-day weight gain (kg) flagged as water retention
    pub water_retention_gain_kg: f64,

    /// How many samples back the load-ramp comparison looks
    pub load_ramp_lookback: usize,

    /// Minimum earlier ATL for the ramp rule to apply
    pub load_ramp_min_atl: Decimal,

    /// ATL growth ratio above which the ramp is unsafe
    pub load_ramp_ratio: Decimal,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        ThresholdConfig {
            min_baseline_samples: 4,
            hrv_caution_drop: -0.10,
            hrv_alert_drop: -0.15,
            rhr_caution_rise: 2.0,
            rhr_alert_rise: 5.0,
            min_blood_oxygen: 95.0,
            min_sleep_hours: 6.0,
            water_retention_gain_kg: 1.2,
            load_ramp_lookback: 7,
            load_ramp_min_atl: dec!(10),
            load_ramp_ratio: dec!(1.3),
        }
    }
}

/// Result of classifying a window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessAssessment {
    pub level: ReadinessLevel,
    /// Alert codes in rule order, without duplicates
    pub alerts: Vec<AlertCode>,
    pub findings: Vec<RuleFinding>,
    pub hrv_baseline: Baseline,
    pub rhr_baseline: Baseline,
    /// `(today - baseline) / baseline` for HRV
    pub hrv_change_ratio: Option<f64>,
    /// `today - baseline` for RHR, in bpm
    pub rhr_change: Option<f64>,
    /// ATL today divided by ATL `load_ramp_lookback` samples back
    pub load_ramp: Option<Decimal>,
}

impl ReadinessAssessment {
    pub fn has(&self, code: AlertCode) -> bool {
        self.alerts.contains(&code)
    }

    /// Finding for a given rule
    pub fn finding(&self, rule: Rule) -> Option<&RuleFinding> {
        self.findings.iter().find(|f| f.rule == rule)
    }
}

/// Accumulates level and codes; the level can only go up
#[derive(Debug, Default)]
struct Verdict {
    level: Option<ReadinessLevel>,
    alerts: Vec<AlertCode>,
    findings: Vec<RuleFinding>,
}

impl Verdict {
    fn raise(&mut self, level: ReadinessLevel) {
        self.level = Some(self.level.map_or(level, |current| current.max(level)));
    }

    fn alert(&mut self, code: AlertCode) {
        if !self.alerts.contains(&code) {
            self.alerts.push(code);
        }
    }

    fn record(&mut self, rule: Rule, outcome: RuleOutcome) {
        if let RuleOutcome::Triggered { level: Some(level) } = outcome {
            self.raise(level);
        }
        debug!(?rule, ?outcome, "readiness rule evaluated");
        self.findings.push(RuleFinding { rule, outcome });
    }

    fn skip(&mut self, rule: Rule, reason: SkipReason) {
        self.record(rule, RuleOutcome::Skipped { reason });
    }
}

/// Threshold-based readiness classifier
#[derive(Debug, Clone, Default)]
pub struct ReadinessClassifier {
    thresholds: ThresholdConfig,
    baselines: BaselineCalculator,
}

impl ReadinessClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(thresholds: ThresholdConfig, baselines: BaselineCalculator) -> Self {
        ReadinessClassifier {
            thresholds,
            baselines,
        }
    }

    /// Classify the latest day of the window
    pub fn classify(&self, samples: &[DailySample]) -> ReadinessAssessment {
        let samples = sort_samples(samples);
        let hrv_baseline = self.baselines.compute(&samples, Metric::Hrv, true);
        let rhr_baseline = self.baselines.compute(&samples, Metric::RestingHeartRate, true);

        let mut verdict = Verdict::default();

        let Some(today) = samples.last() else {
            for rule in [
                Rule::HrvDrop,
                Rule::RhrRise,
                Rule::IllnessSignal,
                Rule::BloodOxygen,
                Rule::Sleep,
                Rule::WaterWeight,
                Rule::LoadRamp,
            ] {
                verdict.skip(rule, SkipReason::NoSamples);
            }
            return ReadinessAssessment {
                level: ReadinessLevel::Ok,
                alerts: Vec::new(),
                findings: verdict.findings,
                hrv_baseline,
                rhr_baseline,
                hrv_change_ratio: None,
                rhr_change: None,
                load_ramp: None,
            };
        };

        let hrv_change = self.hrv_rule(today, &hrv_baseline, &mut verdict);
        let rhr_change = self.rhr_rule(today, &rhr_baseline, &mut verdict);
        self.illness_rule(hrv_change, rhr_change, &mut verdict);
        self.blood_oxygen_rule(today, &mut verdict);
        self.sleep_rule(today, &mut verdict);
        self.water_weight_rule(&samples, &mut verdict);
        let load_ramp = self.load_ramp_rule(&samples, &mut verdict);

        ReadinessAssessment {
            level: verdict.level.unwrap_or(ReadinessLevel::Ok),
            alerts: verdict.alerts,
            findings: verdict.findings,
            hrv_baseline,
            rhr_baseline,
            hrv_change_ratio: hrv_change.ok(),
            rhr_change: rhr_change.ok(),
            load_ramp,
        }
    }

    fn trusted_baseline(&self, baseline: &Baseline) -> Result<f64, SkipReason> {
        let required = self.thresholds.min_baseline_samples;
        baseline
            .value_with_at_least(required)
            .ok_or(SkipReason::InsufficientHistory {
                required,
                available: baseline.samples_used,
            })
    }

    /// Relative HRV change, or why it could not be computed
    fn hrv_rule(
        &self,
        today: &DailySample,
        baseline: &Baseline,
        verdict: &mut Verdict,
    ) -> Result<f64, SkipReason> {
        let evaluated = today
            .hrv
            .ok_or(SkipReason::MissingReading)
            .and_then(|hrv| {
                let base = self.trusted_baseline(baseline)?;
                if base <= 0.0 {
                    return Err(SkipReason::NonPositiveBaseline);
                }
                Ok((hrv - base) / base)
            });
        let change = match evaluated {
            Ok(change) => change,
            Err(reason) => {
                verdict.skip(Rule::HrvDrop, reason);
                return Err(reason);
            }
        };

        let t = &self.thresholds;
        if change < t.hrv_alert_drop {
            verdict.alert(AlertCode::HrvDrop);
            verdict.record(Rule::HrvDrop, triggered(ReadinessLevel::Alert));
        } else if change < t.hrv_caution_drop {
            verdict.record(Rule::HrvDrop, triggered(ReadinessLevel::Caution));
        } else {
            verdict.record(Rule::HrvDrop, RuleOutcome::Clear);
        }
        Ok(change)
    }

    /// RHR change in bpm, or why it could not be computed
    fn rhr_rule(
        &self,
        today: &DailySample,
        baseline: &Baseline,
        verdict: &mut Verdict,
    ) -> Result<f64, SkipReason> {
        let evaluated = today
            .resting_heart_rate
            .ok_or(SkipReason::MissingReading)
            .and_then(|rhr| Ok(rhr - self.trusted_baseline(baseline)?));
        let change = match evaluated {
            Ok(change) => change,
            Err(reason) => {
                verdict.skip(Rule::RhrRise, reason);
                return Err(reason);
            }
        };

        let t = &self.thresholds;
        if change > t.rhr_alert_rise {
            verdict.alert(AlertCode::RhrSpike);
            verdict.record(Rule::RhrRise, triggered(ReadinessLevel::Alert));
        } else if change > t.rhr_caution_rise {
            verdict.record(Rule::RhrRise, triggered(ReadinessLevel::Caution));
        } else {
            verdict.record(Rule::RhrRise, RuleOutcome::Clear);
        }
        Ok(change)
    }

    /// Skipped with the HRV rule's reason first, then the RHR rule's
    fn illness_rule(
        &self,
        hrv_change: Result<f64, SkipReason>,
        rhr_change: Result<f64, SkipReason>,
        verdict: &mut Verdict,
    ) {
        let (hrv_change, rhr_change) = match (hrv_change, rhr_change) {
            (Ok(hrv), Ok(rhr)) => (hrv, rhr),
            (Err(reason), _) | (_, Err(reason)) => {
                verdict.skip(Rule::IllnessSignal, reason);
                return;
            }
        };

        let t = &self.thresholds;
        if hrv_change < t.hrv_caution_drop && rhr_change > t.rhr_caution_rise {
            verdict.alert(AlertCode::IllnessSuspected);
            verdict.record(Rule::IllnessSignal, triggered(ReadinessLevel::Alert));
        } else {
            verdict.record(Rule::IllnessSignal, RuleOutcome::Clear);
        }
    }

    fn blood_oxygen_rule(&self, today: &DailySample, verdict: &mut Verdict) {
        match today.blood_oxygen {
            None => verdict.skip(Rule::BloodOxygen, SkipReason::MissingReading),
            Some(spo2) if spo2 < self.thresholds.min_blood_oxygen => {
                verdict.alert(AlertCode::LowSpo2);
                verdict.record(Rule::BloodOxygen, triggered(ReadinessLevel::Alert));
            }
            Some(_) => verdict.record(Rule::BloodOxygen, RuleOutcome::Clear),
        }
    }

    fn sleep_rule(&self, today: &DailySample, verdict: &mut Verdict) {
        match today.sleep_hours {
            None => verdict.skip(Rule::Sleep, SkipReason::MissingReading),
            Some(hours) if hours < self.thresholds.min_sleep_hours => {
                verdict.alert(AlertCode::LowSleep);
                verdict.record(Rule::Sleep, triggered(ReadinessLevel::Caution));
            }
            Some(_) => verdict.record(Rule::Sleep, RuleOutcome::Clear),
        }
    }

    fn water_weight_rule(&self, samples: &[DailySample], verdict: &mut Verdict) {
        let Some((today, earlier)) = samples.split_last() else {
            return;
        };
        let Some(weight) = today.weight else {
            verdict.skip(Rule::WaterWeight, SkipReason::MissingReading);
            return;
        };

        let yesterday = today.date.pred_opt();
        let previous = earlier
            .last()
            .filter(|s| Some(s.date) == yesterday)
            .and_then(|s| s.weight);
        let Some(previous) = previous else {
            verdict.skip(Rule::WaterWeight, SkipReason::NoComparisonDay);
            return;
        };

        if weight - previous > self.thresholds.water_retention_gain_kg {
            verdict.alert(AlertCode::WaterRetention);
            verdict.record(Rule::WaterWeight, RuleOutcome::Triggered { level: None });
        } else {
            verdict.record(Rule::WaterWeight, RuleOutcome::Clear);
        }
    }

    fn load_ramp_rule(&self, samples: &[DailySample], verdict: &mut Verdict) -> Option<Decimal> {
        let t = &self.thresholds;
        let today = samples.last()?;
        let Some(atl) = today.acute_training_load else {
            verdict.skip(Rule::LoadRamp, SkipReason::MissingReading);
            return None;
        };

        let earlier_atl = samples
            .len()
            .checked_sub(t.load_ramp_lookback + 1)
            .and_then(|index| samples[index].acute_training_load)
            .filter(|earlier| *earlier > t.load_ramp_min_atl);
        let Some(earlier_atl) = earlier_atl else {
            verdict.skip(Rule::LoadRamp, SkipReason::NoComparisonDay);
            return None;
        };

        // An overflowing limit is above any representable ATL
        let unsafe_ramp = earlier_atl
            .checked_mul(t.load_ramp_ratio)
            .is_some_and(|limit| atl > limit);
        if unsafe_ramp {
            verdict.alert(AlertCode::LoadRampUnsafe);
            verdict.record(Rule::LoadRamp, triggered(ReadinessLevel::Alert));
        } else {
            verdict.record(Rule::LoadRamp, RuleOutcome::Clear);
        }
        atl.checked_div(earlier_atl)
    }
}

fn triggered(level: ReadinessLevel) -> RuleOutcome {
    RuleOutcome::Triggered { level: Some(level) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::prelude::FromPrimitive;

    fn window(days: usize) -> Vec<DailySample> {
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        (0..days)
            .map(|i| DailySample::new(start + chrono::Days::new(i as u64)))
            .collect()
    }

    fn with_hrv(mut samples: Vec<DailySample>, steady: f64, today: f64) -> Vec<DailySample> {
        let last = samples.len() - 1;
        for (i, s) in samples.iter_mut().enumerate() {
            s.hrv = Some(if i == last { today } else { steady });
        }
        samples
    }

    fn with_rhr(mut samples: Vec<DailySample>, steady: f64, today: f64) -> Vec<DailySample> {
        let last = samples.len() - 1;
        for (i, s) in samples.iter_mut().enumerate() {
            s.resting_heart_rate = Some(if i == last { today } else { steady });
        }
        samples
    }

    #[test]
    fn test_empty_window_is_ok() {
        let assessment = ReadinessClassifier::new().classify(&[]);
        assert_eq!(assessment.level, ReadinessLevel::Ok);
        assert!(assessment.alerts.is_empty());
        assert_eq!(assessment.findings.len(), 7);
    }

    #[test]
    fn test_hrv_drop_alert() {
        let samples = with_hrv(window(10), 40.0, 33.0);
        let assessment = ReadinessClassifier::new().classify(&samples);

        assert_eq!(assessment.level, ReadinessLevel::Alert);
        assert!(assessment.has(AlertCode::HrvDrop));
        assert!((assessment.hrv_change_ratio.unwrap() + 0.175).abs() < 1e-9);
        assert_eq!(assessment.hrv_baseline.samples_used, 9);
    }

    #[test]
    fn test_hrv_moderate_drop_is_caution_without_code() {
        let samples = with_hrv(window(10), 40.0, 35.0);
        let assessment = ReadinessClassifier::new().classify(&samples);

        assert_eq!(assessment.level, ReadinessLevel::Caution);
        assert!(assessment.alerts.is_empty());
    }

    #[test]
    fn test_hrv_needs_four_prior_samples() {
        let samples = with_hrv(window(4), 40.0, 20.0);
        let assessment = ReadinessClassifier::new().classify(&samples);

        assert_eq!(assessment.level, ReadinessLevel::Ok);
        assert_eq!(
            assessment.finding(Rule::HrvDrop).unwrap().outcome,
            RuleOutcome::Skipped {
                reason: SkipReason::InsufficientHistory {
                    required: 4,
                    available: 3
                }
            }
        );
    }

    #[test]
    fn test_rhr_spike_and_illness() {
        let samples = with_rhr(window(7), 55.0, 62.0);
        let assessment = ReadinessClassifier::new().classify(&samples);
        assert_eq!(assessment.level, ReadinessLevel::Alert);
        assert!(assessment.has(AlertCode::RhrSpike));
        assert!(!assessment.has(AlertCode::IllnessSuspected));

        let samples = with_hrv(with_rhr(window(7), 55.0, 62.0), 40.0, 33.0);
        let assessment = ReadinessClassifier::new().classify(&samples);
        assert!(assessment.has(AlertCode::RhrSpike));
        assert!(assessment.has(AlertCode::HrvDrop));
        assert!(assessment.has(AlertCode::IllnessSuspected));
    }

    #[test]
    fn test_illness_from_caution_level_signals() {
        // -12.5% HRV and +3 bpm: each alone is only CAUTION
        let samples = with_hrv(with_rhr(window(7), 55.0, 58.0), 40.0, 35.0);
        let assessment = ReadinessClassifier::new().classify(&samples);

        assert_eq!(assessment.level, ReadinessLevel::Alert);
        assert_eq!(assessment.alerts, vec![AlertCode::IllnessSuspected]);
    }

    #[test]
    fn test_low_spo2_and_sleep() {
        let mut samples = window(1);
        samples[0].blood_oxygen = Some(93.0);
        samples[0].sleep_hours = Some(5.5);

        let assessment = ReadinessClassifier::new().classify(&samples);
        assert_eq!(assessment.level, ReadinessLevel::Alert);
        assert_eq!(assessment.alerts, vec![AlertCode::LowSpo2, AlertCode::LowSleep]);
    }

    #[test]
    fn test_low_sleep_alone_is_caution() {
        let mut samples = window(2);
        samples[1].sleep_hours = Some(4.0);
        samples[1].blood_oxygen = Some(97.0);

        let assessment = ReadinessClassifier::new().classify(&samples);
        assert_eq!(assessment.level, ReadinessLevel::Caution);
        assert_eq!(assessment.alerts, vec![AlertCode::LowSleep]);
    }

    #[test]
    fn test_water_retention_is_informational() {
        let mut samples = window(2);
        samples[0].weight = Some(100.0);
        samples[1].weight = Some(101.5);

        let assessment = ReadinessClassifier::new().classify(&samples);
        assert_eq!(assessment.level, ReadinessLevel::Ok);
        assert_eq!(assessment.alerts, vec![AlertCode::WaterRetention]);
    }

    #[test]
    fn test_water_retention_needs_consecutive_day() {
        let mut samples = window(3);
        samples[0].weight = Some(100.0);
        samples.remove(1);
        samples[1].weight = Some(102.0);

        let assessment = ReadinessClassifier::new().classify(&samples);
        assert!(!assessment.has(AlertCode::WaterRetention));
    }

    #[test]
    fn test_load_ramp_unsafe() {
        let mut samples = window(8);
        samples[0].acute_training_load = Some(dec!(40));
        samples[7].acute_training_load = Some(dec!(53));

        let assessment = ReadinessClassifier::new().classify(&samples);
        assert_eq!(assessment.level, ReadinessLevel::Alert);
        assert!(assessment.has(AlertCode::LoadRampUnsafe));
        assert_eq!(assessment.load_ramp, Some(dec!(1.325)));
    }

    #[test]
    fn test_load_ramp_ignores_low_base() {
        let mut samples = window(8);
        samples[0].acute_training_load = Some(dec!(8));
        samples[7].acute_training_load = Some(dec!(30));

        let assessment = ReadinessClassifier::new().classify(&samples);
        assert!(!assessment.has(AlertCode::LoadRampUnsafe));
        assert_eq!(assessment.level, ReadinessLevel::Ok);
    }

    #[test]
    fn test_load_ramp_huge_atl_does_not_overflow() {
        let mut samples = window(8);
        let huge = Decimal::from_f64(7.0e28).unwrap();
        for s in samples.iter_mut() {
            s.acute_training_load = Some(huge);
        }

        let assessment = ReadinessClassifier::new().classify(&samples);
        assert_eq!(assessment.level, ReadinessLevel::Ok);
        assert_eq!(
            assessment.finding(Rule::LoadRamp).unwrap().outcome,
            RuleOutcome::Clear
        );
        assert_eq!(assessment.load_ramp, Some(Decimal::ONE));
    }

    #[test]
    fn test_zero_hrv_baseline_reason() {
        let samples = with_hrv(window(6), 0.0, 30.0);
        let assessment = ReadinessClassifier::new().classify(&samples);

        assert_eq!(
            assessment.finding(Rule::HrvDrop).unwrap().outcome,
            RuleOutcome::Skipped {
                reason: SkipReason::NonPositiveBaseline
            }
        );
        assert_eq!(assessment.hrv_change_ratio, None);
    }

    #[test]
    fn test_illness_skip_carries_upstream_reason() {
        // HRV has only two prior days; RHR is missing today
        let mut samples = with_hrv(window(3), 40.0, 30.0);
        samples[0].resting_heart_rate = Some(55.0);

        let assessment = ReadinessClassifier::new().classify(&samples);
        let insufficient = RuleOutcome::Skipped {
            reason: SkipReason::InsufficientHistory {
                required: 4,
                available: 2,
            },
        };
        assert_eq!(assessment.finding(Rule::HrvDrop).unwrap().outcome, insufficient);
        assert_eq!(
            assessment.finding(Rule::IllnessSignal).unwrap().outcome,
            insufficient
        );

        let mut samples = with_rhr(with_hrv(window(6), 40.0, 39.0), 55.0, 55.0);
        samples[5].resting_heart_rate = None;
        let assessment = ReadinessClassifier::new().classify(&samples);
        assert_eq!(
            assessment.finding(Rule::IllnessSignal).unwrap().outcome,
            RuleOutcome::Skipped {
                reason: SkipReason::MissingReading
            }
        );
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let mut samples = with_hrv(window(10), 40.0, 33.0);
        samples.reverse();

        let assessment = ReadinessClassifier::new().classify(&samples);
        assert!(assessment.has(AlertCode::HrvDrop));
    }

    #[test]
    fn test_level_ordering() {
        assert!(ReadinessLevel::Alert > ReadinessLevel::Caution);
        assert!(ReadinessLevel::Caution > ReadinessLevel::Ok);
        assert_eq!(
            serde_json::to_string(&AlertCode::LowSpo2).unwrap(),
            "\"LOW_SPO2\""
        );
        assert_eq!(serde_json::to_string(&ReadinessLevel::Ok).unwrap(), "\"OK\"");
    }
}
