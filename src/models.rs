use chrono::NaiveDate;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One calendar day of athlete wellness and training-load state
///
/// Every reading is optional. Absence is the normal case for many fields and
/// is kept distinct from zero all the way through the analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySample {
    /// Calendar date, unique within a window
    pub date: NaiveDate,

    /// Resting heart rate in beats per minute
    pub resting_heart_rate: Option<f64>,

    /// Heart rate variability (RMSSD) in milliseconds
    pub hrv: Option<f64>,

    /// Blood oxygen saturation in percent
    pub blood_oxygen: Option<f64>,

    /// Sleep duration in hours
    pub sleep_hours: Option<f64>,

    /// Body mass in kilograms
    pub weight: Option<f64>,

    /// Logged food intake in kcal
    pub calories_consumed: Option<f64>,

    /// Active (exercise) expenditure in kcal
    pub calories_active_burn: Option<f64>,

    /// Chronic Training Load, as supplied by the training log
    pub chronic_training_load: Option<Decimal>,

    /// Acute Training Load, as supplied by the training log
    pub acute_training_load: Option<Decimal>,

    /// Training Stress Balance, as supplied by the training log
    pub training_stress_balance: Option<Decimal>,
}

impl DailySample {
    /// Create an empty sample for the given date
    pub fn new(date: NaiveDate) -> Self {
        DailySample {
            date,
            resting_heart_rate: None,
            hrv: None,
            blood_oxygen: None,
            sleep_hours: None,
            weight: None,
            calories_consumed: None,
            calories_active_burn: None,
            chronic_training_load: None,
            acute_training_load: None,
            training_stress_balance: None,
        }
    }

    /// Read a named metric as a float, `None` when absent
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::RestingHeartRate => self.resting_heart_rate,
            Metric::Hrv => self.hrv,
            Metric::BloodOxygen => self.blood_oxygen,
            Metric::SleepHours => self.sleep_hours,
            Metric::Weight => self.weight,
            Metric::CaloriesConsumed => self.calories_consumed,
            Metric::CaloriesActiveBurn => self.calories_active_burn,
            Metric::ChronicTrainingLoad => self.chronic_training_load.and_then(|v| v.to_f64()),
            Metric::AcuteTrainingLoad => self.acute_training_load.and_then(|v| v.to_f64()),
            Metric::TrainingStressBalance => {
                self.training_stress_balance.and_then(|v| v.to_f64())
            }
        }
    }
}

/// Named numeric fields of a [`DailySample`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    RestingHeartRate,
    Hrv,
    BloodOxygen,
    SleepHours,
    Weight,
    CaloriesConsumed,
    CaloriesActiveBurn,
    ChronicTrainingLoad,
    AcuteTrainingLoad,
    TrainingStressBalance,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::RestingHeartRate => "resting heart rate",
            Metric::Hrv => "HRV",
            Metric::BloodOxygen => "SpO2",
            Metric::SleepHours => "sleep",
            Metric::Weight => "weight",
            Metric::CaloriesConsumed => "calories consumed",
            Metric::CaloriesActiveBurn => "active calories",
            Metric::ChronicTrainingLoad => "CTL",
            Metric::AcuteTrainingLoad => "ATL",
            Metric::TrainingStressBalance => "TSB",
        };
        write!(f, "{}", name)
    }
}

/// Single point of a mean-maximal power curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerPoint {
    pub duration_seconds: u32,
    pub watts: f64,
}

/// Named duration-to-power curve as delivered by the training log
///
/// Candidates are frequently degenerate: empty, duplicated durations,
/// zero or negative watts. Points are kept sorted by duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerCurveCandidate {
    /// Source/category tag, e.g. `"42d"` or `"season"`
    pub id: String,

    /// Points ordered by duration
    pub points: Vec<PowerPoint>,
}

impl PowerCurveCandidate {
    /// Create a candidate, sorting points by duration
    pub fn new(id: impl Into<String>, mut points: Vec<PowerPoint>) -> Self {
        points.sort_by_key(|p| p.duration_seconds);
        PowerCurveCandidate {
            id: id.into(),
            points,
        }
    }

    /// Build a candidate from `(seconds, watts)` pairs
    pub fn from_pairs(id: impl Into<String>, pairs: &[(u32, f64)]) -> Self {
        let points = pairs
            .iter()
            .map(|&(duration_seconds, watts)| PowerPoint {
                duration_seconds,
                watts,
            })
            .collect();
        Self::new(id, points)
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_metric_lookup() {
        let mut sample = DailySample::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        sample.hrv = Some(42.0);
        sample.acute_training_load = Some(dec!(55.5));

        assert_eq!(sample.metric(Metric::Hrv), Some(42.0));
        assert_eq!(sample.metric(Metric::AcuteTrainingLoad), Some(55.5));
        assert_eq!(sample.metric(Metric::Weight), None);
    }

    #[test]
    fn test_candidate_points_sorted() {
        let candidate = PowerCurveCandidate::from_pairs("42d", &[(1200, 250.0), (15, 800.0), (60, 500.0)]);
        let durations: Vec<u32> = candidate.points.iter().map(|p| p.duration_seconds).collect();
        assert_eq!(durations, vec![15, 60, 1200]);
        assert!(!candidate.is_empty());
    }

    #[test]
    fn test_metric_display() {
        assert_eq!(Metric::Hrv.to_string(), "HRV");
        assert_eq!(Metric::BloodOxygen.to_string(), "SpO2");
    }
}
