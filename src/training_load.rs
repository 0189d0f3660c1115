use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::DailySample;

/// Training Stress Balance interpretation ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormInterpretation {
    VeryFresh,    // +25 and above
    Fresh,        // +5 to +25
    Neutral,      // -10 to +5
    Fatigued,     // -30 to -10
    VeryFatigued, // Below -30
}

impl FormInterpretation {
    /// Get TSB interpretation from numeric value
    pub fn from_tsb(tsb: Decimal) -> Self {
        if tsb >= Decimal::from(25) {
            FormInterpretation::VeryFresh
        } else if tsb >= Decimal::from(5) {
            FormInterpretation::Fresh
        } else if tsb >= Decimal::from(-10) {
            FormInterpretation::Neutral
        } else if tsb >= Decimal::from(-30) {
            FormInterpretation::Fatigued
        } else {
            FormInterpretation::VeryFatigued
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FormInterpretation::VeryFresh => "Very fresh (may be losing fitness)",
            FormInterpretation::Fresh => "Fresh and ready for hard training/racing",
            FormInterpretation::Neutral => "Neutral (normal training)",
            FormInterpretation::Fatigued => "Fatigued (monitor closely)",
            FormInterpretation::VeryFatigued => "Very fatigued (rest needed)",
        }
    }
}

impl fmt::Display for FormInterpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Latest training-load state as reported by the training log
///
/// Informational only; it does not feed the readiness verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingLoadSummary {
    pub ctl: Option<Decimal>,
    pub atl: Option<Decimal>,
    pub tsb: Option<Decimal>,
    pub form: Option<FormInterpretation>,
}

impl TrainingLoadSummary {
    /// Summarize the latest sample of an ascending window
    pub fn from_window(samples: &[DailySample]) -> Self {
        let latest = samples.iter().max_by_key(|s| s.date);
        let tsb = latest.and_then(|s| s.training_stress_balance);

        TrainingLoadSummary {
            ctl: latest.and_then(|s| s.chronic_training_load),
            atl: latest.and_then(|s| s.acute_training_load),
            tsb,
            form: tsb.map(FormInterpretation::from_tsb),
        }
    }
}
