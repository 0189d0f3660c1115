//! Energy balance estimation
//!
//! Basal need comes from the Mifflin-St Jeor equation using the male offset
//! (`+5`); there is no sex field on the profile. Logged exercise expenditure is
//! added on top of the sedentary need rather than folded into the multiplier.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::config::AthleteProfile;
use crate::error::Result;
use crate::models::DailySample;

const MIFFLIN_WEIGHT_FACTOR: f64 = 10.0;
const MIFFLIN_HEIGHT_FACTOR: f64 = 6.25;
const MIFFLIN_AGE_FACTOR: f64 = 5.0;
const MIFFLIN_MALE_OFFSET: f64 = 5.0;

/// Where the current body weight came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeightSource {
    /// Most recent positive weight in the window
    Logged { date: NaiveDate },
    /// No weight in the window; profile fallback used
    Fallback,
}

/// Whether any intake was found for the balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NutritionStatus {
    Logged { date: NaiveDate },
    NotLogged,
}

impl fmt::Display for NutritionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NutritionStatus::Logged { date } => write!(f, "nutrition logged on {}", date),
            NutritionStatus::NotLogged => write!(f, "no nutrition logged"),
        }
    }
}

/// Daily energy estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyBalance {
    /// Intake minus daily need; `None` when no intake was logged
    pub balance_kcal: Option<f64>,
    /// Basal metabolic rate (kcal/day)
    pub basal_rate: f64,
    /// `basal_rate * activity_multiplier + active_calories`
    pub daily_need: f64,
    /// Body weight used for the estimate (kg)
    pub current_weight: f64,
    pub weight_source: WeightSource,
    /// Intake used for the balance
    pub calories_consumed: Option<f64>,
    /// Exercise expenditure on the latest day (0 when not logged)
    pub active_calories: f64,
    pub nutrition: NutritionStatus,
}

/// Basal metabolic rate, Mifflin-St Jeor with the male offset
pub fn mifflin_st_jeor(weight_kg: f64, height_cm: f64, age_years: u32) -> f64 {
    MIFFLIN_WEIGHT_FACTOR * weight_kg + MIFFLIN_HEIGHT_FACTOR * height_cm
        - MIFFLIN_AGE_FACTOR * age_years as f64
        + MIFFLIN_MALE_OFFSET
}

/// Most recent positive weight, scanning back from the latest date
pub fn current_weight(samples: &[DailySample]) -> Option<(NaiveDate, f64)> {
    latest_positive(samples, |s| s.weight)
}

fn latest_positive(
    samples: &[DailySample],
    field: impl Fn(&DailySample) -> Option<f64>,
) -> Option<(NaiveDate, f64)> {
    samples
        .iter()
        .filter_map(|s| field(s).filter(|v| *v > 0.0).map(|v| (s.date, v)))
        .max_by_key(|(date, _)| *date)
}

/// Estimate the caloric balance for the latest day of the window
///
/// Fails only when the profile itself is invalid.
pub fn estimate_balance(
    samples: &[DailySample],
    profile: &AthleteProfile,
    reference_date: NaiveDate,
) -> Result<EnergyBalance> {
    profile.validate()?;
    let age = profile.age_on(reference_date)?;

    let (current_weight, weight_source) = match current_weight(samples) {
        Some((date, weight)) => (weight, WeightSource::Logged { date }),
        None => {
            warn!(
                fallback_kg = profile.fallback_weight_kg,
                "no weight in window, using profile fallback"
            );
            (profile.fallback_weight_kg, WeightSource::Fallback)
        }
    };

    let basal_rate = mifflin_st_jeor(current_weight, profile.height_cm, age);

    let active_calories = samples
        .iter()
        .max_by_key(|s| s.date)
        .and_then(|s| s.calories_active_burn)
        .filter(|v| *v > 0.0)
        .unwrap_or(0.0);
    let daily_need = basal_rate * profile.activity_multiplier + active_calories;

    let (balance_kcal, calories_consumed, nutrition) =
        match latest_positive(samples, |s| s.calories_consumed) {
            Some((date, consumed)) => (
                Some(consumed - daily_need),
                Some(consumed),
                NutritionStatus::Logged { date },
            ),
            None => (None, None, NutritionStatus::NotLogged),
        };

    debug!(
        basal_rate,
        daily_need,
        balance = ?balance_kcal,
        "energy balance estimated"
    );

    Ok(EnergyBalance {
        balance_kcal,
        basal_rate,
        daily_need,
        current_weight,
        weight_source,
        calories_consumed,
        active_calories,
        nutrition,
    })
}
