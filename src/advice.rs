//! Payload handed to the external advice generator
//!
//! This is the contract boundary: the analyzer's report plus caller-supplied
//! context (weather), flattened into something a prompt builder or message
//! formatter can consume without knowing the analysis internals.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::power::CANONICAL_DURATIONS;
use crate::readiness::{AlertCode, ReadinessLevel};
use crate::report::AnalysisReport;

/// Local weather at analysis time, fetched by the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature_c: Option<f64>,
    pub precipitation_mm: Option<f64>,
    pub wind_kph: Option<f64>,
    pub description: Option<String>,
}

/// Alert code with its explanation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertNote {
    pub code: AlertCode,
    pub description: String,
}

/// Everything the advice generator needs, in one serializable value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvicePayload {
    /// One-line training guidance derived from the verdict
    pub headline: String,
    pub alerts: Vec<AlertNote>,
    /// Caveats the advice generator should respect
    pub notes: Vec<String>,
    pub weather: Option<WeatherSnapshot>,
    pub report: AnalysisReport,
}

impl AdvicePayload {
    /// Package a report for the advice generator
    pub fn assemble(report: AnalysisReport, weather: Option<WeatherSnapshot>) -> Self {
        let headline = match report.verdict {
            ReadinessLevel::Ok => "Ready to train as planned",
            ReadinessLevel::Caution => "Train, but keep intensity moderate",
            ReadinessLevel::Alert => "Prioritize recovery today",
        }
        .to_string();

        let alerts = report
            .alerts
            .iter()
            .map(|code| AlertNote {
                code: *code,
                description: code.description().to_string(),
            })
            .collect();

        let mut notes = Vec::new();
        if report.has_alert(AlertCode::WaterRetention) {
            notes.push("Weight jump is likely water; do not adjust the diet for it".to_string());
        }
        if report.energy.balance_kcal.is_none() {
            notes.push(format!("Energy balance unavailable: {}", report.energy.nutrition));
        }
        if !report.power.is_known() {
            notes.push("No usable power data; power profile unknown".to_string());
        }

        AdvicePayload {
            headline,
            alerts,
            notes,
            weather,
            report,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Plain-text rendering, one fact per line
    pub fn summary_lines(&self) -> Vec<String> {
        let report = &self.report;
        let mut lines = vec![format!("Readiness: {} - {}", report.verdict, self.headline)];

        for alert in &self.alerts {
            lines.push(format!("Alert {}: {}", alert.code, alert.description));
        }

        let hrv = &report.baselines.hrv;
        if let (Some(base), Some(change)) = (hrv.value, report.baselines.hrv_change_ratio) {
            lines.push(format!(
                "HRV: {:+.1}% vs baseline {:.1} ms ({} days)",
                change * 100.0,
                base,
                hrv.samples_used
            ));
        }
        let rhr = &report.baselines.resting_heart_rate;
        if let (Some(base), Some(change)) = (rhr.value, report.baselines.rhr_change) {
            lines.push(format!(
                "Resting HR: {:+.1} bpm vs baseline {:.1} ({} days)",
                change, base, rhr.samples_used
            ));
        }

        let markers: Vec<String> = CANONICAL_DURATIONS
            .iter()
            .map(|&d| {
                let watts = report
                    .power
                    .watts_at(d)
                    .map(|w| format!("{:.0} W", w))
                    .unwrap_or_else(|| "unknown".to_string());
                format!("{}s {}", d, watts)
            })
            .collect();
        lines.push(format!("Power: {}", markers.join(", ")));

        match report.energy.balance_kcal {
            Some(balance) => lines.push(format!(
                "Energy balance: {:+.0} kcal (need {:.0} kcal)",
                balance, report.energy.daily_need
            )),
            None => lines.push(format!("Energy balance: {}", report.energy.nutrition)),
        }

        if let Some(form) = report.training_load.form {
            lines.push(format!("Form: {}", form));
        }

        if let Some(weather) = &self.weather {
            let mut parts = Vec::new();
            if let Some(description) = &weather.description {
                parts.push(description.clone());
            }
            if let Some(t) = weather.temperature_c {
                parts.push(format!("{:.0}°C", t));
            }
            if let Some(wind) = weather.wind_kph {
                parts.push(format!("wind {:.0} km/h", wind));
            }
            if let Some(rain) = weather.precipitation_mm {
                parts.push(format!("rain {:.1} mm", rain));
            }
            if !parts.is_empty() {
                lines.push(format!("Weather: {}", parts.join(", ")));
            }
        }

        for note in &self.notes {
            lines.push(format!("Note: {}", note));
        }

        lines
    }
}
