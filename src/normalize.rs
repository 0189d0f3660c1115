//! Boundary parsing of raw training-log exports
//!
//! Wellness days and power curves arrive as loosely-typed JSON. Everything is
//! validated here, once, so the analysis modules only ever see [`DailySample`]
//! and [`PowerCurveCandidate`] values.
//!
//! Policies:
//! - a record without a parseable date is dropped
//! - a numeric field that is missing, null, non-numeric or non-finite is absent
//! - duplicate dates resolve last-seen-wins
//! - output is ascending by date

use chrono::NaiveDate;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{CoachError, Result};
use crate::models::{DailySample, PowerCurveCandidate, PowerPoint};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Counters describing what the normalizer did with its input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeSummary {
    /// Records supplied
    pub records_seen: usize,
    /// Records dropped for lack of a parseable date
    pub records_dropped: usize,
    /// Records that replaced an earlier record with the same date
    pub duplicates_replaced: usize,
}

/// Normalized, ascending, date-unique sample window
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedWindow {
    pub samples: Vec<DailySample>,
    pub summary: NormalizeSummary,
}

/// Read a JSON export from disk, for callers doing their own I/O
pub fn read_json_file(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(CoachError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Parse a wellness export (JSON array of day objects)
pub fn parse_wellness(payload: &Value) -> Result<NormalizedWindow> {
    let records = payload.as_array().ok_or_else(|| {
        CoachError::Validation("wellness payload must be a JSON array".to_string())
    })?;
    Ok(normalize_records(records))
}

/// Turn raw day records into an ordered, date-unique window
pub fn normalize_records(records: &[Value]) -> NormalizedWindow {
    let mut summary = NormalizeSummary {
        records_seen: records.len(),
        ..NormalizeSummary::default()
    };
    let mut by_date: BTreeMap<NaiveDate, DailySample> = BTreeMap::new();

    for (index, record) in records.iter().enumerate() {
        match parse_sample(record) {
            Some(sample) => {
                if by_date.insert(sample.date, sample).is_some() {
                    summary.duplicates_replaced += 1;
                }
            }
            None => {
                debug!(index, "dropping wellness record without a parseable date");
                summary.records_dropped += 1;
            }
        }
    }

    NormalizedWindow {
        samples: by_date.into_values().collect(),
        summary,
    }
}

/// Sort typed samples ascending and collapse duplicate dates (last wins)
pub fn sort_samples(samples: &[DailySample]) -> Vec<DailySample> {
    let mut by_date: BTreeMap<NaiveDate, DailySample> = BTreeMap::new();
    for sample in samples {
        by_date.insert(sample.date, sample.clone());
    }
    by_date.into_values().collect()
}

/// Parse one wellness record, `None` when it has no usable date
pub fn parse_sample(record: &Value) -> Option<DailySample> {
    let obj = record.as_object()?;
    let date = first_present(obj, &["id", "date"]).and_then(parse_date)?;

    let mut sample = DailySample::new(date);
    sample.resting_heart_rate = number_field(obj, &["restingHR", "restingHeartRate"]);
    sample.hrv = number_field(obj, &["hrv", "hrvRMSSD"]);
    sample.blood_oxygen = number_field(obj, &["spO2", "bloodOxygen"]);
    sample.sleep_hours = number_field(obj, &["sleepSecs"])
        .map(|secs| secs / SECONDS_PER_HOUR)
        .or_else(|| number_field(obj, &["sleepHours", "sleepDuration"]));
    sample.weight = number_field(obj, &["weight"]);
    sample.calories_consumed = number_field(obj, &["kcalConsumed", "caloriesConsumed"]);
    sample.calories_active_burn = number_field(obj, &["activeCalories", "caloriesActiveBurn"]);
    sample.chronic_training_load = decimal_field(obj, &["ctl", "chronicTrainingLoad"]);
    sample.acute_training_load = decimal_field(obj, &["atl", "acuteTrainingLoad"]);
    sample.training_stress_balance = decimal_field(obj, &["tsb", "form", "trainingStressBalance"]);

    Some(sample)
}

/// Parse a power-curve export into candidates
///
/// Accepted shapes:
/// - `{ "42d": [[15, 800], [60, 500]], ... }`
/// - `[{ "id": "42d", "points": [[15, 800], ...] }, ...]`
/// - `[{ "id": "42d", "secs": [15, 60], "watts": [800, 500] }, ...]`
pub fn parse_power_curves(payload: &Value) -> Result<Vec<PowerCurveCandidate>> {
    match payload {
        Value::Object(map) => Ok(map
            .iter()
            .map(|(id, pairs)| PowerCurveCandidate::new(id.clone(), parse_pairs(pairs)))
            .collect()),
        Value::Array(items) => Ok(items.iter().filter_map(parse_curve_object).collect()),
        _ => Err(CoachError::Validation(
            "power curve payload must be a JSON object or array".to_string(),
        )),
    }
}

fn parse_curve_object(item: &Value) -> Option<PowerCurveCandidate> {
    let obj = item.as_object()?;
    let id = match obj.get("id")? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    let points = if let Some(pairs) = obj.get("points") {
        parse_pairs(pairs)
    } else {
        match (obj.get("secs"), obj.get("watts")) {
            (Some(Value::Array(secs)), Some(Value::Array(watts))) => secs
                .iter()
                .zip(watts.iter())
                .filter_map(|(s, w)| parse_point(s, w))
                .collect(),
            _ => Vec::new(),
        }
    };

    Some(PowerCurveCandidate::new(id, points))
}

fn parse_pairs(value: &Value) -> Vec<PowerPoint> {
    let Some(pairs) = value.as_array() else {
        return Vec::new();
    };
    pairs
        .iter()
        .filter_map(|pair| match pair.as_array().map(Vec::as_slice) {
            Some([duration, watts, ..]) => parse_point(duration, watts),
            _ => None,
        })
        .collect()
}

fn parse_point(duration: &Value, watts: &Value) -> Option<PowerPoint> {
    let duration = parse_number(duration)?.round();
    if duration < 1.0 || duration > u32::MAX as f64 {
        return None;
    }
    Some(PowerPoint {
        duration_seconds: duration as u32,
        watts: parse_number(watts)?,
    })
}

/// Parse `YYYY-MM-DD`, tolerating a trailing time component
pub fn parse_date(value: &Value) -> Option<NaiveDate> {
    let text = value.as_str()?.trim();
    let day = text.get(..10)?;
    if text.len() > 10 && !matches!(text.as_bytes()[10], b'T' | b' ') {
        return None;
    }
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Parse a JSON number or numeric string; non-finite values are absent
pub fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn first_present<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find(|value| !value.is_null())
}

fn number_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    first_present(obj, keys).and_then(parse_number)
}

fn decimal_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<Decimal> {
    number_field(obj, keys).and_then(Decimal::from_f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn test_records_sorted_and_malformed_dropped() {
        let records = vec![
            json!({"id": "2024-05-03", "hrv": 41}),
            json!({"hrv": 50}),
            json!("not an object"),
            json!({"id": "yesterday", "hrv": 40}),
            json!({"id": "2024-05-01", "restingHR": 52}),
            json!({"date": "2024-05-02T00:00:00", "weight": 71.2}),
        ];

        let window = normalize_records(&records);
        let dates: Vec<NaiveDate> = window.samples.iter().map(|s| s.date).collect();

        assert_eq!(dates, vec![date(1), date(2), date(3)]);
        assert_eq!(window.summary.records_seen, 6);
        assert_eq!(window.summary.records_dropped, 3);
        assert_eq!(window.samples[1].weight, Some(71.2));
    }

    #[test]
    fn test_duplicate_dates_last_seen_wins() {
        let records = vec![
            json!({"id": "2024-05-01", "hrv": 40}),
            json!({"id": "2024-05-01", "hrv": 44}),
        ];

        let window = normalize_records(&records);
        assert_eq!(window.samples.len(), 1);
        assert_eq!(window.samples[0].hrv, Some(44.0));
        assert_eq!(window.summary.duplicates_replaced, 1);
    }

    #[test]
    fn test_missing_fields_are_absent_not_zero() {
        let record = json!({
            "id": "2024-05-01",
            "hrv": null,
            "restingHR": "abc",
            "spO2": "97.5",
            "sleepSecs": 27000,
            "ctl": 61.25,
            "atl": 70
        });

        let sample = parse_sample(&record).unwrap();
        assert_eq!(sample.hrv, None);
        assert_eq!(sample.resting_heart_rate, None);
        assert_eq!(sample.blood_oxygen, Some(97.5));
        assert_eq!(sample.sleep_hours, Some(7.5));
        assert_eq!(sample.weight, None);
        assert_eq!(sample.chronic_training_load, Some(dec!(61.25)));
        assert_eq!(sample.acute_training_load, Some(dec!(70)));
        assert_eq!(sample.training_stress_balance, None);
    }

    #[test]
    fn test_date_parsing() {
        assert_eq!(parse_date(&json!("2024-05-01")), Some(date(1)));
        assert_eq!(parse_date(&json!("2024-05-01 06:00")), Some(date(1)));
        assert_eq!(parse_date(&json!("2024-05-011")), None);
        assert_eq!(parse_date(&json!("2024-13-01")), None);
        assert_eq!(parse_date(&json!(20240501)), None);
    }

    #[test]
    fn test_wellness_payload_must_be_array() {
        assert!(parse_wellness(&json!({"id": "2024-05-01"})).is_err());
        assert!(parse_wellness(&json!([])).unwrap().samples.is_empty());
    }

    #[test]
    fn test_sort_samples_defensive() {
        let mut late = DailySample::new(date(9));
        late.hrv = Some(1.0);
        let mut dup = DailySample::new(date(9));
        dup.hrv = Some(2.0);
        let early = DailySample::new(date(2));

        let sorted = sort_samples(&[late, early, dup]);
        assert_eq!(sorted.len(), 2);
        assert_eq!(sorted[0].date, date(2));
        assert_eq!(sorted[1].hrv, Some(2.0));
    }

    #[test]
    fn test_power_curves_keyed_object() {
        let payload = json!({
            "42d": [[60, 480], [15, 820], ["bad"], [1200, 260]],
            "season": []
        });

        let candidates = parse_power_curves(&payload).unwrap();
        assert_eq!(candidates.len(), 2);

        let rolling = candidates.iter().find(|c| c.id == "42d").unwrap();
        assert_eq!(rolling.points.len(), 3);
        assert_eq!(rolling.points[0].duration_seconds, 15);
        assert!(candidates.iter().any(|c| c.id == "season" && c.is_empty()));
    }

    #[test]
    fn test_power_curves_array_shapes() {
        let payload = json!([
            {"id": "84d", "secs": [15, 300, 1200], "watts": [900, 330, null]},
            {"id": "all", "points": [[1200, 240]]},
            {"points": [[15, 700]]},
            42
        ]);

        let candidates = parse_power_curves(&payload).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].points.len(), 2);
        assert_eq!(candidates[1].points[0].watts, 240.0);
    }

    #[test]
    fn test_power_points_need_whole_second_duration() {
        let payload = json!({"c": [[0.4, 1500], [0, 1400], [-3, 900], [0.6, 1300], [14.7, 800]]});

        let candidates = parse_power_curves(&payload).unwrap();
        let durations: Vec<u32> = candidates[0]
            .points
            .iter()
            .map(|p| p.duration_seconds)
            .collect();
        assert_eq!(durations, vec![1, 15]);
    }

    #[test]
    fn test_read_json_file_errors() {
        let temp_dir = tempfile::tempdir().unwrap();

        let missing = temp_dir.path().join("wellness.json");
        assert!(matches!(
            read_json_file(&missing),
            Err(CoachError::FileNotFound { .. })
        ));

        let broken = temp_dir.path().join("broken.json");
        fs::write(&broken, "[{\"id\": ").unwrap();
        assert!(matches!(read_json_file(&broken), Err(CoachError::Json(_))));

        assert!(matches!(
            read_json_file(temp_dir.path()),
            Err(CoachError::Io(_))
        ));

        let good = temp_dir.path().join("curves.json");
        fs::write(&good, r#"{"42d": [[15, 900]]}"#).unwrap();
        assert_eq!(read_json_file(&good).unwrap(), json!({"42d": [[15, 900]]}));
    }

    #[test]
    fn test_power_curve_payload_shape_error() {
        assert!(parse_power_curves(&json!("curve")).is_err());
    }
}
