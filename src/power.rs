//! Power profile extraction from competing power-curve candidates
//!
//! The training log returns several mean-maximal power curves (rolling
//! windows, season bests, all-time) of very uneven quality. This module picks
//! the most trustworthy one and summarizes it at four canonical durations:
//!
//! | Marker  | Seconds | Meaning                      |
//! |---------|---------|------------------------------|
//! | Sprint  | 15      | neuromuscular power          |
//! | 1 min   | 60      | anaerobic capacity           |
//! | 5 min   | 300     | VO2max power                 |
//! | 20 min  | 1200    | threshold proxy (FTP ≈ 95%)  |
//!
//! A marker that cannot be resolved is `None`. Zero watts is a real recorded
//! value and is never used to mean "unknown".

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use tracing::{debug, warn};

use crate::models::{PowerCurveCandidate, PowerPoint};

pub const SPRINT_SECONDS: u32 = 15;
pub const ONE_MINUTE_SECONDS: u32 = 60;
pub const FIVE_MINUTE_SECONDS: u32 = 300;
pub const TWENTY_MINUTE_SECONDS: u32 = 1200;

/// The four canonical duration markers, shortest first
pub const CANONICAL_DURATIONS: [u32; 4] = [
    SPRINT_SECONDS,
    ONE_MINUTE_SECONDS,
    FIVE_MINUTE_SECONDS,
    TWENTY_MINUTE_SECONDS,
];

/// FTP estimate as a fraction of 20-minute power
pub const FTP_FROM_TWENTY_MINUTE: f64 = 0.95;

/// Power extraction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerConfig {
    /// Shortest window (days) an identifier may name to count as "current"
    pub rolling_min_days: u32,

    /// Longest window (days) an identifier may name to count as "current"
    pub rolling_max_days: u32,

    /// Max distance from a marker, as a fraction of the marker duration
    ///
    /// `None` resolves every marker to the nearest point on the curve.
    pub marker_tolerance: Option<f64>,
}

impl Default for PowerConfig {
    fn default() -> Self {
        PowerConfig {
            rolling_min_days: 42,
            rolling_max_days: 90,
            marker_tolerance: None,
        }
    }
}

/// Why a candidate was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionReason {
    /// Tagged as the current rolling window and has 20-minute power
    RollingWindow,
    /// Highest 15-second power among candidates with 20-minute power
    HighestSprint,
    /// First candidate with any 20-minute power
    FirstWithThreshold,
}

impl fmt::Display for SelectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionReason::RollingWindow => write!(f, "current rolling window"),
            SelectionReason::HighestSprint => write!(f, "highest sprint power"),
            SelectionReason::FirstWithThreshold => write!(f, "first curve with 20-minute power"),
        }
    }
}

/// Best-effort power summary at the canonical durations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerProfile {
    /// Identifier of the selected candidate
    pub source: Option<String>,
    pub selection: Option<SelectionReason>,
    pub sprint_15s: Option<f64>,
    pub one_minute: Option<f64>,
    pub five_minute: Option<f64>,
    pub twenty_minute: Option<f64>,
    /// 95% of 20-minute power
    pub estimated_ftp: Option<f64>,
}

impl PowerProfile {
    /// Profile reported when no candidate is usable
    pub fn unknown() -> Self {
        PowerProfile {
            source: None,
            selection: None,
            sprint_15s: None,
            one_minute: None,
            five_minute: None,
            twenty_minute: None,
            estimated_ftp: None,
        }
    }

    /// True when a candidate was selected
    pub fn is_known(&self) -> bool {
        self.source.is_some()
    }

    /// Wattage at one of the canonical durations
    pub fn watts_at(&self, duration_seconds: u32) -> Option<f64> {
        match duration_seconds {
            SPRINT_SECONDS => self.sprint_15s,
            ONE_MINUTE_SECONDS => self.one_minute,
            FIVE_MINUTE_SECONDS => self.five_minute,
            TWENTY_MINUTE_SECONDS => self.twenty_minute,
            _ => None,
        }
    }

    /// `(seconds, watts)` for each canonical marker
    pub fn markers(&self) -> [(u32, Option<f64>); 4] {
        CANONICAL_DURATIONS.map(|d| (d, self.watts_at(d)))
    }

    /// `(seconds, W/kg)` for each canonical marker
    pub fn watts_per_kg(&self, weight_kg: f64) -> [(u32, Option<f64>); 4] {
        CANONICAL_DURATIONS.map(|d| {
            let relative = if weight_kg > 0.0 {
                self.watts_at(d).map(|w| w / weight_kg)
            } else {
                None
            };
            (d, relative)
        })
    }
}

/// Selects and summarizes the best power-curve candidate
#[derive(Debug, Clone, Default)]
pub struct PowerProfileExtractor {
    config: PowerConfig,
}

impl PowerProfileExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PowerConfig) -> Self {
        PowerProfileExtractor { config }
    }

    /// Select the best usable candidate and resolve the canonical markers
    ///
    /// Preference order:
    /// 1. a candidate tagged as the current rolling window with 20-minute power
    /// 2. highest 15-second power among candidates with 20-minute power
    /// 3. first candidate with 20-minute power
    /// 4. unknown profile
    pub fn extract(&self, candidates: &[PowerCurveCandidate]) -> PowerProfile {
        let usable: Vec<&PowerCurveCandidate> = candidates
            .iter()
            .filter(|c| {
                let keep = !c.is_empty() && self.is_usable(c);
                if !keep {
                    debug!(id = %c.id, points = c.points.len(), "discarding power curve candidate");
                }
                keep
            })
            .collect();

        let with_threshold: Vec<&PowerCurveCandidate> = usable
            .iter()
            .copied()
            .filter(|c| self.has_positive(c, TWENTY_MINUTE_SECONDS))
            .collect();

        let selected = with_threshold
            .iter()
            .find(|c| self.is_rolling_window(&c.id))
            .map(|c| (*c, SelectionReason::RollingWindow))
            .or_else(|| {
                self.highest_sprint(&with_threshold)
                    .map(|c| (c, SelectionReason::HighestSprint))
            })
            .or_else(|| {
                with_threshold
                    .first()
                    .map(|c| (*c, SelectionReason::FirstWithThreshold))
            });

        let Some((candidate, reason)) = selected else {
            warn!(candidates = candidates.len(), "no usable power data");
            return PowerProfile::unknown();
        };

        debug!(id = %candidate.id, reason = %reason, "selected power curve");

        let twenty_minute = self.lookup(candidate, TWENTY_MINUTE_SECONDS);
        PowerProfile {
            source: Some(candidate.id.clone()),
            selection: Some(reason),
            sprint_15s: self.lookup(candidate, SPRINT_SECONDS),
            one_minute: self.lookup(candidate, ONE_MINUTE_SECONDS),
            five_minute: self.lookup(candidate, FIVE_MINUTE_SECONDS),
            twenty_minute,
            estimated_ftp: twenty_minute.map(|w| w * FTP_FROM_TWENTY_MINUTE),
        }
    }

    /// Power at the point nearest to `duration_seconds`
    ///
    /// `None` only for a curve without points, or when a configured marker
    /// tolerance excludes every point. Ties go to the smaller duration
    /// difference, then the smaller duration; duplicate durations resolve to
    /// the highest wattage.
    pub fn lookup(&self, candidate: &PowerCurveCandidate, duration_seconds: u32) -> Option<f64> {
        let target = duration_seconds as f64;
        let max_distance = self.config.marker_tolerance.map(|t| target * t);

        candidate
            .points
            .iter()
            .filter(|p| {
                max_distance.map_or(true, |d| (p.duration_seconds as f64 - target).abs() <= d)
            })
            .min_by(|a, b| Self::closeness(a, b, duration_seconds))
            .map(|p| p.watts)
    }

    fn closeness(a: &PowerPoint, b: &PowerPoint, target: u32) -> Ordering {
        a.duration_seconds
            .abs_diff(target)
            .cmp(&b.duration_seconds.abs_diff(target))
            .then(a.duration_seconds.cmp(&b.duration_seconds))
            .then(b.watts.total_cmp(&a.watts))
    }

    /// At least one positive point near a canonical marker
    pub fn is_usable(&self, candidate: &PowerCurveCandidate) -> bool {
        CANONICAL_DURATIONS
            .iter()
            .any(|&d| self.has_positive(candidate, d))
    }

    fn has_positive(&self, candidate: &PowerCurveCandidate, duration_seconds: u32) -> bool {
        self.lookup(candidate, duration_seconds)
            .is_some_and(|w| w > 0.0)
    }

    fn highest_sprint<'a>(
        &self,
        candidates: &[&'a PowerCurveCandidate],
    ) -> Option<&'a PowerCurveCandidate> {
        let mut best: Option<(&PowerCurveCandidate, f64)> = None;
        for &candidate in candidates {
            let Some(sprint) = self.lookup(candidate, SPRINT_SECONDS).filter(|w| *w > 0.0) else {
                continue;
            };
            if best.map_or(true, |(_, top)| sprint > top) {
                best = Some((candidate, sprint));
            }
        }
        best.map(|(c, _)| c)
    }

    /// Whether the identifier names a rolling window of 42-90 days
    ///
    /// Recognizes a trailing `<N>d` token, e.g. `42d`, `r.84d`, `last_90d`.
    pub fn is_rolling_window(&self, id: &str) -> bool {
        let id = id.trim().to_ascii_lowercase();
        let token = id
            .rsplit(|c: char| !c.is_ascii_alphanumeric())
            .next()
            .unwrap_or("");
        token
            .strip_suffix('d')
            .and_then(|days| days.parse::<u32>().ok())
            .is_some_and(|days| {
                (self.config.rolling_min_days..=self.config.rolling_max_days).contains(&days)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_curve(id: &str, sprint: f64, threshold: f64) -> PowerCurveCandidate {
        PowerCurveCandidate::from_pairs(
            id,
            &[(15, sprint), (60, 520.0), (300, 340.0), (1200, threshold)],
        )
    }

    #[test]
    fn test_nearest_lookup_tie_break() {
        let extractor = PowerProfileExtractor::new();
        let curve = PowerCurveCandidate::from_pairs("c", &[(14, 700.0), (16, 690.0), (55, 500.0)]);

        // 14 and 16 are equidistant from 15: smaller duration wins
        assert_eq!(extractor.lookup(&curve, 15), Some(700.0));
        assert_eq!(extractor.lookup(&curve, 60), Some(500.0));
        assert_eq!(extractor.lookup(&curve, 1200), Some(500.0));
        assert_eq!(extractor.lookup(&PowerCurveCandidate::new("e", Vec::new()), 15), None);
    }

    #[test]
    fn test_marker_tolerance_is_opt_in() {
        let curve = PowerCurveCandidate::from_pairs("season", &[(10, 900.0), (600, 300.0)]);

        let profile = PowerProfileExtractor::new().extract(std::slice::from_ref(&curve));
        assert_eq!(profile.source.as_deref(), Some("season"));
        assert_eq!(profile.sprint_15s, Some(900.0));
        assert_eq!(profile.five_minute, Some(300.0));
        assert_eq!(profile.twenty_minute, Some(300.0));

        let strict = PowerProfileExtractor::with_config(PowerConfig {
            marker_tolerance: Some(0.25),
            ..PowerConfig::default()
        });
        assert_eq!(strict.lookup(&curve, 15), Some(900.0));
        assert_eq!(strict.lookup(&curve, 1200), None);
        assert_eq!(strict.extract(&[curve]), PowerProfile::unknown());
    }

    #[test]
    fn test_duplicate_durations_take_highest() {
        let extractor = PowerProfileExtractor::new();
        let curve = PowerCurveCandidate::from_pairs("c", &[(60, 480.0), (60, 510.0)]);
        assert_eq!(extractor.lookup(&curve, 60), Some(510.0));
    }

    #[test]
    fn test_zero_watts_distinct_from_unknown() {
        let extractor = PowerProfileExtractor::new();
        let curve = PowerCurveCandidate::from_pairs("c", &[(15, 0.0)]);
        assert_eq!(extractor.lookup(&curve, 15), Some(0.0));
        assert_eq!(extractor.lookup(&curve, 1200), Some(0.0));
        assert!(!extractor.is_usable(&curve));

        let profile = extractor.extract(&[curve]);
        assert_eq!(profile.twenty_minute, None);
    }

    #[test]
    fn test_prefers_rolling_window() {
        let extractor = PowerProfileExtractor::new();
        let candidates = vec![
            full_curve("all", 1100.0, 280.0),
            full_curve("r.42d", 850.0, 255.0),
        ];

        let profile = extractor.extract(&candidates);
        assert_eq!(profile.source.as_deref(), Some("r.42d"));
        assert_eq!(profile.selection, Some(SelectionReason::RollingWindow));
        assert_eq!(profile.twenty_minute, Some(255.0));
    }

    #[test]
    fn test_rolling_window_without_threshold_is_skipped() {
        let extractor = PowerProfileExtractor::new();
        let candidates = vec![
            PowerCurveCandidate::from_pairs("42d", &[(15, 900.0), (1200, 0.0)]),
            full_curve("season", 800.0, 240.0),
            full_curve("all", 950.0, 260.0),
        ];

        let profile = extractor.extract(&candidates);
        assert_eq!(profile.source.as_deref(), Some("all"));
        assert_eq!(profile.selection, Some(SelectionReason::HighestSprint));
    }

    #[test]
    fn test_first_with_threshold_when_no_sprint() {
        let extractor = PowerProfileExtractor::new();
        let candidates = vec![
            PowerCurveCandidate::from_pairs("a", &[(15, 0.0), (300, 320.0), (1200, 250.0)]),
            PowerCurveCandidate::from_pairs("b", &[(15, 0.0), (1200, 260.0)]),
        ];

        let profile = extractor.extract(&candidates);
        assert_eq!(profile.source.as_deref(), Some("a"));
        assert_eq!(profile.selection, Some(SelectionReason::FirstWithThreshold));
        assert_eq!(profile.sprint_15s, Some(0.0));
        assert_eq!(profile.five_minute, Some(320.0));
    }

    #[test]
    fn test_no_power_data_is_unknown() {
        let extractor = PowerProfileExtractor::new();
        let candidates = vec![
            PowerCurveCandidate::new("empty", Vec::new()),
            PowerCurveCandidate::from_pairs("sprint-only", &[(15, 900.0), (1200, 0.0)]),
        ];

        let profile = extractor.extract(&candidates);
        assert_eq!(profile, PowerProfile::unknown());
        assert!(profile.markers().iter().all(|(_, w)| w.is_none()));
    }

    #[test]
    fn test_estimated_ftp_and_relative_power() {
        let extractor = PowerProfileExtractor::new();
        let profile = extractor.extract(&[full_curve("42d", 900.0, 300.0)]);

        assert!((profile.estimated_ftp.unwrap() - 285.0).abs() < 1e-9);
        let relative = profile.watts_per_kg(75.0);
        assert_eq!(relative[3].0, TWENTY_MINUTE_SECONDS);
        assert!((relative[3].1.unwrap() - 4.0).abs() < 1e-9);
        assert!(profile.watts_per_kg(0.0).iter().all(|(_, w)| w.is_none()));
    }

    #[test]
    fn test_rolling_window_tags() {
        let extractor = PowerProfileExtractor::new();
        assert!(extractor.is_rolling_window("42d"));
        assert!(extractor.is_rolling_window("r.84d"));
        assert!(extractor.is_rolling_window("last_90D"));
        assert!(!extractor.is_rolling_window("7d"));
        assert!(!extractor.is_rolling_window("365d"));
        assert!(!extractor.is_rolling_window("season"));
    }
}
