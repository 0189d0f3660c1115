//! Rolling baselines for "today vs. recent history" comparisons
//!
//! A baseline is the arithmetic mean of a metric over the window, leaving out
//! the most recent day by default so the latest reading is compared against
//! its own history rather than against itself.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::models::{DailySample, Metric};

/// Baseline calculation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineConfig {
    /// Minimum qualifying samples before a mean is reported
    pub min_samples: usize,

    /// Use only the most recent N qualifying samples (None = whole window)
    pub window: Option<usize>,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        BaselineConfig {
            min_samples: 2,
            window: None,
        }
    }
}

/// Baseline figure for a single metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub metric: Metric,

    /// Mean of the qualifying samples, `None` when there were too few
    pub value: Option<f64>,

    /// Number of samples the mean was computed from (0 when `value` is `None`)
    pub samples_used: usize,

    /// Sample standard deviation, when at least two samples were used
    pub std_dev: Option<f64>,
}

impl Baseline {
    fn empty(metric: Metric) -> Self {
        Baseline {
            metric,
            value: None,
            samples_used: 0,
            std_dev: None,
        }
    }

    /// Baseline value, only if it was computed from at least `min` samples
    pub fn value_with_at_least(&self, min: usize) -> Option<f64> {
        self.value.filter(|_| self.samples_used >= min)
    }
}

/// Computes baselines over a sample window
#[derive(Debug, Clone, Default)]
pub struct BaselineCalculator {
    config: BaselineConfig,
}

impl BaselineCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BaselineConfig) -> Self {
        BaselineCalculator { config }
    }

    /// Mean of `metric` over the window
    ///
    /// When `exclude_most_recent` is set, every sample carrying the greatest
    /// date is left out regardless of where it sits in the slice.
    pub fn compute(
        &self,
        samples: &[DailySample],
        metric: Metric,
        exclude_most_recent: bool,
    ) -> Baseline {
        let latest = samples.iter().map(|s| s.date).max();

        let mut dated: Vec<_> = samples
            .iter()
            .filter(|s| !(exclude_most_recent && Some(s.date) == latest))
            .filter_map(|s| s.metric(metric).map(|v| (s.date, v)))
            .collect();
        dated.sort_by_key(|(date, _)| *date);

        if let Some(window) = self.config.window {
            let skip = dated.len().saturating_sub(window);
            dated.drain(..skip);
        }

        let values: Vec<f64> = dated.into_iter().map(|(_, v)| v).collect();
        if values.is_empty() || values.len() < self.config.min_samples {
            return Baseline::empty(metric);
        }

        let mean = values.iter().mean();
        let std_dev = if values.len() >= 2 {
            Some(values.iter().std_dev())
        } else {
            None
        };

        Baseline {
            metric,
            value: Some(mean),
            samples_used: values.len(),
            std_dev,
        }
    }
}

/// Baseline with default settings
pub fn baseline(samples: &[DailySample], metric: Metric, exclude_most_recent: bool) -> Baseline {
    BaselineCalculator::new().compute(samples, metric, exclude_most_recent)
}
