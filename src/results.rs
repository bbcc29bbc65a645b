//! Threshold-to-AP result mapping and range-average queries.

use crate::error::{LocEvalError, Result};
use crate::types::ThresholdReport;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Exact-value map key for a threshold.
#[derive(Debug, Clone, Copy)]
struct ThresholdKey(f64);

impl PartialEq for ThresholdKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ThresholdKey {}

impl PartialOrd for ThresholdKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ThresholdKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Completed `threshold -> AP` mapping of one evaluation run.
///
/// Keys are the exact threshold values that were evaluated; lookups never
/// fall back to a nearby threshold.
#[derive(Debug, Clone, Default)]
pub struct MapResults {
    reports: BTreeMap<ThresholdKey, ThresholdReport>,
}

impl MapResults {
    /// Create an empty result mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mapping from per-threshold reports. A later report for the same
    /// threshold replaces an earlier one.
    pub fn from_reports<I: IntoIterator<Item = ThresholdReport>>(reports: I) -> Self {
        let mut results = Self::new();
        for report in reports {
            results.insert(report);
        }
        results
    }

    pub fn insert(&mut self, report: ThresholdReport) {
        self.reports.insert(ThresholdKey(report.threshold), report);
    }

    /// Mean AP over the given thresholds.
    ///
    /// # Errors
    ///
    /// Returns `EmptyQuery` for an empty list and `MissingThreshold` for the
    /// first threshold that is not an exact key.
    ///
    /// # Example
    ///
    /// ```
    /// use locmap_eval::results::MapResults;
    /// use locmap_eval::types::ThresholdReport;
    ///
    /// let report = |threshold, ap| ThresholdReport {
    ///     threshold, ap, ground_truth: 0, true_positives: 0,
    ///     false_positives: 0, ignored_detections: 0, precision: 0.0, recall: 0.0,
    /// };
    /// let results = MapResults::from_reports(vec![report(5.0, 40.0), report(10.0, 60.0)]);
    /// assert_eq!(results.get(&[5.0, 10.0]).unwrap(), 50.0);
    /// assert!(results.get(&[7.5]).is_err());
    /// ```
    pub fn get(&self, thresholds: &[f64]) -> Result<f64> {
        if thresholds.is_empty() {
            return Err(LocEvalError::EmptyQuery);
        }

        let mut sum = 0.0;
        for &threshold in thresholds {
            sum += self.ap(threshold).ok_or(LocEvalError::MissingThreshold(threshold))?;
        }

        Ok(sum / thresholds.len() as f64)
    }

    /// Raw AP at one threshold.
    pub fn ap(&self, threshold: f64) -> Option<f64> {
        self.report(threshold).map(|r| r.ap)
    }

    pub fn report(&self, threshold: f64) -> Option<&ThresholdReport> {
        self.reports.get(&ThresholdKey(threshold))
    }

    /// Reports in ascending threshold order.
    pub fn reports(&self) -> impl Iterator<Item = &ThresholdReport> {
        self.reports.values()
    }

    /// Evaluated thresholds in ascending order.
    pub fn thresholds(&self) -> Vec<f64> {
        self.reports.keys().map(|k| k.0).collect()
    }

    pub fn contains(&self, threshold: f64) -> bool {
        self.reports.contains_key(&ThresholdKey(threshold))
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Serialize the reports, ascending by threshold, as a JSON array.
    pub fn to_json(&self) -> Result<String> {
        let reports: Vec<&ThresholdReport> = self.reports().collect();
        Ok(serde_json::to_string_pretty(&reports)?)
    }
}
