//! Main evaluation orchestrator for point-localization mAP.

use crate::accumulator::accumulate;
use crate::error::{LocEvalError, Result};
use crate::metrics::ap::integrate;
use crate::params::EvalParams;
use crate::results::MapResults;
use crate::scheduler::ThresholdScheduler;
use crate::types::{SequenceTable, ThresholdReport};
use std::fmt;

/// Evaluate a single distance threshold.
///
/// Matches every frame of every sequence, ranks all detections and integrates
/// the precision-recall curve.
///
/// # Arguments
///
/// * `ground_truth` - Ground-truth sequence table
/// * `detections` - Detection sequence table
/// * `threshold` - Maximum center-to-center distance of a match
///
/// # Returns
///
/// Returns a `ThresholdReport` with AP in percent.
///
/// # Errors
///
/// Returns an error if `threshold` is not a positive finite number.
pub fn evaluate_threshold(
    ground_truth: &SequenceTable,
    detections: &SequenceTable,
    threshold: f64,
) -> Result<ThresholdReport> {
    if !(threshold.is_finite() && threshold > 0.0) {
        return Err(LocEvalError::InvalidThreshold(format!(
            "Threshold must be positive and finite, got {}",
            threshold
        )));
    }

    let ledger = accumulate(ground_truth, detections, threshold);
    let report = ThresholdReport {
        threshold,
        ..integrate(&ledger)
    };

    tracing::debug!(
        threshold,
        ap = report.ap,
        tp = report.true_positives,
        fp = report.false_positives,
        "threshold scored"
    );

    Ok(report)
}

/// One named summary statistic.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryEntry {
    pub label: String,
    pub value: f64,
}

/// Named AP statistics over pixel and percent thresholds.
#[derive(Debug, Clone)]
pub struct Summary {
    pub entries: Vec<SummaryEntry>,
    pub pixel: MapResults,
    pub percent: MapResults,
}

impl Summary {
    /// Value of the entry with the given label.
    pub fn value(&self, label: &str) -> Option<f64> {
        self.entries.iter().find(|e| e.label == label).map(|e| e.value)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "Average Precision@{}\t = \t {:.4}", entry.label, entry.value)?;
        }
        Ok(())
    }
}

fn format_threshold(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Evaluate the full protocol: the pixel range and the profile's percent range.
///
/// Produces `1:25`-style range averages and the individual pixel and percent
/// points configured in `params`.
///
/// # Errors
///
/// Returns an error for invalid parameters or a failed threshold.
pub fn summarize(ground_truth: &SequenceTable, detections: &SequenceTable, params: &EvalParams) -> Result<Summary> {
    params.validate()?;

    let scheduler = ThresholdScheduler::new(params.workers)?;
    let pixel_thresholds = params.pixel_thresholds()?;
    let percent_thresholds = params.percent_thresholds()?;

    let pixel = scheduler.run(ground_truth, detections, &pixel_thresholds)?;
    let percent = scheduler.run(ground_truth, detections, &percent_thresholds)?;

    let mut entries = Vec::new();

    if let (Some(&first), Some(&last)) = (pixel_thresholds.first(), pixel_thresholds.last()) {
        entries.push(SummaryEntry {
            label: format!("{}:{}", format_threshold(first), format_threshold(last)),
            value: pixel.get(&pixel_thresholds)?,
        });
    }
    for &point in &params.pixel_points {
        entries.push(SummaryEntry {
            label: format_threshold(point),
            value: pixel.get(&[point])?,
        });
    }

    entries.push(SummaryEntry {
        label: "0.5-3.0%".to_string(),
        value: percent.get(&percent_thresholds)?,
    });
    for &point in &params.percent_points {
        entries.push(SummaryEntry {
            label: format!("{:.1}%", point),
            value: percent.get(&[params.profile.percent_threshold(point)])?,
        });
    }

    Ok(Summary {
        entries,
        pixel,
        percent,
    })
}
