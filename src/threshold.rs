//! Distance threshold ranges and dataset profiles.

use crate::error::{LocEvalError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Percent-of-image step between consecutive percent thresholds.
pub const PERCENT_STEP: f64 = 0.5;

/// Upper bound (exclusive) of the percent range, relative to the longer side.
pub const PERCENT_STOP: f64 = 3.1;

/// Element `index` of an arithmetic range.
fn range_value(start: f64, step: f64, index: usize) -> f64 {
    start + index as f64 * step
}

/// Generate a half-open arithmetic range of thresholds.
///
/// The range holds `ceil((stop - start) / step)` values `start + i * step`.
///
/// # Errors
///
/// Returns an error if `step` is not a positive finite number or the bounds
/// are not finite.
///
/// # Example
///
/// ```
/// use locmap_eval::threshold::threshold_range;
///
/// let thresholds = threshold_range(1.0, 26.0, 1.0).unwrap();
/// assert_eq!(thresholds.len(), 25);
/// assert_eq!(thresholds[0], 1.0);
/// assert_eq!(thresholds[24], 25.0);
/// ```
pub fn threshold_range(start: f64, stop: f64, step: f64) -> Result<Vec<f64>> {
    if !start.is_finite() || !stop.is_finite() {
        return Err(LocEvalError::InvalidThreshold(format!(
            "Range bounds must be finite, got {}..{}",
            start, stop
        )));
    }
    if !(step.is_finite() && step > 0.0) {
        return Err(LocEvalError::InvalidThreshold(format!(
            "Range step must be positive, got {}",
            step
        )));
    }

    let len = ((stop - start) / step).ceil().max(0.0) as usize;
    Ok((0..len).map(|i| range_value(start, step, i)).collect())
}

/// Check thresholds and collapse duplicates, keeping first occurrences.
///
/// # Errors
///
/// Returns an error if the list is empty or any threshold is not a positive
/// finite number.
pub fn validate_thresholds(thresholds: &[f64]) -> Result<Vec<f64>> {
    if thresholds.is_empty() {
        return Err(LocEvalError::InvalidThreshold(
            "At least one threshold is required".to_string(),
        ));
    }

    let mut distinct: Vec<f64> = Vec::with_capacity(thresholds.len());
    for &threshold in thresholds {
        if !(threshold.is_finite() && threshold > 0.0) {
            return Err(LocEvalError::InvalidThreshold(format!(
                "Threshold must be positive and finite, got {}",
                threshold
            )));
        }
        if distinct.iter().any(|&t| t == threshold) {
            tracing::warn!(threshold, "duplicate threshold collapsed");
            continue;
        }
        distinct.push(threshold);
    }

    Ok(distinct)
}

/// Image geometry of a dataset, used to derive percent thresholds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetProfile {
    /// DroneCrowd, 1920x1080 frames.
    #[default]
    DroneCrowd,
    /// UP-COUNT, 3840x2160 frames.
    UpCount,
    Custom { width: u32, height: u32 },
}

impl DatasetProfile {
    /// Frame size as `(width, height)`.
    pub fn image_size(&self) -> (u32, u32) {
        match *self {
            DatasetProfile::DroneCrowd => (1920, 1080),
            DatasetProfile::UpCount => (3840, 2160),
            DatasetProfile::Custom { width, height } => (width, height),
        }
    }

    fn min_side(&self) -> f64 {
        let (w, h) = self.image_size();
        f64::from(w.min(h))
    }

    fn max_side(&self) -> f64 {
        let (w, h) = self.image_size();
        f64::from(w.max(h))
    }

    /// Distance of one percent step: 0.5% of the shorter side.
    pub fn percent_step(&self) -> f64 {
        self.min_side() * PERCENT_STEP / 100.0
    }

    /// Thresholds from 0.5% of the shorter side up to 3.1% of the longer side.
    ///
    /// # Errors
    ///
    /// Returns an error for a profile with a zero-sized side.
    pub fn percent_thresholds(&self) -> Result<Vec<f64>> {
        let step = self.percent_step();
        threshold_range(step, self.max_side() * PERCENT_STOP / 100.0, step)
    }

    /// The element of [`percent_thresholds`](Self::percent_thresholds) for
    /// `percent` of the shorter side, computed identically so that it can be
    /// looked up as an exact key.
    ///
    /// `percent` is expected to be a whole number of [`PERCENT_STEP`]s;
    /// [`EvalParams::validate`](crate::params::EvalParams::validate) rejects
    /// anything else.
    pub fn percent_threshold(&self, percent: f64) -> f64 {
        let step = self.percent_step();
        let steps = (percent / PERCENT_STEP).round().max(1.0) as usize;
        range_value(step, step, steps - 1)
    }
}

impl fmt::Display for DatasetProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetProfile::DroneCrowd => write!(f, "dronecrowd"),
            DatasetProfile::UpCount => write!(f, "upcount"),
            DatasetProfile::Custom { width, height } => write!(f, "{}x{}", width, height),
        }
    }
}

impl FromStr for DatasetProfile {
    type Err = LocEvalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dronecrowd" => Ok(DatasetProfile::DroneCrowd),
            "upcount" => Ok(DatasetProfile::UpCount),
            other => {
                let parsed: Option<(u32, u32)> = other
                    .split_once('x')
                    .and_then(|(w, h)| Some((w.parse().ok()?, h.parse().ok()?)));
                match parsed {
                    Some((width, height)) if width > 0 && height > 0 => {
                        Ok(DatasetProfile::Custom { width, height })
                    }
                    _ => Err(LocEvalError::InvalidConfig(format!(
                        "Unknown dataset profile '{}'",
                        s
                    ))),
                }
            }
        }
    }
}
