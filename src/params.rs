//! Evaluation parameters and defaults.

use crate::error::{LocEvalError, Result};
use crate::scheduler::DEFAULT_WORKERS;
use crate::threshold::{threshold_range, DatasetProfile, PERCENT_STEP};
use serde::{Deserialize, Serialize};

/// Evaluation parameters: parallelism, dataset profile and the thresholds
/// behind each summary statistic.
///
/// Defaults follow the DroneCrowd protocol: pixel thresholds 1..=25 with
/// point statistics at 5, 10, 15 and 20 pixels, and percent statistics at
/// 1, 2 and 3 percent of the shorter image side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalParams {
    /// Worker threads used by the scheduler.
    pub workers: usize,
    /// Image geometry used for percent thresholds.
    pub profile: DatasetProfile,
    /// Pixel threshold range as `[start, stop, step]`, stop exclusive.
    pub pixel_range: [f64; 3],
    /// Pixel thresholds reported individually.
    pub pixel_points: Vec<f64>,
    /// Percentages reported individually.
    pub percent_points: Vec<f64>,
}

impl Default for EvalParams {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            profile: DatasetProfile::default(),
            pixel_range: [1.0, 26.0, 1.0],
            pixel_points: vec![5.0, 10.0, 15.0, 20.0],
            percent_points: vec![1.0, 2.0, 3.0],
        }
    }
}

impl EvalParams {
    /// Default parameters for a dataset profile.
    pub fn new(profile: DatasetProfile) -> Self {
        Self {
            profile,
            ..Self::default()
        }
    }

    /// Parse parameters from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Check that the parameters describe a runnable evaluation.
    ///
    /// # Errors
    ///
    /// Returns an error for zero workers, an invalid or empty pixel range, or
    /// a reported pixel threshold outside the range, or a reported percentage
    /// that is not a whole number of percent steps inside the percent range.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(LocEvalError::InvalidWorkerCount(self.workers));
        }

        let pixel = self.pixel_thresholds()?;
        if pixel.is_empty() {
            return Err(LocEvalError::InvalidConfig("pixel range is empty".to_string()));
        }
        if let Some(&missing) = self.pixel_points.iter().find(|&&p| !pixel.contains(&p)) {
            return Err(LocEvalError::InvalidConfig(format!(
                "pixel point {} is not in the pixel range",
                missing
            )));
        }

        let percent = self.percent_thresholds()?;
        for &point in &self.percent_points {
            let steps = point / PERCENT_STEP;
            if !steps.is_finite() || steps < 1.0 || steps.fract() != 0.0 {
                return Err(LocEvalError::InvalidConfig(format!(
                    "percent point {} is not a multiple of {}%",
                    point, PERCENT_STEP
                )));
            }
            if !percent.contains(&self.profile.percent_threshold(point)) {
                return Err(LocEvalError::InvalidConfig(format!(
                    "percent point {} is not in the {} percent range",
                    point, self.profile
                )));
            }
        }

        Ok(())
    }

    /// Thresholds of the pixel range.
    pub fn pixel_thresholds(&self) -> Result<Vec<f64>> {
        let [start, stop, step] = self.pixel_range;
        threshold_range(start, stop, step)
    }

    /// Thresholds of the profile's percent range.
    pub fn percent_thresholds(&self) -> Result<Vec<f64>> {
        self.profile.percent_thresholds()
    }
}
