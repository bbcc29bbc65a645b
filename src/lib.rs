//! # locmap-eval
//!
//! A Rust library for evaluating point-localization detections (for example
//! crowd-counting detectors) against ground truth across many distance
//! thresholds.
//!
//! For every threshold the library:
//! - greedily matches detections to ground-truth points frame by frame
//!   (highest score first, nearest unmatched point within the threshold)
//! - ranks all detections of the dataset by confidence
//! - integrates the precision-recall curve into an Average Precision (AP)
//!
//! Thresholds are scored in parallel on a fixed-size worker pool, and the
//! resulting `threshold -> AP` mapping answers range-average queries such as
//! "AP averaged over 1..25 pixels" or "AP at 1% of the image size".
//!
//! ## Quick Start
//!
//! ```rust
//! use locmap_eval::scheduler::run;
//! use locmap_eval::types::{PointRecord, SequenceTable};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Records are [frame, track, x, y, w, h, value]; value is the ignore flag
//! // for ground truth and the confidence score for detections.
//! let mut ground_truth = SequenceTable::new();
//! ground_truth.insert(1, vec![PointRecord::new(1, 0, 100.0, 100.0, 20.0, 20.0, 0.0)]);
//!
//! let mut detections = SequenceTable::new();
//! detections.insert(1, vec![PointRecord::new(1, -1, 102.0, 100.0, 20.0, 20.0, 0.9)]);
//!
//! let thresholds: Vec<f64> = (1..=25).map(f64::from).collect();
//! let results = run(&ground_truth, &detections, &thresholds, 4)?;
//!
//! println!("AP@1:25 = {:.4}", results.get(&thresholds)?);
//! println!("AP@5    = {:.4}", results.get(&[5.0])?);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod types;
pub mod matching;
pub mod accumulator;
pub mod metrics;
pub mod threshold;
pub mod params;
pub mod results;
pub mod scheduler;
pub mod evaluator;

// Re-export commonly used types and functions
pub use error::{LocEvalError, Result};
pub use types::{
    FramePoint, MatchLedger, MatchState, PointRecord, SequenceId, SequenceTable, ThresholdReport,
};
pub use matching::{match_frame, match_rows, FrameMatch};
pub use accumulator::accumulate;
pub use evaluator::{evaluate_threshold, summarize, Summary, SummaryEntry};
pub use params::EvalParams;
pub use results::MapResults;
pub use scheduler::{run, ThresholdScheduler, DEFAULT_WORKERS};
pub use threshold::{threshold_range, validate_thresholds, DatasetProfile};
