//! Parallel evaluation of independent distance thresholds.
//!
//! Each threshold is a self-contained unit of work: the worker that claims it
//! runs the accumulator and integrator over the shared, read-only sequence
//! tables and hands back one report. Workers come from a dedicated rayon pool
//! whose work-stealing queue hands out thresholds; results are merged only
//! after every task has returned.

use crate::error::{LocEvalError, Result};
use crate::evaluator::evaluate_threshold;
use crate::results::MapResults;
use crate::threshold::validate_thresholds;
use crate::types::{SequenceTable, ThresholdReport};
use rayon::prelude::*;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Default number of worker threads.
pub const DEFAULT_WORKERS: usize = 10;

/// Fixed-size worker pool that scores thresholds in parallel.
pub struct ThresholdScheduler {
    pool: rayon::ThreadPool,
    workers: usize,
}

impl ThresholdScheduler {
    /// Build a scheduler with `workers` threads.
    ///
    /// # Errors
    ///
    /// Returns `InvalidWorkerCount` for zero workers, or a pool build error.
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(LocEvalError::InvalidWorkerCount(workers));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("locmap-worker-{}", i))
            .build()?;

        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Score every threshold and collect the `threshold -> AP` mapping.
    ///
    /// Duplicate thresholds are scored once. A worker that panics is reported
    /// as `WorkerFailed` for its threshold instead of silently dropping it.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid thresholds, a failed worker, or a mapping
    /// that does not cover every requested threshold.
    pub fn run(&self, ground_truth: &SequenceTable, detections: &SequenceTable, thresholds: &[f64]) -> Result<MapResults> {
        self.run_with(thresholds, |threshold| {
            evaluate_threshold(ground_truth, detections, threshold)
        })
    }

    fn run_with<F>(&self, thresholds: &[f64], score: F) -> Result<MapResults>
    where
        F: Fn(f64) -> Result<ThresholdReport> + Sync,
    {
        let thresholds = validate_thresholds(thresholds)?;

        tracing::info!(
            thresholds = thresholds.len(),
            workers = self.workers,
            "computing mAP over {:?}",
            thresholds
        );

        let reports: Vec<ThresholdReport> = self.pool.install(|| {
            thresholds
                .par_iter()
                .with_min_len(1)
                .map(|&threshold| score_isolated(&score, threshold))
                .collect::<Result<Vec<_>>>()
        })?;

        let results = MapResults::from_reports(reports);
        if results.len() != thresholds.len() {
            return Err(LocEvalError::IncompleteResults {
                expected: thresholds.len(),
                completed: results.len(),
            });
        }

        tracing::info!(completed = results.len(), "mAP computation finished");
        Ok(results)
    }
}

/// Run one threshold, turning a panic into an error.
fn score_isolated<F>(score: &F, threshold: f64) -> Result<ThresholdReport>
where
    F: Fn(f64) -> Result<ThresholdReport>,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| score(threshold)));

    match outcome {
        Ok(report) => report,
        Err(payload) => Err(LocEvalError::WorkerFailed {
            threshold,
            reason: panic_reason(payload.as_ref()),
        }),
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}

/// Score `thresholds` on a fresh pool of `workers` threads.
///
/// # Example
///
/// ```
/// use locmap_eval::scheduler::run;
/// use locmap_eval::types::{PointRecord, SequenceTable};
///
/// let mut gt = SequenceTable::new();
/// gt.insert(1, vec![PointRecord::new(1, 0, 100.0, 100.0, 20.0, 20.0, 0.0)]);
/// let mut det = SequenceTable::new();
/// det.insert(1, vec![PointRecord::new(1, -1, 100.0, 100.0, 20.0, 20.0, 0.9)]);
///
/// let results = run(&gt, &det, &[1.0, 5.0], 2).unwrap();
/// assert_eq!(results.get(&[5.0]).unwrap(), 100.0);
/// ```
pub fn run(
    ground_truth: &SequenceTable,
    detections: &SequenceTable,
    thresholds: &[f64],
    workers: usize,
) -> Result<MapResults> {
    ThresholdScheduler::new(workers)?.run(ground_truth, detections, thresholds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PointRecord;

    fn dataset() -> (SequenceTable, SequenceTable) {
        let mut gt = SequenceTable::new();
        let mut det = SequenceTable::new();
        for seq in 1..=3u32 {
            let offset = f64::from(seq) * 3.0;
            gt.insert(
                seq,
                vec![
                    PointRecord::new(1, 0, 100.0, 100.0, 20.0, 20.0, 0.0),
                    PointRecord::new(2, 1, 300.0, 300.0, 20.0, 20.0, 0.0),
                ],
            );
            det.insert(
                seq,
                vec![
                    PointRecord::new(1, -1, 100.0 + offset, 100.0, 20.0, 20.0, 0.9),
                    PointRecord::new(2, -1, 600.0, 600.0, 20.0, 20.0, 0.5),
                ],
            );
        }
        (gt, det)
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(matches!(
            ThresholdScheduler::new(0),
            Err(LocEvalError::InvalidWorkerCount(0))
        ));
    }

    #[test]
    fn test_results_cover_every_threshold() {
        let (gt, det) = dataset();
        let thresholds: Vec<f64> = (1..=12).map(f64::from).collect();
        let results = run(&gt, &det, &thresholds, 4).unwrap();
        assert_eq!(results.thresholds(), thresholds);
    }

    #[test]
    fn test_worker_count_does_not_change_results() {
        let (gt, det) = dataset();
        let thresholds: Vec<f64> = (1..=12).map(f64::from).collect();
        let single = run(&gt, &det, &thresholds, 1).unwrap();
        let many = run(&gt, &det, &thresholds, 16).unwrap();
        for &t in &thresholds {
            assert_eq!(single.ap(t).unwrap().to_bits(), many.ap(t).unwrap().to_bits());
        }
    }

    #[test]
    fn test_duplicates_collapse() {
        let (gt, det) = dataset();
        let results = run(&gt, &det, &[5.0, 5.0, 10.0], 2).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let (gt, det) = dataset();
        assert!(matches!(
            run(&gt, &det, &[5.0, -1.0], 2),
            Err(LocEvalError::InvalidThreshold(_))
        ));
    }

    #[test]
    fn test_panic_reason() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_reason(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_reason(payload.as_ref()), "bang");
        let payload: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_reason(payload.as_ref()), "worker panicked");
    }

    #[test]
    fn test_worker_panic_fails_the_run() {
        let (gt, det) = dataset();
        let scheduler = ThresholdScheduler::new(4).unwrap();

        let outcome = scheduler.run_with(&[1.0, 5.0, 7.0, 10.0], |threshold| {
            if threshold == 7.0 {
                panic!("scoring failed at {}", threshold);
            }
            evaluate_threshold(&gt, &det, threshold)
        });

        match outcome {
            Err(LocEvalError::WorkerFailed { threshold, reason }) => {
                assert_eq!(threshold, 7.0);
                assert_eq!(reason, "scoring failed at 7");
            }
            other => panic!("expected WorkerFailed, got {:?}", other.map(|r| r.len())),
        }

        // The pool survives a failed run.
        let results = scheduler.run(&gt, &det, &[1.0, 5.0]).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_scorer_error_propagates() {
        let scheduler = ThresholdScheduler::new(2).unwrap();
        let outcome = scheduler.run_with(&[1.0, 2.0], |threshold| Err(LocEvalError::MissingThreshold(threshold)));
        assert!(matches!(outcome, Err(LocEvalError::MissingThreshold(_))));
    }
}
