//! Precision-recall curve construction from ranked detections.

use crate::types::{MatchLedger, MatchState, ScoredMatch};

/// Cumulative precision and recall at every ranked detection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrecisionRecallCurve {
    pub precisions: Vec<f64>,
    pub recalls: Vec<f64>,
    pub true_positives: usize,
    pub false_positives: usize,
    pub ignored: usize,
    pub ground_truth: usize,
}

impl PrecisionRecallCurve {
    /// Precision at the last ranked detection, or 0 with no detections.
    pub fn final_precision(&self) -> f64 {
        self.precisions.last().copied().unwrap_or(0.0)
    }

    /// Recall at the last ranked detection, or 0 with no detections.
    pub fn final_recall(&self) -> f64 {
        self.recalls.last().copied().unwrap_or(0.0)
    }
}

/// Rank detections by descending score.
///
/// Ignored matches are left out. The sort is stable, so equal scores keep the
/// order in which the accumulator produced them.
pub fn rank_detections(detections: &[ScoredMatch]) -> Vec<ScoredMatch> {
    let mut ranked: Vec<ScoredMatch> = detections
        .iter()
        .filter(|d| d.state != MatchState::IgnoredMatch)
        .copied()
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

/// Build the precision-recall curve for one threshold.
///
/// Recall is relative to every ground-truth point in the ledger, ignore-eligible
/// or not.
///
/// # Example
///
/// ```
/// use locmap_eval::metrics::precision_recall::build_curve;
/// use locmap_eval::types::{MatchLedger, MatchState, ScoredMatch};
///
/// let ledger = MatchLedger {
///     ground_truth: vec![MatchState::Matched, MatchState::Unmatched],
///     detections: vec![
///         ScoredMatch { score: 0.4, state: MatchState::Unmatched },
///         ScoredMatch { score: 0.9, state: MatchState::Matched },
///     ],
/// };
/// let curve = build_curve(&ledger);
/// assert_eq!(curve.precisions, vec![1.0, 0.5]);
/// assert_eq!(curve.recalls, vec![0.5, 0.5]);
/// ```
pub fn build_curve(ledger: &MatchLedger) -> PrecisionRecallCurve {
    let ranked = rank_detections(&ledger.detections);
    let ground_truth = ledger.ground_truth.len();
    let ignored = ledger.detections.len() - ranked.len();

    let mut precisions = Vec::with_capacity(ranked.len());
    let mut recalls = Vec::with_capacity(ranked.len());
    let mut tp = 0usize;
    let mut fp = 0usize;

    for detection in &ranked {
        if detection.state == MatchState::Matched {
            tp += 1;
        } else {
            fp += 1;
        }

        precisions.push(tp as f64 / (tp + fp).max(1) as f64);
        recalls.push(tp as f64 / ground_truth.max(1) as f64);
    }

    PrecisionRecallCurve {
        precisions,
        recalls,
        true_positives: tp,
        false_positives: fp,
        ignored,
        ground_truth,
    }
}
