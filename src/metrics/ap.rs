//! Average Precision (AP) and mean Average Precision (mAP) calculation.

use crate::metrics::precision_recall::build_curve;
use crate::types::{MatchLedger, ThresholdReport};

/// Calculate Average Precision from a precision-recall curve.
///
/// Uses exact VOC-style integration: the curve is padded with recall 0 and 1
/// (precision 0 at both ends), precision is replaced by its non-increasing
/// envelope from the tail, and the area is summed at each recall change.
///
/// # Arguments
///
/// * `recalls` - Recall values in ranking order
/// * `precisions` - Precision values in ranking order
///
/// # Returns
///
/// Returns the Average Precision value (0.0 to 1.0).
///
/// # Example
///
/// ```
/// use locmap_eval::metrics::ap::voc_ap;
///
/// let recalls = vec![0.5, 0.5, 1.0];
/// let precisions = vec![1.0, 0.5, 0.6667];
/// let ap = voc_ap(&recalls, &precisions);
/// assert!((ap - 0.83335).abs() < 1e-9);
/// ```
pub fn voc_ap(recalls: &[f64], precisions: &[f64]) -> f64 {
    let mut mrec = Vec::with_capacity(recalls.len() + 2);
    mrec.push(0.0);
    mrec.extend_from_slice(recalls);
    mrec.push(1.0);

    let mut mpre = Vec::with_capacity(precisions.len() + 2);
    mpre.push(0.0);
    mpre.extend_from_slice(precisions);
    mpre.push(0.0);

    for i in (0..mpre.len() - 1).rev() {
        mpre[i] = mpre[i].max(mpre[i + 1]);
    }

    (1..mrec.len())
        .filter(|&i| mrec[i] != mrec[i - 1])
        .map(|i| (mrec[i] - mrec[i - 1]) * mpre[i])
        .sum()
}

/// Score one threshold's ledger.
///
/// Returns a report whose `ap` is in percent. The report's `threshold` is left
/// at 0; the caller fills it in.
pub fn integrate(ledger: &MatchLedger) -> ThresholdReport {
    let curve = build_curve(ledger);
    let ap = voc_ap(&curve.recalls, &curve.precisions) * 100.0;

    ThresholdReport {
        threshold: 0.0,
        ap,
        ground_truth: curve.ground_truth,
        true_positives: curve.true_positives,
        false_positives: curve.false_positives,
        ignored_detections: curve.ignored,
        precision: curve.final_precision(),
        recall: curve.final_recall(),
    }
}

/// Calculate mean Average Precision over a set of AP values.
///
/// # Example
///
/// ```
/// use locmap_eval::metrics::ap::calculate_map;
///
/// let aps = vec![80.0, 90.0, 75.0, 85.0];
/// assert!((calculate_map(&aps) - 82.5).abs() < 1e-10);
/// ```
pub fn calculate_map(aps: &[f64]) -> f64 {
    if aps.is_empty() {
        return 0.0;
    }

    aps.iter().sum::<f64>() / aps.len() as f64
}
