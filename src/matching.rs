//! Greedy nearest-neighbour matching of detections to ground-truth points.

use crate::error::Result;
use crate::types::{FramePoint, LabeledPoint, MatchState, ScoredMatch};

/// Match results for one frame, in the caller's input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameMatch {
    pub ground_truth: Vec<LabeledPoint>,
    pub detections: Vec<ScoredMatch>,
}

/// Euclidean distance between two centers.
fn center_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

/// Pairwise center distances, row-major with one row per detection.
///
/// # Example
///
/// ```
/// use locmap_eval::matching::distance_matrix;
/// use locmap_eval::types::FramePoint;
///
/// let dets = vec![FramePoint::new(0.0, 0.0, 2.0, 2.0, 0.9)];
/// let gts = vec![
///     FramePoint::new(3.0, 4.0, 2.0, 2.0, 0.0),
///     FramePoint::new(0.0, 0.0, 2.0, 2.0, 0.0),
/// ];
/// let dist = distance_matrix(&dets, &gts);
/// assert_eq!(dist, vec![5.0, 0.0]);
/// ```
pub fn distance_matrix(detections: &[FramePoint], ground_truths: &[FramePoint]) -> Vec<f64> {
    let gt_centers: Vec<(f64, f64)> = ground_truths.iter().map(FramePoint::center).collect();

    detections
        .iter()
        .flat_map(|det| {
            let center = det.center();
            gt_centers.iter().map(move |&gt| center_distance(center, gt))
        })
        .collect()
}

/// Match one frame's detections to its ground truth under a distance threshold.
///
/// Detections are visited highest score first. Ground truth is scanned normal
/// points first, ignore-eligible points last, and each detection takes the
/// nearest unmatched point within `threshold`. Once a detection holds any
/// candidate, ignore-eligible points are no longer considered, so a normal
/// match always wins over an ignore match. Among equally distant candidates
/// the one scanned last wins.
///
/// Detection columns are clamped to be non-negative first. A detection resting
/// on an ignore-eligible point is labeled `IgnoredMatch` and the point stays
/// available to other detections. Ignore-eligible ground truth is always
/// labeled `IgnoredMatch`.
///
/// # Arguments
///
/// * `ground_truths` - Ground-truth points of the frame, `value` is the ignore flag
/// * `detections` - Detections of the frame, `value` is the confidence score
/// * `threshold` - Maximum center-to-center distance of a match
///
/// # Example
///
/// ```
/// use locmap_eval::matching::match_frame;
/// use locmap_eval::types::{FramePoint, MatchState};
///
/// let gts = vec![FramePoint::new(100.0, 100.0, 20.0, 20.0, 0.0)];
/// let dets = vec![FramePoint::new(101.0, 100.0, 20.0, 20.0, 0.9)];
/// let matched = match_frame(&gts, &dets, 5.0);
/// assert_eq!(matched.detections[0].state, MatchState::Matched);
/// assert_eq!(matched.ground_truth[0].state, MatchState::Matched);
/// ```
pub fn match_frame(ground_truths: &[FramePoint], detections: &[FramePoint], threshold: f64) -> FrameMatch {
    let detections: Vec<FramePoint> = detections.iter().map(FramePoint::clamped).collect();

    let mut det_order: Vec<usize> = (0..detections.len()).collect();
    det_order.sort_by(|&a, &b| detections[b].value.total_cmp(&detections[a].value));

    let mut gt_order: Vec<usize> = (0..ground_truths.len()).collect();
    gt_order.sort_by_key(|&g| ground_truths[g].is_ignore());

    let sorted_dets: Vec<FramePoint> = det_order.iter().map(|&d| detections[d]).collect();
    let sorted_gts: Vec<FramePoint> = gt_order.iter().map(|&g| ground_truths[g]).collect();
    let dist = distance_matrix(&sorted_dets, &sorted_gts);

    let ng = sorted_gts.len();
    let mut gt_state: Vec<MatchState> = sorted_gts
        .iter()
        .map(|gt| {
            if gt.is_ignore() {
                MatchState::IgnoredMatch
            } else {
                MatchState::Unmatched
            }
        })
        .collect();
    let mut det_state = vec![MatchState::Unmatched; sorted_dets.len()];

    for (d, state) in det_state.iter_mut().enumerate() {
        let mut best_dist = threshold;
        let mut best: Option<(usize, MatchState)> = None;

        for g in 0..ng {
            if gt_state[g] == MatchState::Matched {
                continue;
            }

            // Ignore points sort last; a held candidate cannot be displaced by them.
            if best.is_some() && gt_state[g] == MatchState::IgnoredMatch {
                break;
            }

            let candidate = dist[d * ng + g];
            if !(candidate <= best_dist) {
                continue;
            }

            best_dist = candidate;
            let outcome = if gt_state[g] == MatchState::IgnoredMatch {
                MatchState::IgnoredMatch
            } else {
                MatchState::Matched
            };
            best = Some((g, outcome));
        }

        match best {
            Some((g, MatchState::Matched)) => {
                gt_state[g] = MatchState::Matched;
                *state = MatchState::Matched;
            }
            Some((_, outcome)) => *state = outcome,
            None => {}
        }
    }

    // Scatter back into input order.
    let mut ground_truth = vec![LabeledPoint { value: 0.0, state: MatchState::Unmatched }; ng];
    for (sorted_idx, &orig_idx) in gt_order.iter().enumerate() {
        ground_truth[orig_idx] = LabeledPoint {
            value: ground_truths[orig_idx].value,
            state: gt_state[sorted_idx],
        };
    }

    let mut scored = vec![ScoredMatch { score: 0.0, state: MatchState::Unmatched }; sorted_dets.len()];
    for (sorted_idx, &orig_idx) in det_order.iter().enumerate() {
        scored[orig_idx] = ScoredMatch {
            score: detections[orig_idx].value,
            state: det_state[sorted_idx],
        };
    }

    FrameMatch {
        ground_truth,
        detections: scored,
    }
}

/// Match raw `[x, y, w, h, value]` rows for one frame.
///
/// # Errors
///
/// Returns `InvalidShape` if any row does not have exactly 5 columns.
pub fn match_rows<R: AsRef<[f64]>>(ground_truths: &[R], detections: &[R], threshold: f64) -> Result<FrameMatch> {
    let gts = ground_truths
        .iter()
        .map(|row| FramePoint::from_row(row.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    let dets = detections
        .iter()
        .map(|row| FramePoint::from_row(row.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    Ok(match_frame(&gts, &dets, threshold))
}
