//! Dataset-wide accumulation of per-frame match results.

use crate::matching::match_frame;
use crate::types::{FramePoint, MatchLedger, PointRecord, SequenceTable};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

/// Group records of one sequence by frame id.
pub fn group_by_frame(records: &[PointRecord]) -> BTreeMap<i64, Vec<FramePoint>> {
    let mut frames: BTreeMap<i64, Vec<FramePoint>> = BTreeMap::new();

    for record in records {
        frames.entry(record.frame_id).or_default().push(record.frame_point());
    }

    frames
}

/// Match every frame of every sequence and concatenate the labels.
///
/// Sequences are visited in ascending id order. Within a sequence, every frame
/// id between the smallest and largest ground-truth frame id is matched, so
/// ground truth of frames without detections still counts toward recall.
/// Detections outside that range, or in sequences without ground truth, are
/// not scored.
///
/// # Arguments
///
/// * `ground_truth` - Ground-truth table; `value` is the ignore flag
/// * `detections` - Detection table; `value` is the confidence score
/// * `threshold` - Maximum center-to-center match distance
pub fn accumulate(ground_truth: &SequenceTable, detections: &SequenceTable, threshold: f64) -> MatchLedger {
    let mut ledger = MatchLedger::new();

    for (seq_id, gt_records) in ground_truth.iter() {
        let gt_frames = group_by_frame(gt_records);
        let det_frames = match detections.get(seq_id) {
            Some(records) => group_by_frame(records),
            None => {
                tracing::debug!(seq_id, "sequence has no detection table");
                BTreeMap::new()
            }
        };

        let (Some(&first), Some(&last)) = (gt_frames.keys().next(), gt_frames.keys().next_back()) else {
            continue;
        };

        let dropped: usize = det_frames
            .range(..first)
            .chain(det_frames.range((Bound::Excluded(last), Bound::Unbounded)))
            .map(|(_, points)| points.len())
            .sum();
        if dropped > 0 {
            tracing::debug!(seq_id, dropped, "detections outside ground-truth frame range");
        }

        // Frames present on either side, ascending; empty ids in between are skipped.
        let frame_ids: BTreeSet<i64> = gt_frames
            .keys()
            .chain(det_frames.range(first..=last).map(|(frame_id, _)| frame_id))
            .copied()
            .collect();

        for frame_id in frame_ids {
            let gts = gt_frames.get(&frame_id).map(Vec::as_slice).unwrap_or_default();
            let dets = det_frames.get(&frame_id).map(Vec::as_slice).unwrap_or_default();

            let frame = match_frame(gts, dets, threshold);
            ledger.ground_truth.extend(frame.ground_truth.iter().map(|g| g.state));
            ledger.detections.extend(frame.detections);
        }
    }

    ledger
}
