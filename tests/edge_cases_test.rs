//! Comprehensive edge case and boundary condition tests.

use locmap_eval::accumulator::accumulate;
use locmap_eval::evaluator::evaluate_threshold;
use locmap_eval::matching::match_frame;
use locmap_eval::scheduler::run;
use locmap_eval::types::{FramePoint, MatchState, PointRecord, SequenceTable};

fn create_point(x: f64, y: f64, value: f64) -> FramePoint {
    FramePoint::new(x, y, 20.0, 20.0, value)
}

fn create_record(frame_id: i64, x: f64, y: f64, value: f64) -> PointRecord {
    PointRecord::new(frame_id, -1, x, y, 20.0, 20.0, value)
}

fn single_sequence(records: Vec<PointRecord>) -> SequenceTable {
    let mut table = SequenceTable::new();
    table.insert(1, records);
    table
}

// ============================================================================
// MATCHING EDGE CASES
// ============================================================================

#[test]
fn test_empty_detections_with_ground_truth() {
    let matched = match_frame(&[create_point(10.0, 10.0, 0.0)], &[], 5.0);
    assert!(matched.detections.is_empty());
    assert_eq!(matched.ground_truth[0].state, MatchState::Unmatched);
}

#[test]
fn test_empty_ground_truth_with_detections() {
    let matched = match_frame(&[], &[create_point(10.0, 10.0, 0.9)], 5.0);
    assert_eq!(matched.detections.len(), 1);
    assert_eq!(matched.detections[0].state, MatchState::Unmatched, "Should be false positive");
}

#[test]
fn test_many_detections_one_ground_truth() {
    let ground_truth = vec![create_point(50.0, 50.0, 0.0)];
    let detections: Vec<FramePoint> = (0..10)
        .map(|i| create_point(50.0 + i as f64 * 0.1, 50.0, 0.9 - i as f64 * 0.05))
        .collect();

    let matched = match_frame(&ground_truth, &detections, 5.0);
    let tp = matched.detections.iter().filter(|d| d.state == MatchState::Matched).count();
    assert_eq!(tp, 1, "Only one detection can claim the point");
    assert_eq!(matched.detections[0].state, MatchState::Matched, "Highest score wins");
}

#[test]
fn test_ties_in_score_keep_input_order() {
    let ground_truth = vec![create_point(0.0, 0.0, 0.0)];
    let detections = vec![create_point(2.0, 0.0, 0.5), create_point(1.0, 0.0, 0.5)];

    let matched = match_frame(&ground_truth, &detections, 5.0);
    assert_eq!(matched.detections[0].state, MatchState::Matched);
    assert_eq!(matched.detections[1].state, MatchState::Unmatched);
}

#[test]
fn test_zero_size_boxes() {
    let ground_truth = vec![FramePoint::new(5.0, 5.0, 0.0, 0.0, 0.0)];
    let detections = vec![FramePoint::new(5.0, 5.0, 0.0, 0.0, 0.7)];

    let matched = match_frame(&ground_truth, &detections, 0.001);
    assert_eq!(matched.detections[0].state, MatchState::Matched);
}

#[test]
fn test_box_size_shifts_center() {
    // Same corner, different sizes: centers 10 apart.
    let ground_truth = vec![FramePoint::new(0.0, 0.0, 20.0, 0.0, 0.0)];
    let detections = vec![FramePoint::new(0.0, 0.0, 0.0, 0.0, 0.7)];

    assert_eq!(match_frame(&ground_truth, &detections, 9.99).detections[0].state, MatchState::Unmatched);
    assert_eq!(match_frame(&ground_truth, &detections, 10.0).detections[0].state, MatchState::Matched);
}

#[test]
fn test_negative_ignore_flag_is_ignore() {
    let ground_truth = vec![create_point(0.0, 0.0, -1.0)];
    let detections = vec![create_point(0.0, 0.0, 0.9)];

    let matched = match_frame(&ground_truth, &detections, 5.0);
    assert_eq!(matched.detections[0].state, MatchState::IgnoredMatch);
}

#[test]
fn test_only_ignore_points() {
    let ground_truth = single_sequence(vec![create_record(1, 0.0, 0.0, 1.0), create_record(1, 100.0, 0.0, 1.0)]);
    let detections = single_sequence(vec![create_record(1, 0.0, 0.0, 0.9), create_record(1, 300.0, 0.0, 0.8)]);

    let report = evaluate_threshold(&ground_truth, &detections, 5.0).unwrap();
    assert_eq!(report.ignored_detections, 1);
    assert_eq!(report.false_positives, 1);
    assert_eq!(report.ap, 0.0);
}

// ============================================================================
// ACCUMULATION EDGE CASES
// ============================================================================

#[test]
fn test_empty_frames_contribute_nothing() {
    let ground_truth = single_sequence(vec![create_record(1, 0.0, 0.0, 0.0), create_record(10, 0.0, 0.0, 0.0)]);
    let detections = single_sequence(vec![create_record(1, 0.0, 0.0, 0.9), create_record(10, 0.0, 0.0, 0.8)]);

    let ledger = accumulate(&ground_truth, &detections, 5.0);
    assert_eq!(ledger.ground_truth.len(), 2);
    assert_eq!(ledger.detections.len(), 2);
}

#[test]
fn test_sequence_without_ground_truth_records() {
    let mut ground_truth = SequenceTable::new();
    ground_truth.insert(1, vec![]);
    let detections = single_sequence(vec![create_record(1, 0.0, 0.0, 0.9)]);

    let ledger = accumulate(&ground_truth, &detections, 5.0);
    assert!(ledger.ground_truth.is_empty());
    assert!(ledger.detections.is_empty());
}

#[test]
fn test_detection_only_sequence_ignored() {
    let ground_truth = single_sequence(vec![create_record(1, 0.0, 0.0, 0.0)]);
    let mut detections = single_sequence(vec![create_record(1, 0.0, 0.0, 0.9)]);
    detections.insert(2, vec![create_record(1, 0.0, 0.0, 0.99)]);

    let report = evaluate_threshold(&ground_truth, &detections, 5.0).unwrap();
    assert!((report.ap - 100.0).abs() < 1e-10);
}

#[test]
fn test_no_ground_truth_at_all() {
    let report = evaluate_threshold(&SequenceTable::new(), &SequenceTable::new(), 5.0).unwrap();
    assert_eq!(report.ap, 0.0);
    assert_eq!(report.ground_truth, 0);
}

#[test]
fn test_inputs_unchanged_after_run() {
    let ground_truth = single_sequence(vec![create_record(1, 0.0, 0.0, 1.0), create_record(1, 50.0, 0.0, 0.0)]);
    let detections = single_sequence(vec![create_record(1, -5.0, 0.0, -0.3), create_record(1, 50.0, 0.0, 0.8)]);
    let (gt_before, det_before) = (ground_truth.clone(), detections.clone());

    run(&ground_truth, &detections, &[1.0, 5.0, 10.0], 3).unwrap();

    assert_eq!(ground_truth, gt_before);
    assert_eq!(detections, det_before);
}

// ============================================================================
// THRESHOLD EDGE CASES
// ============================================================================

#[test]
fn test_more_workers_than_thresholds() {
    let ground_truth = single_sequence(vec![create_record(1, 0.0, 0.0, 0.0)]);
    let detections = single_sequence(vec![create_record(1, 2.0, 0.0, 0.9)]);

    let results = run(&ground_truth, &detections, &[1.0, 3.0], 32).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results.ap(1.0), Some(0.0));
    assert_eq!(results.ap(3.0), Some(100.0));
}

#[test]
fn test_unsorted_thresholds() {
    let ground_truth = single_sequence(vec![create_record(1, 0.0, 0.0, 0.0)]);
    let detections = single_sequence(vec![create_record(1, 2.0, 0.0, 0.9)]);

    let results = run(&ground_truth, &detections, &[25.0, 1.0, 7.5], 2).unwrap();
    assert_eq!(results.thresholds(), vec![1.0, 7.5, 25.0]);
}

#[test]
fn test_tiny_threshold() {
    let ground_truth = single_sequence(vec![create_record(1, 0.0, 0.0, 0.0)]);
    let detections = single_sequence(vec![create_record(1, 1e-3, 0.0, 0.9)]);

    let report = evaluate_threshold(&ground_truth, &detections, 1e-6).unwrap();
    assert_eq!(report.ap, 0.0);
}
