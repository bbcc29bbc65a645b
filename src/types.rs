//! Core data types for point annotations, detections and match results.

use crate::error::{LocEvalError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sequence identifier as assigned by the dataset.
pub type SequenceId = u32;

/// Number of columns in a full point record row.
pub const RECORD_COLUMNS: usize = 7;

/// Number of columns in a per-frame point row (x, y, w, h, value).
pub const FRAME_POINT_COLUMNS: usize = 5;

/// One annotated or detected point in a sequence.
///
/// Points are stored as boxes in LTWH format. For ground truth, `value` is an
/// ignore flag (0 = normal, nonzero = ignore-eligible). For detections it is the
/// confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub frame_id: i64,
    pub track_id: i64,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub value: f64,
}

impl PointRecord {
    /// Create a new point record.
    pub fn new(frame_id: i64, track_id: i64, x: f64, y: f64, w: f64, h: f64, value: f64) -> Self {
        Self { frame_id, track_id, x, y, w, h, value }
    }

    /// Build a record from a raw `[frame, track, x, y, w, h, value]` row.
    ///
    /// # Errors
    ///
    /// Returns `InvalidShape` if the row does not have exactly 7 columns, and
    /// `InvalidRecord` if the frame or track id is not an integer.
    pub fn from_row(row: &[f64]) -> Result<Self> {
        if row.len() != RECORD_COLUMNS {
            return Err(LocEvalError::InvalidShape {
                expected: RECORD_COLUMNS,
                found: row.len(),
            });
        }
        Ok(Self::new(
            integer_id("frame", row[0])?,
            integer_id("track", row[1])?,
            row[2],
            row[3],
            row[4],
            row[5],
            row[6],
        ))
    }

    /// The per-frame slice used by the matcher.
    pub fn frame_point(&self) -> FramePoint {
        FramePoint::new(self.x, self.y, self.w, self.h, self.value)
    }
}

fn integer_id(column: &str, value: f64) -> Result<i64> {
    if !value.is_finite() || value.fract() != 0.0 || value.abs() >= i64::MAX as f64 {
        return Err(LocEvalError::InvalidRecord(format!("{} id {} is not an integer", column, value)));
    }
    Ok(value as i64)
}

/// A point within a single frame: box geometry plus score or ignore flag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FramePoint {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub value: f64,
}

impl FramePoint {
    /// Create a new frame point.
    pub fn new(x: f64, y: f64, w: f64, h: f64, value: f64) -> Self {
        Self { x, y, w, h, value }
    }

    /// Build a frame point from a raw `[x, y, w, h, value]` row.
    ///
    /// # Errors
    ///
    /// Returns `InvalidShape` if the row does not have exactly 5 columns.
    pub fn from_row(row: &[f64]) -> Result<Self> {
        if row.len() != FRAME_POINT_COLUMNS {
            return Err(LocEvalError::InvalidShape {
                expected: FRAME_POINT_COLUMNS,
                found: row.len(),
            });
        }
        Ok(Self::new(row[0], row[1], row[2], row[3], row[4]))
    }

    /// Box center `(x + w/2, y + h/2)`.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Copy with every column clamped to be non-negative.
    pub fn clamped(&self) -> Self {
        Self::new(
            self.x.max(0.0),
            self.y.max(0.0),
            self.w.max(0.0),
            self.h.max(0.0),
            self.value.max(0.0),
        )
    }

    /// Whether this ground-truth point is ignore-eligible.
    pub fn is_ignore(&self) -> bool {
        self.value != 0.0
    }
}

/// Outcome of matching a single point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MatchState {
    #[default]
    Unmatched,
    Matched,
    /// Absorbed by (or resting on) an ignore-eligible ground-truth point.
    IgnoredMatch,
}

impl MatchState {
    /// Numeric label: 0 unmatched, 1 matched, -1 ignored match.
    pub fn code(self) -> i8 {
        match self {
            MatchState::Unmatched => 0,
            MatchState::Matched => 1,
            MatchState::IgnoredMatch => -1,
        }
    }
}

/// A ground-truth point's original flag and its assigned label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabeledPoint {
    pub value: f64,
    pub state: MatchState,
}

/// A detection's confidence score and its assigned label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredMatch {
    pub score: f64,
    pub state: MatchState,
}

/// Per-sequence point tables, ordered by ascending sequence id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequenceTable {
    sequences: BTreeMap<SequenceId, Vec<PointRecord>>,
}

impl SequenceTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from raw 7-column rows per sequence.
    ///
    /// # Errors
    ///
    /// Returns `InvalidShape` on the first row with the wrong width.
    pub fn from_rows<I, R>(sequences: I) -> Result<Self>
    where
        I: IntoIterator<Item = (SequenceId, Vec<R>)>,
        R: AsRef<[f64]>,
    {
        let mut table = Self::new();
        for (seq_id, rows) in sequences {
            let records = rows
                .iter()
                .map(|row| PointRecord::from_row(row.as_ref()))
                .collect::<Result<Vec<_>>>()?;
            table.insert(seq_id, records);
        }
        Ok(table)
    }

    /// Parse a table from JSON (`{"<seq id>": [record, ...], ...}`).
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Insert or replace the records of a sequence.
    pub fn insert(&mut self, seq_id: SequenceId, records: Vec<PointRecord>) {
        self.sequences.insert(seq_id, records);
    }

    /// Records of one sequence.
    pub fn get(&self, seq_id: SequenceId) -> Option<&[PointRecord]> {
        self.sequences.get(&seq_id).map(Vec::as_slice)
    }

    /// Iterate sequences in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (SequenceId, &[PointRecord])> {
        self.sequences.iter().map(|(&id, records)| (id, records.as_slice()))
    }

    pub fn sequence_ids(&self) -> impl Iterator<Item = SequenceId> + '_ {
        self.sequences.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Total number of records over all sequences.
    pub fn total_points(&self) -> usize {
        self.sequences.values().map(Vec::len).sum()
    }
}

/// Flat match results for one threshold over the whole dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchLedger {
    pub ground_truth: Vec<MatchState>,
    pub detections: Vec<ScoredMatch>,
}

impl MatchLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Evaluation outcome for a single distance threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdReport {
    pub threshold: f64,
    /// Average precision in percent, `[0, 100]`.
    pub ap: f64,
    pub ground_truth: usize,
    pub true_positives: usize,
    pub false_positives: usize,
    pub ignored_detections: usize,
    /// Precision at the last ranked detection.
    pub precision: f64,
    /// Recall at the last ranked detection.
    pub recall: f64,
}
