//! Precision-recall and Average Precision metrics.

pub mod ap;
pub mod precision_recall;

pub use ap::{calculate_map, integrate, voc_ap};
pub use precision_recall::{build_curve, rank_detections, PrecisionRecallCurve};
