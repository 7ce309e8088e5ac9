//! Presentation-side ranking helpers.

use crate::prediction::Prediction;

/// Top-N cut for plain forecasts.
pub const TOP_FORECASTS: usize = 50;
/// Top-N cut for evidence forecasts.
pub const TOP_EVIDENCE_FORECASTS: usize = 100;

/// Keep the `n` most confident predictions.
///
/// The sort is stable, so equally confident predictions keep their incoming
/// (month-ordered) relative order.
pub fn top_by_confidence(mut predictions: Vec<Prediction>, n: usize) -> Vec<Prediction> {
    predictions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    predictions.truncate(n);
    predictions
}
