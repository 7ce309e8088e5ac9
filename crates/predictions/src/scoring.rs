//! Confidence scoring for one `(organization, target month)` pair.
//!
//! Additive model, each signal a fixed-weight contribution, clamped at
//! [`MAX_CONFIDENCE`]. Scores are heuristics, not calibrated probabilities.

use serde::{Deserialize, Serialize};

/// Organization posted in the same month one year before the target.
pub const LAST_YEAR_BONUS: f64 = 0.40;
/// Full weight of the relative month-frequency term.
pub const FREQUENCY_WEIGHT: f64 = 0.25;
/// Target month is consistent with the detected periodic pattern.
pub const PATTERN_BONUS: f64 = 0.20;
/// Full weight of the log-scaled data-volume term.
pub const DATA_VOLUME_WEIGHT: f64 = 0.15;
/// Confidence is never reported above this.
pub const MAX_CONFIDENCE: f64 = 0.90;
/// Pairs scoring below this are dropped from forecasts.
pub const EMIT_THRESHOLD: f64 = 0.50;

/// Signals feeding [`score_confidence`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScoreInputs {
    pub last_year_same_month: bool,
    /// Postings in the target month number, any year.
    pub month_frequency: usize,
    /// Highest per-month-number posting count for the organization.
    pub max_month_frequency: usize,
    pub pattern_matched: bool,
    pub historical_count: usize,
}

/// `min(log10(n + 1) / 1.2, 1) * 0.15`: the first few postings matter most.
pub fn data_volume_bonus(historical_count: usize) -> f64 {
    ((historical_count as f64 + 1.0).log10() / 1.2).min(1.0) * DATA_VOLUME_WEIGHT
}

/// Relative month frequency, up to [`FREQUENCY_WEIGHT`].
///
/// When the last-year bonus already counted one posting in this month, that
/// posting is removed from both the target and the max count.
fn frequency_score(inputs: &ScoreInputs) -> f64 {
    let (freq, max_freq) = if inputs.last_year_same_month {
        (
            inputs.month_frequency.saturating_sub(1),
            inputs.max_month_frequency.saturating_sub(1),
        )
    } else {
        (inputs.month_frequency, inputs.max_month_frequency)
    };

    if max_freq == 0 {
        return 0.0;
    }
    (freq as f64 / max_freq as f64).min(1.0) * FREQUENCY_WEIGHT
}

/// Total confidence in `[0, MAX_CONFIDENCE]`.
pub fn score_confidence(inputs: &ScoreInputs) -> f64 {
    let mut confidence = 0.0;

    if inputs.last_year_same_month {
        confidence += LAST_YEAR_BONUS;
    }
    confidence += frequency_score(inputs);
    if inputs.pattern_matched {
        confidence += PATTERN_BONUS;
    }
    confidence += data_volume_bonus(inputs.historical_count);

    confidence.min(MAX_CONFIDENCE)
}

/// Whether a score clears the emission threshold.
pub fn is_emittable(confidence: f64) -> bool {
    confidence >= EMIT_THRESHOLD
}

/// Two-decimal rounding applied to reported confidences.
pub fn round_confidence(confidence: f64) -> f64 {
    (confidence * 100.0).round() / 100.0
}

/// Display bucket for a confidence score.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.70 {
            ConfidenceLevel::High
        } else if confidence >= 0.55 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
        }
    }
}
