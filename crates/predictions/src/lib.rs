//! `hirecast-predictions`
//!
//! **Responsibility:** the recruitment-posting forecast engine.
//!
//! Given per-organization posting histories, infer a coarse periodic hiring
//! pattern and score candidate months for the next posting.
//!
//! This crate is intentionally **pure**:
//! - It performs no I/O and holds no shared state.
//! - "Now" is an explicit argument, never read from the clock.
//! - Heuristic misses are empty output, not errors.

pub mod evidence;
pub mod forecast;
pub mod job;
pub mod pattern;
pub mod posting;
pub mod prediction;
pub mod predictor;
pub mod rank;
pub mod result;
pub mod scoring;
pub mod window;

pub use evidence::{EvidenceLimits, collect_evidence};
pub use forecast::{generate_forecasts, generate_forecasts_with_evidence};
pub use job::{BatchForecastJob, EvidenceForecastJob, NextPostingJob, PredictionJob};
pub use pattern::{PeriodicPattern, detect_pattern, intervals, is_pattern_match};
pub use posting::{MIN_POSTINGS, OrganizationHistory, Posting};
pub use prediction::{BasedOn, Evidence, MatchReason, NextPosting, Prediction};
pub use predictor::{predict_next, typical_months};
pub use rank::{TOP_EVIDENCE_FORECASTS, TOP_FORECASTS, top_by_confidence};
pub use result::{PredictionError, PredictionResult};
pub use scoring::{ConfidenceLevel, ScoreInputs, data_volume_bonus, score_confidence};
pub use window::{
    DEFAULT_EXTENDED_WINDOW_MONTHS, DEFAULT_WINDOW_MONTHS, ForecastWindow, MAX_WINDOW_MONTHS,
};
