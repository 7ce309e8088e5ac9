//! Forecast output records.
//!
//! These are insights for a presentation layer, constructed per request and
//! discarded; the engine itself never stores them.

use serde::{Deserialize, Serialize};

use hirecast_core::YearMonth;

use crate::pattern::PeriodicPattern;
use crate::scoring::ConfidenceLevel;

/// Why a historical posting is cited for a forecast.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchReason {
    SameMonthLastYear,
    PeriodicPattern,
    HighFrequency,
}

/// A historical posting cited as support for a forecast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    pub job_id: String,
    pub title: String,
    pub posted_month: YearMonth,
    pub match_reason: MatchReason,
}

/// Signals a forecast was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasedOn {
    pub historical_count: usize,
    pub last_year_same_month: bool,
    pub periodic_pattern: Option<PeriodicPattern>,
}

/// Forecast that an organization posts in `predicted_month`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub org_name: String,
    pub predicted_month: YearMonth,
    /// Rounded to two decimals.
    pub confidence: f64,
    pub confidence_level: ConfidenceLevel,
    pub based_on: BasedOn,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_jobs: Option<Vec<Evidence>>,
}

/// Best single forecast for one organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextPosting {
    pub org_name: String,
    pub predicted_month: YearMonth,
    pub confidence: f64,
    pub confidence_level: ConfidenceLevel,
    pub periodic_pattern: Option<PeriodicPattern>,
    /// Most frequent month numbers, ascending.
    pub typical_months: Vec<u32>,
    pub evidence_jobs: Vec<Evidence>,
}
