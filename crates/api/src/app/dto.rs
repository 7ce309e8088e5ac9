use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use hirecast_infra::{DEFAULT_PATTERN_LIMIT, MAX_PATTERN_LIMIT, OrganizationPattern};
use hirecast_predictions::{ForecastWindow, NextPosting, Prediction};

use crate::app::errors;

// -------------------------
// Query DTOs
// -------------------------

/// Raw query for `/api/stats/predictions`; values are parsed by hand for JSON errors.
#[derive(Debug, Default, Deserialize)]
pub struct PredictionsQuery {
    pub extended: Option<String>,
    pub months: Option<String>,
}

impl PredictionsQuery {
    pub fn is_extended(&self) -> bool {
        self.extended.as_deref() == Some("true")
    }

    /// Batch window: default 10, saturating at 12. Only consulted in batch mode.
    pub fn window(&self) -> Result<ForecastWindow, axum::response::Response> {
        let Some(raw) = self.months.as_deref() else {
            return Ok(ForecastWindow::extended_default());
        };
        raw.trim()
            .parse::<i64>()
            .ok()
            .and_then(ForecastWindow::clamped)
            .ok_or_else(|| {
                errors::json_error(
                    axum::http::StatusCode::BAD_REQUEST,
                    "invalid_months",
                    format!("months must be a positive integer, got {raw:?}"),
                )
            })
    }
}

/// Raw query for `/api/stats/organizations`.
#[derive(Debug, Default, Deserialize)]
pub struct OrganizationPatternsQuery {
    pub limit: Option<String>,
}

impl OrganizationPatternsQuery {
    /// Default 20, clamped to `1..=100`; non-numeric is rejected.
    pub fn limit(&self) -> Result<usize, axum::response::Response> {
        let Some(raw) = self.limit.as_deref() else {
            return Ok(DEFAULT_PATTERN_LIMIT);
        };
        raw.trim()
            .parse::<i64>()
            .map(|n| n.clamp(1, MAX_PATTERN_LIMIT as i64) as usize)
            .map_err(|_| {
                errors::json_error(
                    axum::http::StatusCode::BAD_REQUEST,
                    "invalid_limit",
                    format!("limit must be an integer, got {raw:?}"),
                )
            })
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionsResponse {
    pub success: bool,
    pub predictions: Vec<Prediction>,
    pub generated_at: DateTime<FixedOffset>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationPredictionResponse {
    pub success: bool,
    pub org_name: String,
    pub prediction: Option<NextPosting>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationPatternsResponse {
    pub success: bool,
    pub data: Vec<OrganizationPattern>,
    pub generated_at: DateTime<FixedOffset>,
}
