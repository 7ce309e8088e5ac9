//! Batch forecast generation across all organizations.
//!
//! For each analysable organization the periodic pattern and month
//! frequencies are computed once, then every target month of the window is
//! scored independently.

use std::cmp::Ordering;

use tracing::debug;

use hirecast_core::YearMonth;

use crate::evidence::{EvidenceLimits, collect_evidence};
use crate::pattern::{PeriodicPattern, detect_pattern, is_pattern_match};
use crate::posting::{OrganizationHistory, month_frequency};
use crate::prediction::{BasedOn, Prediction};
use crate::scoring::{
    ConfidenceLevel, ScoreInputs, is_emittable, round_confidence, score_confidence,
};
use crate::window::ForecastWindow;

/// Per-organization facts shared by every target month.
struct OrgProfile<'a> {
    history: &'a OrganizationHistory,
    pattern: Option<PeriodicPattern>,
    frequency: [usize; 13],
    max_frequency: usize,
}

impl<'a> OrgProfile<'a> {
    fn analyze(history: &'a OrganizationHistory) -> Option<Self> {
        if !history.is_analyzable() {
            return None;
        }
        let frequency = month_frequency(&history.postings);
        let max_frequency = frequency.iter().copied().max().unwrap_or(0);
        Some(Self {
            history,
            pattern: detect_pattern(&history.postings),
            frequency,
            max_frequency,
        })
    }

    /// Prediction for `target`, if it clears the emission threshold.
    fn predict(&self, target: YearMonth) -> Option<Prediction> {
        let postings = &self.history.postings;
        let last_year = target.previous_year();
        let last_year_same_month = postings.iter().any(|p| p.month == last_year);

        let inputs = ScoreInputs {
            last_year_same_month,
            month_frequency: self.frequency[target.month() as usize],
            max_month_frequency: self.max_frequency,
            pattern_matched: is_pattern_match(self.pattern, target.month(), postings),
            historical_count: postings.len(),
        };
        let confidence = score_confidence(&inputs);
        if !is_emittable(confidence) {
            return None;
        }

        Some(Prediction {
            org_name: self.history.org_name.clone(),
            predicted_month: target,
            confidence: round_confidence(confidence),
            confidence_level: ConfidenceLevel::from_confidence(confidence),
            based_on: BasedOn {
                historical_count: postings.len(),
                last_year_same_month,
                periodic_pattern: self.pattern,
            },
            evidence_jobs: None,
        })
    }
}

fn by_month_then_confidence(a: &Prediction, b: &Prediction) -> Ordering {
    a.predicted_month
        .cmp(&b.predicted_month)
        .then_with(|| b.confidence.total_cmp(&a.confidence))
        .then_with(|| a.org_name.cmp(&b.org_name))
}

fn by_confidence_then_month(a: &Prediction, b: &Prediction) -> Ordering {
    b.confidence
        .total_cmp(&a.confidence)
        .then_with(|| a.predicted_month.cmp(&b.predicted_month))
        .then_with(|| a.org_name.cmp(&b.org_name))
}

/// Forecast the `window` months after `now` for every organization.
///
/// Ordered by predicted month ascending, then confidence descending.
pub fn generate_forecasts(
    histories: &[OrganizationHistory],
    window: ForecastWindow,
    now: YearMonth,
) -> Vec<Prediction> {
    let targets = window.future_months(now);

    let mut predictions: Vec<Prediction> = histories
        .iter()
        .filter_map(OrgProfile::analyze)
        .flat_map(|profile| {
            targets
                .iter()
                .filter_map(|target| profile.predict(*target))
                .collect::<Vec<_>>()
        })
        .collect();
    predictions.sort_by(by_month_then_confidence);

    debug!(
        organizations = histories.len(),
        window = window.months(),
        emitted = predictions.len(),
        "generated forecasts"
    );
    predictions
}

/// Forecast `window` months starting at the current month, citing evidence.
///
/// Ordered by confidence descending across all months, ready for top-N
/// truncation by the caller.
pub fn generate_forecasts_with_evidence(
    histories: &[OrganizationHistory],
    window: ForecastWindow,
    now: YearMonth,
) -> Vec<Prediction> {
    let targets = window.months_from_current(now);

    let mut predictions: Vec<Prediction> = Vec::new();
    for profile in histories.iter().filter_map(OrgProfile::analyze) {
        for target in &targets {
            if let Some(mut prediction) = profile.predict(*target) {
                prediction.evidence_jobs = Some(collect_evidence(
                    &profile.history.postings,
                    *target,
                    EvidenceLimits::unlimited(),
                ));
                predictions.push(prediction);
            }
        }
    }
    predictions.sort_by(by_confidence_then_month);

    debug!(
        organizations = histories.len(),
        window = window.months(),
        emitted = predictions.len(),
        "generated evidence forecasts"
    );
    predictions
}
