use std::collections::HashSet;

use hirecast_core::YearMonth;

use crate::forecast::{generate_forecasts, generate_forecasts_with_evidence};
use crate::posting::OrganizationHistory;
use crate::prediction::{NextPosting, Prediction};
use crate::predictor::predict_next;
use crate::result::{PredictionError, PredictionResult};
use crate::window::ForecastWindow;

/// A self-contained engine invocation.
///
/// Jobs consume history snapshots supplied by callers (infra/API) and stay
/// storage-agnostic. `now` is captured at construction, so running a job
/// twice yields identical output.
pub trait PredictionJob: Send + Sync + 'static {
    type Input: Send + Sync + 'static;
    type Output: Send + 'static;

    /// Stable label for logs.
    fn kind(&self) -> &'static str;

    /// The snapshot the job will run on.
    fn input(&self) -> &Self::Input;

    /// Execute the forecast. Errors are reserved for malformed job input;
    /// "no forecast" is an empty output.
    fn run(&self) -> PredictionResult<Self::Output>;
}

fn ensure_unique_orgs(histories: &[OrganizationHistory]) -> PredictionResult<()> {
    let mut seen = HashSet::new();
    for history in histories {
        if !seen.insert(history.org_name.as_str()) {
            return Err(PredictionError::InvalidInput(format!(
                "organization {:?} appears in more than one history",
                history.org_name
            )));
        }
    }
    Ok(())
}

/// Plain forecasts over the months after `now`.
#[derive(Debug, Clone)]
pub struct BatchForecastJob {
    histories: Vec<OrganizationHistory>,
    window: ForecastWindow,
    now: YearMonth,
}

impl BatchForecastJob {
    pub fn new(histories: Vec<OrganizationHistory>, now: YearMonth) -> Self {
        Self {
            histories,
            window: ForecastWindow::default(),
            now,
        }
    }

    pub fn with_window(mut self, window: ForecastWindow) -> Self {
        self.window = window;
        self
    }
}

impl PredictionJob for BatchForecastJob {
    type Input = Vec<OrganizationHistory>;
    type Output = Vec<Prediction>;

    fn kind(&self) -> &'static str {
        "forecast.batch"
    }

    fn input(&self) -> &Self::Input {
        &self.histories
    }

    fn run(&self) -> PredictionResult<Self::Output> {
        ensure_unique_orgs(&self.histories)?;
        Ok(generate_forecasts(&self.histories, self.window, self.now))
    }
}

/// Evidence forecasts starting at the current month.
#[derive(Debug, Clone)]
pub struct EvidenceForecastJob {
    histories: Vec<OrganizationHistory>,
    window: ForecastWindow,
    now: YearMonth,
}

impl EvidenceForecastJob {
    pub fn new(histories: Vec<OrganizationHistory>, now: YearMonth) -> Self {
        Self {
            histories,
            window: ForecastWindow::extended_default(),
            now,
        }
    }

    pub fn with_window(mut self, window: ForecastWindow) -> Self {
        self.window = window;
        self
    }
}

impl PredictionJob for EvidenceForecastJob {
    type Input = Vec<OrganizationHistory>;
    type Output = Vec<Prediction>;

    fn kind(&self) -> &'static str {
        "forecast.evidence"
    }

    fn input(&self) -> &Self::Input {
        &self.histories
    }

    fn run(&self) -> PredictionResult<Self::Output> {
        ensure_unique_orgs(&self.histories)?;
        Ok(generate_forecasts_with_evidence(&self.histories, self.window, self.now))
    }
}

/// Next-posting forecast for one organization.
#[derive(Debug, Clone)]
pub struct NextPostingJob {
    history: OrganizationHistory,
    now: YearMonth,
}

impl NextPostingJob {
    pub fn new(history: OrganizationHistory, now: YearMonth) -> Self {
        Self { history, now }
    }
}

impl PredictionJob for NextPostingJob {
    type Input = OrganizationHistory;
    type Output = Option<NextPosting>;

    fn kind(&self) -> &'static str {
        "forecast.next_posting"
    }

    fn input(&self) -> &Self::Input {
        &self.history
    }

    fn run(&self) -> PredictionResult<Self::Output> {
        if self.history.org_name.trim().is_empty() {
            return Err(PredictionError::InvalidInput(
                "organization name must not be empty".to_string(),
            ));
        }
        Ok(predict_next(&self.history.org_name, &self.history.postings, self.now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posting::Posting;

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    fn annual(org: &str) -> OrganizationHistory {
        OrganizationHistory::new(
            org,
            vec![
                Posting::new(ym(2023, 3)),
                Posting::new(ym(2024, 3)),
                Posting::new(ym(2025, 3)),
            ],
        )
    }

    #[test]
    fn batch_job_matches_direct_call() {
        let histories = vec![annual("A"), annual("B")];
        let job = BatchForecastJob::new(histories.clone(), ym(2026, 1));
        assert_eq!(job.kind(), "forecast.batch");
        assert_eq!(job.input().len(), 2);
        assert_eq!(
            job.run().unwrap(),
            generate_forecasts(&histories, ForecastWindow::default(), ym(2026, 1))
        );
    }

    #[test]
    fn duplicate_organizations_are_rejected() {
        let job = EvidenceForecastJob::new(vec![annual("A"), annual("A")], ym(2026, 1));
        assert!(matches!(job.run(), Err(PredictionError::InvalidInput(_))));
    }

    #[test]
    fn evidence_job_uses_extended_window_by_default() {
        let job = EvidenceForecastJob::new(vec![annual("A")], ym(2025, 6));
        // March 2026 sits 9 months out, inside the 10-month default window.
        let out = job.run().unwrap();
        assert!(out.iter().any(|p| p.predicted_month == ym(2026, 3)));

        let narrow = EvidenceForecastJob::new(vec![annual("A")], ym(2025, 6))
            .with_window(ForecastWindow::new(3).unwrap());
        assert!(narrow.run().unwrap().is_empty());
    }

    #[test]
    fn next_posting_job_requires_a_name() {
        let job = NextPostingJob::new(annual(" "), ym(2026, 1));
        assert!(job.run().is_err());

        let job = NextPostingJob::new(annual("A"), ym(2026, 1));
        let next = job.run().unwrap().unwrap();
        assert_eq!(next.predicted_month, ym(2026, 3));
    }
}
