use std::sync::Arc;

use hirecast_core::{Clock, YearMonth};
use hirecast_infra::{ForecastSnapshot, HistoryProvider, InMemoryForecastSink, OrganizationPattern};
use hirecast_predictions::OrganizationHistory;

use crate::app::errors::ServiceError;

/// Handles shared by every request.
#[derive(Clone)]
pub struct AppServices {
    provider: Arc<dyn HistoryProvider>,
    clock: Arc<dyn Clock>,
    forecast_cache: Option<Arc<InMemoryForecastSink>>,
}

impl AppServices {
    pub fn new(provider: Arc<dyn HistoryProvider>, clock: Arc<dyn Clock>) -> Self {
        Self {
            provider,
            clock,
            forecast_cache: None,
        }
    }

    /// Serve extended forecasts from the refresh runner's latest snapshot.
    pub fn with_forecast_cache(mut self, sink: Arc<InMemoryForecastSink>) -> Self {
        self.forecast_cache = Some(sink);
        self
    }

    pub fn clock(&self) -> &dyn Clock {
        &*self.clock
    }

    /// Cached snapshot, only if it was computed for `month`.
    pub fn cached_forecasts(&self, month: YearMonth) -> Option<ForecastSnapshot> {
        self.forecast_cache
            .as_ref()
            .and_then(|sink| sink.latest())
            .filter(|snapshot| snapshot.anchor_month == month)
    }

    /// All analyzable histories. Providers may block, so this runs on the blocking pool.
    pub async fn histories(&self, now: YearMonth) -> Result<Vec<OrganizationHistory>, ServiceError> {
        let provider = self.provider.clone();
        let histories = tokio::task::spawn_blocking(move || provider.histories(now)).await??;
        Ok(histories)
    }

    pub async fn organization(
        &self,
        org_name: String,
        now: YearMonth,
    ) -> Result<Option<OrganizationHistory>, ServiceError> {
        let provider = self.provider.clone();
        let history =
            tokio::task::spawn_blocking(move || provider.organization(&org_name, now)).await??;
        Ok(history)
    }

    pub async fn organization_patterns(
        &self,
        now: YearMonth,
        limit: usize,
    ) -> Result<Vec<OrganizationPattern>, ServiceError> {
        let provider = self.provider.clone();
        let patterns =
            tokio::task::spawn_blocking(move || provider.organization_patterns(now, limit)).await??;
        Ok(patterns)
    }
}
