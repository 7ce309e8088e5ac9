//! Infrastructure layer: history sources, record classifiers, background refresh.

pub mod classify;
pub mod forecast_runner;
pub mod history;

pub use forecast_runner::{
    ForecastRunner, ForecastRunnerHandle, ForecastSink, ForecastSnapshot, InMemoryForecastSink,
};
pub use history::{
    DEFAULT_LOOKBACK_YEARS, DEFAULT_PATTERN_LIMIT, HistoryError, HistoryOptions, HistoryProvider,
    InMemoryHistoryProvider, JobRecord, MAX_PATTERN_LIMIT, OrganizationPattern,
    PostgresHistoryProvider, group_histories, organization_history, organization_patterns,
    resolve_org_name,
};
