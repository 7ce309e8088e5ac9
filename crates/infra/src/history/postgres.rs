//! Postgres-backed history provider.
//!
//! Reads the `job_postings` table:
//!
//! ```sql
//! job_postings(id uuid | text, org_name text, title text, apply_start_at timestamptz,
//!              duties_text text, hire_type text)
//! ```
//!
//! The trait is synchronous, so queries are driven through a captured tokio
//! runtime handle. Call it from a blocking context (`spawn_blocking`, the
//! forecast runner thread), never directly from an async task.

use std::sync::Arc;

use chrono::{DateTime, NaiveTime, Utc};
use sqlx::{PgPool, Row};
use tokio::runtime::Handle;
use tracing::debug;

use hirecast_core::YearMonth;
use hirecast_predictions::OrganizationHistory;

use super::{
    HistoryError, HistoryOptions, HistoryProvider, JobRecord, OrganizationPattern, group_histories,
    organization_history, organization_patterns,
};

pub struct PostgresHistoryProvider {
    pool: Arc<PgPool>,
    handle: Handle,
    options: HistoryOptions,
}

impl PostgresHistoryProvider {
    /// Create a provider bound to the current tokio runtime.
    pub fn new(pool: PgPool, options: HistoryOptions) -> Result<Self, HistoryError> {
        let handle = Handle::try_current()
            .map_err(|e| HistoryError::Unavailable(format!("no tokio runtime: {e}")))?;
        Ok(Self {
            pool: Arc::new(pool),
            handle,
            options,
        })
    }

    pub fn options(&self) -> &HistoryOptions {
        &self.options
    }

    /// Start of the lookback window as a UTC instant.
    fn since_instant(&self, since: YearMonth) -> Result<DateTime<Utc>, HistoryError> {
        since
            .first_day()
            .ok()
            .and_then(|d| d.and_time(NaiveTime::MIN).and_local_timezone(self.options.utc_offset).single())
            .map(|at| at.with_timezone(&Utc))
            .ok_or_else(|| HistoryError::Unavailable(format!("invalid lookback start {since}")))
    }

    /// `org_query` narrows rows to names containing it (case-insensitive).
    fn fetch(&self, since: YearMonth, org_query: Option<&str>) -> Result<Vec<JobRecord>, HistoryError> {
        let since_at = self.since_instant(since)?;
        let pool = self.pool.clone();
        let org_pattern = org_query.map(like_pattern);

        let rows = self.handle.block_on(async move {
            match org_pattern {
                Some(pattern) => {
                    sqlx::query(
                        r#"
                        SELECT id::text AS id, org_name, title, apply_start_at, duties_text, hire_type
                        FROM job_postings
                        WHERE apply_start_at IS NOT NULL
                          AND apply_start_at >= $1
                          AND org_name ILIKE $2
                        "#,
                    )
                    .bind(since_at)
                    .bind(pattern)
                    .fetch_all(&*pool)
                    .await
                }
                None => {
                    sqlx::query(
                        r#"
                        SELECT id::text AS id, org_name, title, apply_start_at, duties_text, hire_type
                        FROM job_postings
                        WHERE apply_start_at IS NOT NULL
                          AND apply_start_at >= $1
                        "#,
                    )
                    .bind(since_at)
                    .fetch_all(&*pool)
                    .await
                }
            }
        })?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(JobRecord {
                id: row.try_get("id")?,
                org_name: row.try_get("org_name")?,
                title: row.try_get::<Option<String>, _>("title")?.unwrap_or_default(),
                apply_start_at: row.try_get("apply_start_at")?,
                duties_text: row.try_get("duties_text")?,
                hire_type: row.try_get("hire_type")?,
            });
        }

        debug!(count = records.len(), since = %since, "loaded job posting records");
        Ok(records)
    }
}

impl HistoryProvider for PostgresHistoryProvider {
    fn histories(&self, now: YearMonth) -> Result<Vec<OrganizationHistory>, HistoryError> {
        let since = self.options.since(now);
        let records = self.fetch(since, None)?;
        Ok(group_histories(&records, since, &self.options))
    }

    fn organization(
        &self,
        org_name: &str,
        now: YearMonth,
    ) -> Result<Option<OrganizationHistory>, HistoryError> {
        let since = self.options.since(now);
        let records = self.fetch(since, Some(org_name))?;
        Ok(organization_history(&records, org_name, since, &self.options))
    }

    fn organization_patterns(
        &self,
        now: YearMonth,
        limit: usize,
    ) -> Result<Vec<OrganizationPattern>, HistoryError> {
        let since = self.options.since(now);
        let records = self.fetch(since, None)?;
        Ok(organization_patterns(&records, since, &self.options, limit))
    }
}

/// `%query%` for `ILIKE`, with LIKE metacharacters escaped (backslash is the default escape).
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.trim().chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_wraps_and_escapes() {
        assert_eq!(like_pattern("한국전력"), "%한국전력%");
        assert_eq!(like_pattern(" KEPCO "), "%KEPCO%");
        assert_eq!(like_pattern("100%_a\\b"), "%100\\%\\_a\\\\b%");
    }
}
