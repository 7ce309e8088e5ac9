//! Posting-history providers feeding the forecast engine.
//!
//! Providers own the upstream data contract: records without an
//! organization or a start date are dropped here, before postings reach the
//! engine, and only the lookback window is returned.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use hirecast_core::YearMonth;
use hirecast_predictions::{MIN_POSTINGS, OrganizationHistory, Posting};

use crate::classify::{
    DutyCategory, EmploymentType, classify_duties, classify_employment, is_internship,
};

pub mod in_memory;
pub mod patterns;
pub mod postgres;

pub use in_memory::InMemoryHistoryProvider;
pub use patterns::{
    DEFAULT_PATTERN_LIMIT, MAX_PATTERN_LIMIT, OrganizationPattern, organization_patterns,
};
pub use postgres::PostgresHistoryProvider;

/// Default lookback window.
pub const DEFAULT_LOOKBACK_YEARS: u32 = 3;

/// A persisted job posting as stored upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    pub org_name: Option<String>,
    pub title: String,
    pub apply_start_at: Option<DateTime<Utc>>,
    /// Free-text duty description, input to [`classify_duties`].
    #[serde(default)]
    pub duties_text: Option<String>,
    /// Upstream hire-type label (e.g. "정규직", "청년인턴(체험형)").
    #[serde(default)]
    pub hire_type: Option<String>,
}

impl JobRecord {
    pub fn duty_categories(&self) -> BTreeSet<DutyCategory> {
        classify_duties(self.duties_text.as_deref())
    }

    pub fn employment_type(&self) -> EmploymentType {
        classify_employment(self.hire_type.as_deref())
    }

    pub fn is_internship(&self) -> bool {
        is_internship(Some(&self.title), self.hire_type.as_deref())
    }
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("history source unavailable: {0}")]
    Unavailable(String),
}

/// How raw records are cut into histories.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HistoryOptions {
    pub lookback_years: u32,
    /// Zone used to derive a posting's calendar month from its start timestamp.
    pub utc_offset: FixedOffset,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self {
            lookback_years: DEFAULT_LOOKBACK_YEARS,
            utc_offset: Utc.fix(),
        }
    }
}

impl HistoryOptions {
    /// First month still inside the lookback window relative to `now`.
    pub fn since(&self, now: YearMonth) -> YearMonth {
        now.add_months(-(self.lookback_years as i32) * 12)
    }

    fn month_of(&self, at: &DateTime<Utc>) -> YearMonth {
        YearMonth::from_datetime(&at.with_timezone(&self.utc_offset))
    }

    /// Record has an organization and a start date inside the window.
    fn is_usable(&self, record: &JobRecord, since: YearMonth) -> bool {
        let has_org = record
            .org_name
            .as_deref()
            .is_some_and(|org| !org.trim().is_empty());
        has_org
            && record
                .apply_start_at
                .as_ref()
                .is_some_and(|at| self.month_of(at) >= since)
    }
}

/// Source of per-organization posting histories.
pub trait HistoryProvider: Send + Sync + 'static {
    /// Every organization with at least two postings in the lookback window.
    fn histories(&self, now: YearMonth) -> Result<Vec<OrganizationHistory>, HistoryError>;

    /// History of the organization best matching `org_name` (see
    /// [`resolve_org_name`]); `None` when nothing matches or the match has
    /// fewer than two postings.
    fn organization(
        &self,
        org_name: &str,
        now: YearMonth,
    ) -> Result<Option<OrganizationHistory>, HistoryError>;

    /// Per-organization posting summaries, largest posters first.
    fn organization_patterns(
        &self,
        now: YearMonth,
        limit: usize,
    ) -> Result<Vec<OrganizationPattern>, HistoryError>;
}

impl<S> HistoryProvider for Arc<S>
where
    S: HistoryProvider + ?Sized,
{
    fn histories(&self, now: YearMonth) -> Result<Vec<OrganizationHistory>, HistoryError> {
        (**self).histories(now)
    }

    fn organization(
        &self,
        org_name: &str,
        now: YearMonth,
    ) -> Result<Option<OrganizationHistory>, HistoryError> {
        (**self).organization(org_name, now)
    }

    fn organization_patterns(
        &self,
        now: YearMonth,
        limit: usize,
    ) -> Result<Vec<OrganizationPattern>, HistoryError> {
        (**self).organization_patterns(now, limit)
    }
}

/// Group raw records into per-organization histories.
///
/// - drops records missing an organization name or a start date
/// - drops postings before `since`
/// - sorts organizations by name and each history chronologically
/// - keeps only organizations with at least two postings
pub fn group_histories<'a, I>(
    records: I,
    since: YearMonth,
    options: &HistoryOptions,
) -> Vec<OrganizationHistory>
where
    I: IntoIterator<Item = &'a JobRecord>,
{
    let mut by_org: BTreeMap<&str, Vec<Posting>> = BTreeMap::new();

    for record in records {
        if !options.is_usable(record, since) {
            continue;
        }
        let (Some(org_name), Some(start)) = (record.org_name.as_deref(), record.apply_start_at.as_ref())
        else {
            continue;
        };
        let month = options.month_of(start);
        by_org
            .entry(org_name)
            .or_default()
            .push(Posting::new(month).with_job(record.id.clone(), record.title.clone()));
    }

    by_org
        .into_iter()
        .filter(|(_, postings)| postings.len() >= MIN_POSTINGS)
        .map(|(org_name, mut postings)| {
            postings.sort_by_key(|p| p.month);
            OrganizationHistory::new(org_name, postings)
        })
        .collect()
}

/// Resolve a free-text organization query to one stored name.
///
/// Matching is a case-insensitive substring search over `records`. The
/// name with the most matching records wins; ties prefer an exact
/// (case-insensitive) match, then the lexically smaller name.
pub fn resolve_org_name<'a, I>(records: I, query: &str) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a JobRecord>,
{
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    let mut counts: BTreeMap<&'a str, usize> = BTreeMap::new();
    for record in records {
        let Some(org_name) = record.org_name.as_deref() else {
            continue;
        };
        if org_name.to_lowercase().contains(&needle) {
            *counts.entry(org_name).or_default() += 1;
        }
    }

    counts
        .into_iter()
        .max_by(|(a_name, a_count), (b_name, b_count)| {
            let a_exact = a_name.to_lowercase() == needle;
            let b_exact = b_name.to_lowercase() == needle;
            a_count
                .cmp(b_count)
                .then_with(|| a_exact.cmp(&b_exact))
                .then_with(|| b_name.cmp(a_name))
        })
        .map(|(name, _)| name)
}

/// History for the organization a partial name resolves to.
pub fn organization_history(
    records: &[JobRecord],
    query: &str,
    since: YearMonth,
    options: &HistoryOptions,
) -> Option<OrganizationHistory> {
    let usable: Vec<&JobRecord> = records
        .iter()
        .filter(|r| options.is_usable(r, since))
        .collect();
    let org_name = resolve_org_name(usable.iter().copied(), query)?;

    group_histories(
        usable
            .iter()
            .copied()
            .filter(|r| r.org_name.as_deref() == Some(org_name)),
        since,
        options,
    )
    .into_iter()
    .next()
}
