//! Per-organization posting summaries for the explanatory stats view.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use hirecast_core::YearMonth;
use hirecast_predictions::{MIN_POSTINGS, Posting, typical_months};

use super::{HistoryOptions, JobRecord};
use crate::classify::DutyCategory;

pub const DEFAULT_PATTERN_LIMIT: usize = 20;
pub const MAX_PATTERN_LIMIT: usize = 100;

const SECONDS_PER_YEAR: f64 = 365.25 * 24.0 * 60.0 * 60.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationPattern {
    pub org_name: String,
    pub total_jobs: usize,
    /// Jobs per year over the observed span (at least one year), one decimal.
    pub avg_per_year: f64,
    pub typical_months: Vec<u32>,
    pub last_posted_at: DateTime<Utc>,
    pub most_recent_title: Option<String>,
    pub internship_jobs: usize,
    /// Union of classified duties; `OTHER` only when nothing else matched.
    pub duty_categories: BTreeSet<DutyCategory>,
}

/// Summaries for organizations with at least two postings since `since`,
/// sorted by `total_jobs` descending (then name). `limit` is clamped to
/// `1..=MAX_PATTERN_LIMIT`.
pub fn organization_patterns(
    records: &[JobRecord],
    since: YearMonth,
    options: &HistoryOptions,
    limit: usize,
) -> Vec<OrganizationPattern> {
    let mut by_org: BTreeMap<&str, Vec<(&JobRecord, DateTime<Utc>)>> = BTreeMap::new();
    for record in records.iter().filter(|r| options.is_usable(r, since)) {
        if let (Some(org_name), Some(at)) = (record.org_name.as_deref(), record.apply_start_at) {
            by_org.entry(org_name).or_default().push((record, at));
        }
    }

    let mut patterns: Vec<OrganizationPattern> = by_org
        .into_iter()
        .filter(|(_, jobs)| jobs.len() >= MIN_POSTINGS)
        .filter_map(|(org_name, mut jobs)| {
            jobs.sort_by_key(|(_, at)| *at);
            summarize(org_name, &jobs, options)
        })
        .collect();

    patterns.sort_by(|a, b| {
        b.total_jobs
            .cmp(&a.total_jobs)
            .then_with(|| a.org_name.cmp(&b.org_name))
    });
    patterns.truncate(limit.clamp(1, MAX_PATTERN_LIMIT));
    patterns
}

/// `jobs` is non-empty and chronological.
fn summarize(
    org_name: &str,
    jobs: &[(&JobRecord, DateTime<Utc>)],
    options: &HistoryOptions,
) -> Option<OrganizationPattern> {
    let (first, last) = (jobs.first()?, jobs.last()?);

    let postings: Vec<Posting> = jobs
        .iter()
        .map(|(_, at)| Posting::new(options.month_of(at)))
        .collect();

    let span_years = ((last.1 - first.1).num_seconds() as f64 / SECONDS_PER_YEAR).max(1.0);
    let avg_per_year = (jobs.len() as f64 / span_years * 10.0).round() / 10.0;

    let mut duty_categories: BTreeSet<DutyCategory> =
        jobs.iter().flat_map(|(r, _)| r.duty_categories()).collect();
    if duty_categories.len() > 1 {
        duty_categories.remove(&DutyCategory::Other);
    }

    let title = last.0.title.trim();
    Some(OrganizationPattern {
        org_name: org_name.to_string(),
        total_jobs: jobs.len(),
        avg_per_year,
        typical_months: typical_months(&postings),
        last_posted_at: last.1,
        most_recent_title: (!title.is_empty()).then(|| title.to_string()),
        internship_jobs: jobs.iter().filter(|(r, _)| r.is_internship()).count(),
        duty_categories,
    })
}
