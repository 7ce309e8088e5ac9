//! Evidence selection: which historical postings justify a forecast.
//!
//! Priority order:
//! 1. postings exactly one year before the target month (`same_month_last_year`)
//! 2. postings in the target's month number in any other year (`periodic_pattern`)
//! 3. everything else, most recent first (`high_frequency`)
//!
//! Entries are deduplicated by job id; postings without a job id are never cited.

use std::collections::HashSet;

use hirecast_core::YearMonth;

use crate::posting::Posting;
use crate::prediction::{Evidence, MatchReason};

/// Optional caps applied while collecting evidence.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct EvidenceLimits {
    pub per_reason: Option<usize>,
    pub total: Option<usize>,
}

impl EvidenceLimits {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn capped(per_reason: usize, total: usize) -> Self {
        Self {
            per_reason: Some(per_reason),
            total: Some(total),
        }
    }
}

fn reason_for(posting: &Posting, target: YearMonth) -> MatchReason {
    if posting.month == target.previous_year() {
        MatchReason::SameMonthLastYear
    } else if posting.month_number() == target.month() {
        MatchReason::PeriodicPattern
    } else {
        MatchReason::HighFrequency
    }
}

/// Evidence for a forecast of `target`, strongest first.
pub fn collect_evidence(
    postings: &[Posting],
    target: YearMonth,
    limits: EvidenceLimits,
) -> Vec<Evidence> {
    let mut by_reason: [(MatchReason, Vec<&Posting>); 3] = [
        (MatchReason::SameMonthLastYear, Vec::new()),
        (MatchReason::PeriodicPattern, Vec::new()),
        (MatchReason::HighFrequency, Vec::new()),
    ];
    for posting in postings {
        let slot = match reason_for(posting, target) {
            MatchReason::SameMonthLastYear => 0,
            MatchReason::PeriodicPattern => 1,
            MatchReason::HighFrequency => 2,
        };
        by_reason[slot].1.push(posting);
    }
    by_reason[2].1.sort_by(|a, b| b.month.cmp(&a.month));

    let total = limits.total.unwrap_or(usize::MAX);
    let per_reason = limits.per_reason.unwrap_or(usize::MAX);

    let mut cited: HashSet<&str> = HashSet::new();
    let mut evidence = Vec::new();

    for (reason, candidates) in &by_reason {
        let mut taken = 0;
        for posting in candidates {
            if evidence.len() >= total || taken >= per_reason {
                break;
            }
            let Some(job_id) = posting.job_id.as_deref() else {
                continue;
            };
            if !cited.insert(job_id) {
                continue;
            }
            evidence.push(Evidence {
                job_id: job_id.to_string(),
                title: posting.title.clone().unwrap_or_default(),
                posted_month: posting.month,
                match_reason: *reason,
            });
            taken += 1;
        }
    }

    evidence
}
