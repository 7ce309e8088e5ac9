//! Single-organization "when will they post next?" predictor.

use hirecast_core::YearMonth;

use crate::evidence::{EvidenceLimits, collect_evidence};
use crate::pattern::detect_pattern;
use crate::posting::{MIN_POSTINGS, Posting};
use crate::prediction::NextPosting;
use crate::scoring::{
    ConfidenceLevel, MAX_CONFIDENCE, data_volume_bonus, round_confidence,
};

/// Base confidence when a typical month is still ahead this year.
pub const TYPICAL_MONTH_BASE: f64 = 0.45;
/// Base confidence when the forecast rolls over into next year.
pub const NEXT_YEAR_BASE: f64 = 0.40;
/// Base confidence when projecting along a detected pattern.
pub const PATTERN_BASE: f64 = 0.55;
/// Extra confidence granted for a detected pattern.
pub const PATTERN_PROJECTION_BONUS: f64 = 0.15;

/// Number of month numbers kept as an organization's typical months.
pub const TYPICAL_MONTH_COUNT: usize = 4;

const EVIDENCE_PER_REASON: usize = 2;
const EVIDENCE_TOTAL: usize = 3;

/// The most frequent month numbers, ascending.
///
/// Ties keep first-appearance order before the final sort.
pub fn typical_months(postings: &[Posting]) -> Vec<u32> {
    let mut counts: Vec<(u32, usize)> = Vec::new();
    for posting in postings {
        let month = posting.month_number();
        match counts.iter_mut().find(|(m, _)| *m == month) {
            Some((_, n)) => *n += 1,
            None => counts.push((month, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    let mut months: Vec<u32> = counts
        .into_iter()
        .take(TYPICAL_MONTH_COUNT)
        .map(|(m, _)| m)
        .collect();
    months.sort_unstable();
    months
}

/// Best single forecast for one organization, or `None` with fewer than
/// two postings.
pub fn predict_next(org_name: &str, postings: &[Posting], now: YearMonth) -> Option<NextPosting> {
    if postings.len() < MIN_POSTINGS {
        return None;
    }

    let pattern = detect_pattern(postings);
    let typical = typical_months(postings);
    let bonus = data_volume_bonus(postings.len());

    let (predicted_month, confidence) = match pattern {
        None => match typical.iter().find(|m| **m > now.month()) {
            Some(month) => (YearMonth::new(now.year(), *month).ok()?, TYPICAL_MONTH_BASE + bonus),
            None => {
                let first = *typical.first()?;
                (YearMonth::new(now.year() + 1, first).ok()?, NEXT_YEAR_BASE + bonus)
            }
        },
        Some(pattern) => {
            let latest = postings.iter().map(|p| p.month).max()?;
            let mut predicted = latest.add_months(pattern.interval_months());
            while predicted <= now {
                predicted = predicted.add_months(pattern.interval_months());
            }
            (predicted, PATTERN_BASE + bonus + PATTERN_PROJECTION_BONUS)
        }
    };
    let confidence = confidence.min(MAX_CONFIDENCE);

    Some(NextPosting {
        org_name: org_name.to_string(),
        predicted_month,
        confidence: round_confidence(confidence),
        confidence_level: ConfidenceLevel::from_confidence(confidence),
        periodic_pattern: pattern,
        typical_months: typical,
        evidence_jobs: collect_evidence(
            postings,
            predicted_month,
            EvidenceLimits::capped(EVIDENCE_PER_REASON, EVIDENCE_TOTAL),
        ),
    })
}
