//! Periodicity detection over an organization's posting history.
//!
//! Model:
//! - Sort postings chronologically and take month deltas between neighbours.
//! - Reject histories whose deltas are too dispersed (`std / mean > 0.6`).
//! - Bucket the mean delta into quarterly / semiannual / annual.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::posting::Posting;

/// Coefficient of variation above which intervals are treated as irregular.
pub const MAX_INTERVAL_DISPERSION: f64 = 0.6;

/// Coarse re-posting cadence. "No pattern" is `Option::None`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodicPattern {
    Quarterly,
    Semiannual,
    Annual,
}

impl PeriodicPattern {
    /// Step used when projecting the next posting from the latest one.
    pub fn interval_months(&self) -> i32 {
        match self {
            PeriodicPattern::Quarterly => 3,
            PeriodicPattern::Semiannual => 6,
            PeriodicPattern::Annual => 12,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodicPattern::Quarterly => "quarterly",
            PeriodicPattern::Semiannual => "semiannual",
            PeriodicPattern::Annual => "annual",
        }
    }

    fn from_mean_interval(mean: f64) -> Option<Self> {
        if (2.0..=4.0).contains(&mean) {
            Some(PeriodicPattern::Quarterly)
        } else if (5.0..=8.0).contains(&mean) {
            Some(PeriodicPattern::Semiannual)
        } else if (9.0..=15.0).contains(&mean) {
            Some(PeriodicPattern::Annual)
        } else {
            None
        }
    }
}

impl core::fmt::Display for PeriodicPattern {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Positive month gaps between chronologically adjacent postings.
///
/// Same-month duplicates produce a zero gap and are dropped.
pub fn intervals(postings: &[Posting]) -> Vec<i64> {
    let mut months: Vec<_> = postings.iter().map(|p| p.month).collect();
    months.sort();

    months
        .windows(2)
        .map(|pair| pair[1].months_since(&pair[0]))
        .filter(|delta| *delta > 0)
        .collect()
}

/// Detect a roughly fixed re-posting interval.
///
/// Never fails: an irregular or too-short history is simply `None`.
pub fn detect_pattern(postings: &[Posting]) -> Option<PeriodicPattern> {
    let intervals = intervals(postings);
    if intervals.is_empty() {
        return None;
    }

    let n = intervals.len() as f64;
    let mean = intervals.iter().sum::<i64>() as f64 / n;
    let variance = intervals
        .iter()
        .map(|i| {
            let d = *i as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    let std_dev = variance.sqrt();

    if mean > 0.0 && std_dev / mean > MAX_INTERVAL_DISPERSION {
        return None;
    }

    PeriodicPattern::from_mean_interval(mean)
}

/// Whether `target_month` (1..=12) fits the detected pattern, judged only
/// against the organization's own historical month numbers.
pub fn is_pattern_match(
    pattern: Option<PeriodicPattern>,
    target_month: u32,
    postings: &[Posting],
) -> bool {
    let historical: BTreeSet<u32> = postings.iter().map(Posting::month_number).collect();

    match pattern {
        Some(PeriodicPattern::Quarterly) => {
            let target_quarter = target_month.div_ceil(3);
            historical.iter().any(|m| m.div_ceil(3) == target_quarter)
        }
        Some(PeriodicPattern::Semiannual) => historical
            .iter()
            .any(|m| matches!(m.abs_diff(target_month), 0 | 6)),
        Some(PeriodicPattern::Annual) => historical.contains(&target_month),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hirecast_core::YearMonth;
    use proptest::prelude::*;

    fn postings(months: &[(i32, u32)]) -> Vec<Posting> {
        months
            .iter()
            .map(|(y, m)| Posting::new(YearMonth::new(*y, *m).unwrap()))
            .collect()
    }

    #[test]
    fn same_month_every_year_is_annual() {
        let history = postings(&[(2023, 3), (2024, 3), (2025, 3)]);
        assert_eq!(detect_pattern(&history), Some(PeriodicPattern::Annual));
    }

    #[test]
    fn every_three_months_is_quarterly() {
        let history = postings(&[(2024, 1), (2024, 4), (2024, 7), (2024, 10)]);
        assert_eq!(detect_pattern(&history), Some(PeriodicPattern::Quarterly));
    }

    #[test]
    fn single_five_month_gap_is_semiannual() {
        let history = postings(&[(2024, 2), (2024, 7)]);
        assert_eq!(intervals(&history), vec![5]);
        assert_eq!(detect_pattern(&history), Some(PeriodicPattern::Semiannual));
    }

    #[test]
    fn erratic_gaps_have_no_pattern() {
        // gaps: 1, 11, 2, 9
        let history = postings(&[(2023, 1), (2023, 2), (2024, 1), (2024, 3), (2024, 12)]);
        assert_eq!(intervals(&history), vec![1, 11, 2, 9]);
        assert_eq!(detect_pattern(&history), None);
    }

    #[test]
    fn dispersion_rejects_even_when_mean_sits_in_a_bucket() {
        // gaps 1, 1, 10 -> mean 4 (quarterly range), std/mean ~ 1.06
        let history = postings(&[(2024, 1), (2024, 2), (2024, 3), (2025, 1)]);
        assert_eq!(detect_pattern(&history), None);
    }

    #[test]
    fn same_month_duplicates_are_ignored() {
        let history = postings(&[(2024, 5), (2024, 5), (2024, 5)]);
        assert!(intervals(&history).is_empty());
        assert_eq!(detect_pattern(&history), None);

        let history = postings(&[(2024, 5), (2024, 5), (2025, 5)]);
        assert_eq!(intervals(&history), vec![12]);
        assert_eq!(detect_pattern(&history), Some(PeriodicPattern::Annual));
    }

    #[test]
    fn means_between_buckets_have_no_pattern() {
        // single gap of 1 month and of 16+ months
        assert_eq!(detect_pattern(&postings(&[(2024, 1), (2024, 2)])), None);
        assert_eq!(detect_pattern(&postings(&[(2023, 1), (2024, 6)])), None);
    }

    #[test]
    fn empty_and_single_histories_have_no_pattern() {
        assert_eq!(detect_pattern(&[]), None);
        assert_eq!(detect_pattern(&postings(&[(2024, 1)])), None);
    }

    #[test]
    fn quarterly_match_uses_historical_quarters() {
        let history = postings(&[(2024, 1), (2024, 4)]);
        let p = Some(PeriodicPattern::Quarterly);
        assert!(is_pattern_match(p, 1, &history));
        assert!(is_pattern_match(p, 3, &history));
        assert!(is_pattern_match(p, 6, &history));
        assert!(!is_pattern_match(p, 7, &history));
        assert!(!is_pattern_match(p, 12, &history));
    }

    #[test]
    fn semiannual_match_accepts_same_or_opposite_month() {
        let history = postings(&[(2024, 2), (2024, 7)]);
        let p = Some(PeriodicPattern::Semiannual);
        assert!(is_pattern_match(p, 2, &history));
        assert!(is_pattern_match(p, 8, &history));
        assert!(is_pattern_match(p, 1, &history));
        assert!(!is_pattern_match(p, 3, &history));
    }

    #[test]
    fn annual_match_requires_exact_month_number() {
        let history = postings(&[(2023, 3), (2024, 3)]);
        let p = Some(PeriodicPattern::Annual);
        assert!(is_pattern_match(p, 3, &history));
        assert!(!is_pattern_match(p, 4, &history));
    }

    #[test]
    fn no_pattern_never_matches() {
        let history = postings(&[(2023, 3), (2024, 3)]);
        assert!((1..=12).all(|m| !is_pattern_match(None, m, &history)));
    }

    proptest! {
        #[test]
        fn detection_ignores_input_order(
            (original, shuffled) in prop::collection::vec((2020i32..2027, 1u32..=12), 0..12)
                .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
        ) {
            prop_assert_eq!(
                detect_pattern(&postings(&original)),
                detect_pattern(&postings(&shuffled))
            );
        }
    }
}
