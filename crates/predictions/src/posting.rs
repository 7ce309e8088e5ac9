use serde::{Deserialize, Serialize};

use hirecast_core::YearMonth;

/// Minimum number of postings before an organization is analysed at all.
pub const MIN_POSTINGS: usize = 2;

/// One historical job posting, reduced to the month it opened.
///
/// Built fresh from the history provider on every engine call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Posting {
    pub month: YearMonth,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Posting {
    pub fn new(month: YearMonth) -> Self {
        Self {
            month,
            job_id: None,
            title: None,
        }
    }

    pub fn with_job(mut self, job_id: impl Into<String>, title: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self.title = Some(title.into());
        self
    }

    pub fn year(&self) -> i32 {
        self.month.year()
    }

    pub fn month_number(&self) -> u32 {
        self.month.month()
    }
}

/// All postings of a single organization inside the lookback window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationHistory {
    pub org_name: String,
    pub postings: Vec<Posting>,
}

impl OrganizationHistory {
    pub fn new(org_name: impl Into<String>, postings: Vec<Posting>) -> Self {
        Self {
            org_name: org_name.into(),
            postings,
        }
    }

    /// Enough postings to attempt any pattern analysis.
    pub fn is_analyzable(&self) -> bool {
        self.postings.len() >= MIN_POSTINGS
    }
}

/// Posting counts per month number; index 0 is unused.
pub(crate) fn month_frequency(postings: &[Posting]) -> [usize; 13] {
    let mut counts = [0usize; 13];
    for posting in postings {
        counts[posting.month_number() as usize] += 1;
    }
    counts
}
