//! Calendar month keys (`YYYY-MM`).

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// A calendar month, ordered chronologically by `(year, month)`.
///
/// Serialises as the zero-padded `"YYYY-MM"` key, so lexical and
/// chronological order agree for four-digit years.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl ValueObject for YearMonth {}

impl YearMonth {
    /// Build a month key; `month` must be in `1..=12`.
    pub fn new(year: i32, month: u32) -> DomainResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(DomainError::invalid_month(format!(
                "month number {month} is outside 1..=12"
            )));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Month key of a timestamp, in the timestamp's own zone.
    pub fn from_datetime<Tz: TimeZone>(at: &DateTime<Tz>) -> Self {
        Self::from_date(at.date_naive())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Month number, `1..=12`.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// First calendar day of the month; fails outside chrono's supported year range.
    pub fn first_day(&self) -> DomainResult<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).ok_or_else(|| {
            DomainError::invalid_month(format!("{self} is outside the supported calendar range"))
        })
    }

    /// Shift by `n` months (negative moves backwards).
    pub fn add_months(&self, n: i32) -> Self {
        let index = self.index() + i64::from(n);
        let year = index.div_euclid(12);
        let month = index.rem_euclid(12) + 1;
        Self {
            year: year as i32,
            month: month as u32,
        }
    }

    /// Signed distance in months from `earlier` to `self`.
    pub fn months_since(&self, earlier: &YearMonth) -> i64 {
        self.index() - earlier.index()
    }

    /// Same month number, one year earlier.
    pub fn previous_year(&self) -> Self {
        Self {
            year: self.year - 1,
            month: self.month,
        }
    }

    fn index(&self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| DomainError::invalid_month(format!("expected YYYY-MM, got {s:?}")))?;
        let year: i32 = year
            .parse()
            .map_err(|e| DomainError::invalid_month(format!("{s:?}: year: {e}")))?;
        let month: u32 = month
            .parse()
            .map_err(|e| DomainError::invalid_month(format!("{s:?}: month: {e}")))?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}
