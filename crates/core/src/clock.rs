//! Wall-clock source used to anchor forecast windows.
//!
//! Callers resolve "now" once per request and pass the resulting
//! [`YearMonth`] into the engine, so engine output depends only on its
//! explicit inputs.

use chrono::{DateTime, FixedOffset, Local, NaiveTime};

use crate::error::DomainResult;
use crate::month::YearMonth;

/// Source of the current calendar month.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<FixedOffset>;

    fn current_month(&self) -> YearMonth {
        YearMonth::from_datetime(&self.now())
    }
}

/// Host-local wall clock.
#[derive(Debug, Default, Copy, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Frozen clock for tests and replays.
#[derive(Debug, Copy, Clone)]
pub struct FixedClock {
    at: DateTime<FixedOffset>,
}

impl FixedClock {
    pub fn new(at: DateTime<FixedOffset>) -> Self {
        Self { at }
    }

    /// Midnight UTC on the first day of `month`.
    pub fn at_month(month: YearMonth) -> DomainResult<Self> {
        let at = month.first_day()?.and_time(NaiveTime::MIN).and_utc();
        Ok(Self::new(at.fixed_offset()))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.at
    }
}
