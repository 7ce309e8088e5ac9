use serde::{Deserialize, Serialize};

use hirecast_core::YearMonth;

use crate::result::{PredictionError, PredictionResult};

/// Hard cap on the forward-looking window.
pub const MAX_WINDOW_MONTHS: u32 = 12;
/// Default window for plain forecasts.
pub const DEFAULT_WINDOW_MONTHS: u32 = 3;
/// Default window for evidence forecasts.
pub const DEFAULT_EXTENDED_WINDOW_MONTHS: u32 = 10;

/// Number of future months to forecast, `1..=MAX_WINDOW_MONTHS`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct ForecastWindow(u32);

impl ForecastWindow {
    pub fn new(months: i64) -> PredictionResult<Self> {
        if months < 1 || months > i64::from(MAX_WINDOW_MONTHS) {
            return Err(PredictionError::InvalidWindow(months));
        }
        Ok(Self(months as u32))
    }

    /// Saturate at [`MAX_WINDOW_MONTHS`]; `None` for non-positive requests.
    pub fn clamped(months: i64) -> Option<Self> {
        if months < 1 {
            return None;
        }
        Some(Self(months.min(i64::from(MAX_WINDOW_MONTHS)) as u32))
    }

    pub fn extended_default() -> Self {
        Self(DEFAULT_EXTENDED_WINDOW_MONTHS)
    }

    pub fn months(&self) -> u32 {
        self.0
    }

    /// `now+1 ..= now+months`: future months only.
    pub fn future_months(&self, now: YearMonth) -> Vec<YearMonth> {
        (1..=self.0 as i32).map(|i| now.add_months(i)).collect()
    }

    /// `now+0 .. now+months`: the current month counts as month 0.
    pub fn months_from_current(&self, now: YearMonth) -> Vec<YearMonth> {
        (0..self.0 as i32).map(|i| now.add_months(i)).collect()
    }
}

impl Default for ForecastWindow {
    fn default() -> Self {
        Self(DEFAULT_WINDOW_MONTHS)
    }
}

impl TryFrom<i64> for ForecastWindow {
    type Error = PredictionError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ForecastWindow> for u32 {
    fn from(value: ForecastWindow) -> Self {
        value.0
    }
}
