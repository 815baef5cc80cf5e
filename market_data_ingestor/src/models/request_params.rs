use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::period::QuickPeriod;

/// What stretch of history a bars request covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestSpan {
    /// Inclusive calendar range `start..=end`.
    Dates { start: NaiveDate, end: NaiveDate },

    /// A named look-back period ending today.
    Period(QuickPeriod),
}

impl RequestSpan {
    /// Resolve the span to an inclusive `(start, end)` date pair.
    pub fn resolve(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match *self {
            RequestSpan::Dates { start, end } => (start, end),
            RequestSpan::Period(p) => (p.start_date(today), today),
        }
    }
}

/// Vendor-agnostic parameters for requesting daily bars of one symbol.
///
/// This is the standard input for every
/// [`DataProvider`](crate::providers::DataProvider) implementation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarsRequest {
    /// Ticker symbol, already normalized (e.g. `"TSLA"`).
    pub symbol: String,

    /// History to cover.
    pub span: RequestSpan,

    /// Reference date used to resolve [`RequestSpan::Period`].
    pub today: NaiveDate,
}

impl BarsRequest {
    pub fn for_dates(symbol: impl Into<String>, start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Self {
        Self {
            symbol: symbol.into(),
            span: RequestSpan::Dates { start, end },
            today,
        }
    }

    pub fn for_period(symbol: impl Into<String>, period: QuickPeriod, today: NaiveDate) -> Self {
        Self {
            symbol: symbol.into(),
            span: RequestSpan::Period(period),
            today,
        }
    }

    /// Inclusive `(start, end)` dates covered by this request.
    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        self.span.resolve(self.today)
    }
}
