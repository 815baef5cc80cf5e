//! Named look-back periods ("quick periods") and their calendar resolution.
//!
//! The same short codes are understood by Yahoo's chart endpoint, so the
//! Yahoo provider forwards them verbatim; other providers resolve them to a
//! concrete start date with [`QuickPeriod::start_date`].
//!
//! ```
//! use market_data_ingestor::models::period::QuickPeriod;
//!
//! let p: QuickPeriod = "6mo".parse().unwrap();
//! assert_eq!(p, QuickPeriod::SixMonths);
//! assert_eq!(p.to_string(), "6mo");
//! ```

use std::{fmt, str::FromStr};

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Earliest date a `max` request resolves to (the Unix epoch).
pub fn earliest_date() -> NaiveDate {
    NaiveDate::default()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown period '{0}', expected one of 5d, 1mo, 6mo, ytd, 1y, 5y, max")]
pub struct PeriodParseError(pub String);

/// Look-back periods offered as quick-selection buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuickPeriod {
    #[serde(rename = "5d")]
    FiveDays,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "ytd")]
    YearToDate,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "max")]
    Max,
}

impl QuickPeriod {
    pub const ALL: [QuickPeriod; 7] = [
        QuickPeriod::FiveDays,
        QuickPeriod::OneMonth,
        QuickPeriod::SixMonths,
        QuickPeriod::YearToDate,
        QuickPeriod::OneYear,
        QuickPeriod::FiveYears,
        QuickPeriod::Max,
    ];

    /// Provider code, e.g. `"1mo"`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            QuickPeriod::FiveDays => "5d",
            QuickPeriod::OneMonth => "1mo",
            QuickPeriod::SixMonths => "6mo",
            QuickPeriod::YearToDate => "ytd",
            QuickPeriod::OneYear => "1y",
            QuickPeriod::FiveYears => "5y",
            QuickPeriod::Max => "max",
        }
    }

    /// Button label, e.g. `"1M"`.
    pub const fn label(&self) -> &'static str {
        match self {
            QuickPeriod::FiveDays => "5D",
            QuickPeriod::OneMonth => "1M",
            QuickPeriod::SixMonths => "6M",
            QuickPeriod::YearToDate => "YTD",
            QuickPeriod::OneYear => "1Y",
            QuickPeriod::FiveYears => "5Y",
            QuickPeriod::Max => "MAX",
        }
    }

    /// First calendar date covered by this period when looking back from `today`.
    ///
    /// `5d` counts five business days including `today` (or the last business
    /// day before it); month-based periods step back whole calendar months.
    pub fn start_date(&self, today: NaiveDate) -> NaiveDate {
        match self {
            QuickPeriod::FiveDays => business_days_back(today, 5),
            QuickPeriod::OneMonth => months_back(today, 1),
            QuickPeriod::SixMonths => months_back(today, 6),
            QuickPeriod::YearToDate => {
                NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or_else(earliest_date)
            }
            QuickPeriod::OneYear => months_back(today, 12),
            QuickPeriod::FiveYears => months_back(today, 60),
            QuickPeriod::Max => earliest_date(),
        }
    }
}

fn months_back(today: NaiveDate, months: u32) -> NaiveDate {
    today
        .checked_sub_months(Months::new(months))
        .unwrap_or_else(earliest_date)
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn business_days_back(today: NaiveDate, count: u32) -> NaiveDate {
    let mut date = today;
    let mut seen = 0;
    loop {
        if !is_weekend(date) {
            seen += 1;
            if seen == count {
                return date;
            }
        }
        match date.checked_sub_days(Days::new(1)) {
            Some(prev) => date = prev,
            None => return date,
        }
    }
}

impl fmt::Display for QuickPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuickPeriod {
    type Err = PeriodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        QuickPeriod::ALL
            .into_iter()
            .find(|p| p.as_str() == needle || p.label().to_lowercase() == needle)
            .ok_or_else(|| PeriodParseError(s.to_string()))
    }
}
