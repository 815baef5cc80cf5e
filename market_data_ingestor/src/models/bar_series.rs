//! An ordered collection of daily bars for a single symbol.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::bar::PriceBar;

/// Violations of the [`PriceSeries`] invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    /// No bars were available for the symbol.
    #[error("no price data for {symbol}")]
    Empty { symbol: String },

    /// A bar is dated earlier than its predecessor.
    #[error("bars for {symbol} are not sorted: {date} follows {previous}")]
    Unsorted {
        symbol: String,
        previous: NaiveDate,
        date: NaiveDate,
    },

    /// Two bars share the same date.
    #[error("duplicate bar for {symbol} on {date}")]
    DuplicateDate { symbol: String, date: NaiveDate },
}

/// Latest close, the close before it, and their difference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloseSummary {
    pub current: f64,
    pub previous: f64,
    pub change: f64,
}

/// Daily bars for one symbol, strictly ascending by date, never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Builds a series, checking that it is non-empty, sorted and free of
    /// duplicate dates. Bars are never reordered.
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, SeriesError> {
        let symbol = symbol.into();
        if bars.is_empty() {
            return Err(SeriesError::Empty { symbol });
        }
        for pair in bars.windows(2) {
            let (previous, date) = (pair[0].date, pair[1].date);
            if date == previous {
                return Err(SeriesError::DuplicateDate { symbol, date });
            }
            if date < previous {
                return Err(SeriesError::Unsorted {
                    symbol,
                    previous,
                    date,
                });
            }
        }
        Ok(Self { symbol, bars })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn into_bars(self) -> Vec<PriceBar> {
        self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always `false`; kept for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    /// Closing prices in date order. Gaps are NaN.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.bars[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.bars[self.bars.len() - 1].date
    }

    /// The last `n` bars (fewer if the series is shorter).
    pub fn tail(&self, n: usize) -> &[PriceBar] {
        let start = self.bars.len().saturating_sub(n);
        &self.bars[start..]
    }

    /// Current close, previous close and the daily change.
    ///
    /// Both closes fall back to the nearest earlier valid close when the bar
    /// itself carries a gap. With a single bar the change is zero. Returns
    /// `None` if the series holds no valid close at all.
    pub fn close_summary(&self) -> Option<CloseSummary> {
        let last = self.bars.len() - 1;
        let current = self.valid_close_at_or_before(last)?;
        if self.bars.len() < 2 {
            return Some(CloseSummary {
                current,
                previous: current,
                change: 0.0,
            });
        }
        let previous = self.valid_close_at_or_before(last - 1).unwrap_or(current);
        Some(CloseSummary {
            current,
            previous,
            change: current - previous,
        })
    }

    fn valid_close_at_or_before(&self, index: usize) -> Option<f64> {
        self.bars[..=index]
            .iter()
            .rev()
            .map(|b| b.close)
            .find(|c| c.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn bar(d: u32, close: f64) -> PriceBar {
        PriceBar::new(day(d), close, close, close, close, 100)
    }

    #[test]
    fn rejects_empty_unsorted_and_duplicates() {
        assert!(matches!(
            PriceSeries::new("TSLA", vec![]),
            Err(SeriesError::Empty { .. })
        ));
        assert_eq!(
            PriceSeries::new("TSLA", vec![bar(5, 1.0), bar(4, 1.0)]).unwrap_err(),
            SeriesError::Unsorted {
                symbol: "TSLA".into(),
                previous: day(5),
                date: day(4)
            }
        );
        assert!(matches!(
            PriceSeries::new("TSLA", vec![bar(4, 1.0), bar(4, 2.0)]),
            Err(SeriesError::DuplicateDate { .. })
        ));
    }

    #[test]
    fn close_summary_single_bar() {
        let s = PriceSeries::new("TSLA", vec![bar(4, 10.0)]).unwrap();
        let summary = s.close_summary().unwrap();
        assert_eq!(summary.current, 10.0);
        assert_eq!(summary.change, 0.0);
    }

    #[test]
    fn close_summary_skips_gaps() {
        let s = PriceSeries::new(
            "TSLA",
            vec![bar(4, 10.0), bar(5, 12.0), bar(6, f64::NAN), bar(7, f64::NAN)],
        )
        .unwrap();
        let summary = s.close_summary().unwrap();
        assert_eq!(summary.current, 12.0);
        assert_eq!(summary.previous, 12.0);
        assert_eq!(summary.change, 0.0);

        let s = PriceSeries::new("TSLA", vec![bar(4, 10.0), bar(5, f64::NAN), bar(6, 11.5)]).unwrap();
        let summary = s.close_summary().unwrap();
        assert_eq!(summary.previous, 10.0);
        assert_eq!(summary.change, 1.5);
    }

    #[test]
    fn close_summary_none_without_valid_close() {
        let s = PriceSeries::new("TSLA", vec![bar(4, f64::NAN)]).unwrap();
        assert!(s.close_summary().is_none());
    }

    #[test]
    fn tail_is_bounded() {
        let s = PriceSeries::new("TSLA", (1..=5).map(|d| bar(d, d as f64)).collect()).unwrap();
        assert_eq!(s.tail(2).len(), 2);
        assert_eq!(s.tail(2)[0].date, day(4));
        assert_eq!(s.tail(10).len(), 5);
        assert_eq!(s.last_date(), day(5));
    }
}
