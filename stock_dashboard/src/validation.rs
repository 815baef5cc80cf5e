//! Input checks that run before anything is fetched.

use std::{fmt, str::FromStr};

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::DashboardError;

/// Longest accepted ticker.
pub const MAX_TICKER_LEN: usize = 15;

/// Trim and uppercase a ticker, rejecting anything that cannot be a symbol.
///
/// Letters, digits and `. - ^ =` are accepted (`BRK.B`, `^GSPC`, `EURUSD=X`).
pub fn normalize_ticker(raw: &str) -> Result<String, DashboardError> {
    let ticker = raw.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(DashboardError::InvalidInput("ticker symbol is empty".into()));
    }
    if ticker.len() > MAX_TICKER_LEN {
        return Err(DashboardError::InvalidInput(format!(
            "ticker symbol {ticker:?} is longer than {MAX_TICKER_LEN} characters"
        )));
    }
    if let Some(c) = ticker
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(*c, '.' | '-' | '^' | '=')))
    {
        return Err(DashboardError::InvalidInput(format!(
            "ticker symbol {ticker:?} contains invalid character {c:?}"
        )));
    }
    Ok(ticker)
}

/// Inclusive date range with `start` strictly before `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Checked constructor.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DashboardError> {
        if start >= end {
            return Err(DashboardError::InvalidInput(format!(
                "start date {start} must be before end date {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// The year up to `today`, the form's initial value.
    pub fn last_year(today: NaiveDate) -> Result<Self, DashboardError> {
        let start = today
            .checked_sub_months(Months::new(12))
            .ok_or_else(|| DashboardError::InvalidInput(format!("no date one year before {today}")))?;
        Self::new(start, today)
    }

    /// First day.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day.
    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

/// How the price history is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    /// OHLC candlesticks.
    #[default]
    Candle,
    /// Close-price line.
    Line,
}

/// Indicator drawn next to the price chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    /// Price chart only.
    #[default]
    None,
    /// Relative strength index.
    Rsi,
    /// Moving average overlaid on the close line.
    MovingAverage,
    /// MACD, signal line and histogram.
    Macd,
}

impl IndicatorKind {
    /// Indicators offered for a chart type.
    pub fn available_for(chart: ChartType) -> &'static [IndicatorKind] {
        match chart {
            ChartType::Candle => &[IndicatorKind::None, IndicatorKind::Rsi, IndicatorKind::Macd],
            ChartType::Line => &[
                IndicatorKind::None,
                IndicatorKind::Rsi,
                IndicatorKind::MovingAverage,
                IndicatorKind::Macd,
            ],
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            IndicatorKind::None => "None",
            IndicatorKind::Rsi => "RSI",
            IndicatorKind::MovingAverage => "Moving Average",
            IndicatorKind::Macd => "MACD",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChartType::Candle => "Candle",
            ChartType::Line => "Line",
        })
    }
}

impl FromStr for ChartType {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "candle" => Ok(ChartType::Candle),
            "line" => Ok(ChartType::Line),
            other => Err(DashboardError::InvalidInput(format!("unknown chart type {other:?}"))),
        }
    }
}

impl FromStr for IndicatorKind {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "none" => Ok(IndicatorKind::None),
            "rsi" => Ok(IndicatorKind::Rsi),
            "ma" | "movingaverage" => Ok(IndicatorKind::MovingAverage),
            "macd" => Ok(IndicatorKind::Macd),
            other => Err(DashboardError::InvalidInput(format!("unknown indicator {other:?}"))),
        }
    }
}

/// Reject indicator selections the chart type does not offer.
pub fn check_chart(chart: ChartType, indicator: IndicatorKind) -> Result<(), DashboardError> {
    if IndicatorKind::available_for(chart).contains(&indicator) {
        Ok(())
    } else {
        Err(DashboardError::InvalidInput(format!(
            "{} is not available on a {chart} chart",
            indicator.label()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn tickers_are_trimmed_and_uppercased() {
        assert_eq!(normalize_ticker("  tsla ").unwrap(), "TSLA");
        assert_eq!(normalize_ticker("brk.b").unwrap(), "BRK.B");
        assert_eq!(normalize_ticker("^gspc").unwrap(), "^GSPC");
    }

    #[test]
    fn bad_tickers_are_invalid_input() {
        for raw in ["", "   ", "TS LA", "AAPL;", "ABCDEFGHIJKLMNOP"] {
            assert!(
                matches!(normalize_ticker(raw), Err(DashboardError::InvalidInput(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn start_must_precede_end() {
        assert!(DateRange::new(ymd(2024, 1, 1), ymd(2024, 1, 2)).is_ok());
        assert!(DateRange::new(ymd(2024, 1, 2), ymd(2024, 1, 2)).is_err());
        assert!(DateRange::new(ymd(2024, 1, 3), ymd(2024, 1, 2)).is_err());
    }

    #[test]
    fn last_year_range() {
        let r = DateRange::last_year(ymd(2024, 2, 29)).unwrap();
        assert_eq!(r.start(), ymd(2023, 2, 28));
        assert_eq!(r.end(), ymd(2024, 2, 29));
    }

    #[test]
    fn candle_chart_has_no_moving_average() {
        assert!(check_chart(ChartType::Line, IndicatorKind::MovingAverage).is_ok());
        assert!(check_chart(ChartType::Candle, IndicatorKind::Macd).is_ok());
        assert!(matches!(
            check_chart(ChartType::Candle, IndicatorKind::MovingAverage),
            Err(DashboardError::InvalidInput(_))
        ));
    }

    #[test]
    fn indicator_names_parse() {
        assert_eq!("Moving Average".parse::<IndicatorKind>().unwrap(), IndicatorKind::MovingAverage);
        assert_eq!("ma".parse::<IndicatorKind>().unwrap(), IndicatorKind::MovingAverage);
        assert_eq!("MACD".parse::<IndicatorKind>().unwrap(), IndicatorKind::Macd);
        assert!("bollinger".parse::<IndicatorKind>().is_err());
        assert_eq!("LINE".parse::<ChartType>().unwrap(), ChartType::Line);
    }
}
