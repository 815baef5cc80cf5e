//! CSV export and import of daily bars.
//!
//! Layout: a header row `Date,Open,High,Low,Close,Volume` (plus `Adj Close`
//! when any bar carries an adjusted close), then one row per bar in ascending
//! date order. Dates are ISO-8601 and prices use Rust's shortest round-trip
//! formatting, so a written series parses back to identical values. Gaps
//! (NaN) are written as empty cells.

use std::io;

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{
    bar::{RawBar, RawValue},
    bar_series::{PriceSeries, SeriesError},
};
use crate::normalize::normalize;

pub const HEADER: [&str; 6] = ["Date", "Open", "High", "Low", "Close", "Volume"];
pub const ADJ_CLOSE: &str = "Adj Close";

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("missing column '{0}'")]
    MissingColumn(&'static str),

    #[error("row {row}: invalid date '{value}'")]
    InvalidDate { row: usize, value: String },

    #[error(transparent)]
    Series(#[from] SeriesError),
}

/// Format a price for export; NaN becomes an empty cell.
pub fn format_price(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

/// Write `series` as CSV to `writer`.
pub fn write_series<W: io::Write>(series: &PriceSeries, writer: W) -> Result<(), CsvError> {
    let with_adj = series.bars().iter().any(|b| b.adj_close.is_some());
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = HEADER.to_vec();
    if with_adj {
        header.push(ADJ_CLOSE);
    }
    wtr.write_record(&header)?;

    for bar in series.bars() {
        let mut record = vec![
            bar.date.format("%Y-%m-%d").to_string(),
            format_price(bar.open),
            format_price(bar.high),
            format_price(bar.low),
            format_price(bar.close),
            bar.volume.to_string(),
        ];
        if with_adj {
            record.push(bar.adj_close.map(format_price).unwrap_or_default());
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Render `series` as a CSV string.
pub fn series_to_csv(series: &PriceSeries) -> Result<String, CsvError> {
    let mut buf = Vec::new();
    write_series(series, &mut buf)?;
    // csv only ever writes the UTF-8 we handed it
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Parse exported CSV into raw bars, leaving numeric coercion to [`normalize`].
///
/// Columns are located by header name, so extra columns and any column order
/// are accepted. A date cell may carry a time suffix (`2024-01-02 00:00:00`).
pub fn read_raw_bars<R: io::Read>(reader: R) -> Result<Vec<RawBar>, CsvError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let column = |name: &'static str| headers.iter().position(|h| h == name);
    let required = |name: &'static str| column(name).ok_or(CsvError::MissingColumn(name));

    let date_idx = required("Date")?;
    let open_idx = required("Open")?;
    let high_idx = required("High")?;
    let low_idx = required("Low")?;
    let close_idx = required("Close")?;
    let volume_idx = required("Volume")?;
    let adj_idx = column(ADJ_CLOSE);

    let mut bars = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let cell = |idx: usize| RawValue::from(record.get(idx).unwrap_or(""));
        let raw_date = record.get(date_idx).unwrap_or("");
        let date = parse_date(raw_date).ok_or_else(|| CsvError::InvalidDate {
            row: i + 1,
            value: raw_date.to_string(),
        })?;
        bars.push(RawBar {
            date,
            open: cell(open_idx),
            high: cell(high_idx),
            low: cell(low_idx),
            close: cell(close_idx),
            volume: cell(volume_idx),
            // an empty adjusted cell means the bar had none
            adj_close: adj_idx
                .and_then(|idx| record.get(idx).filter(|s| !s.is_empty()))
                .map(RawValue::from),
        });
    }
    Ok(bars)
}

/// Parse exported CSV back into a normalized series.
pub fn read_series<R: io::Read>(symbol: &str, reader: R) -> Result<PriceSeries, CsvError> {
    let raw = read_raw_bars(reader)?;
    Ok(normalize(symbol, raw)?)
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let day = value.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::models::bar::PriceBar;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
    }

    fn sample() -> PriceSeries {
        PriceSeries::new(
            "TSLA",
            vec![
                PriceBar::new(day(1), 187.1, 189.4, 185.0, 188.86, 91_000_000),
                PriceBar::new(day(2), 188.5, 190.33333333333334, 186.2, 187.91, 87_654_321),
            ],
        )
        .unwrap()
    }

    #[test]
    fn writes_header_and_rows() {
        let csv = series_to_csv(&sample()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Date,Open,High,Low,Close,Volume");
        assert_eq!(lines[1], "2024-02-01,187.1,189.4,185,188.86,91000000");
        assert_eq!(lines[2], "2024-02-02,188.5,190.33333333333334,186.2,187.91,87654321");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn adj_close_column_only_when_present() {
        let bars = sample()
            .into_bars()
            .into_iter()
            .enumerate()
            .map(|(i, b)| if i == 0 { b.with_adj_close(188.0) } else { b })
            .collect();
        let series = PriceSeries::new("TSLA", bars).unwrap();
        let csv = series_to_csv(&series).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Date,Open,High,Low,Close,Volume,Adj Close"));
        assert!(lines.next().unwrap().ends_with(",188"));
        assert!(lines.next().unwrap().ends_with(','));
    }

    #[test]
    fn partial_adj_close_reads_back_as_none() {
        let mut bars = sample().into_bars();
        bars[0].adj_close = Some(1.4);
        let original = PriceSeries::new("TSLA", bars).unwrap();

        let parsed = read_series("TSLA", series_to_csv(&original).unwrap().as_bytes()).unwrap();
        assert_eq!(parsed.bars()[0].adj_close, Some(1.4));
        assert_eq!(parsed.bars()[1].adj_close, None);
        assert_eq!(parsed, original);
    }

    fn arb_bar() -> impl Strategy<Value = (f64, f64, f64, f64, u64, Option<f64>)> {
        (
            -1e9..1e9f64,
            -1e9..1e9f64,
            -1e9..1e9f64,
            -1e9..1e9f64,
            0u64..(1u64 << 53),
            proptest::option::of(-1e9..1e9f64),
        )
    }

    proptest! {
        #[test]
        fn export_parses_back_to_equal_bars(rows in proptest::collection::vec(arb_bar(), 1..40)) {
            let start = day(1);
            let bars: Vec<PriceBar> = rows
                .into_iter()
                .enumerate()
                .map(|(i, (open, high, low, close, volume, adj_close))| PriceBar {
                    date: start + chrono::Days::new(i as u64),
                    open,
                    high,
                    low,
                    close,
                    volume,
                    adj_close,
                })
                .collect();
            let original = PriceSeries::new("TSLA", bars).unwrap();

            let csv = series_to_csv(&original).unwrap();
            let parsed = read_series("TSLA", csv.as_bytes()).unwrap();
            prop_assert_eq!(parsed, original);
        }
    }

    #[test]
    fn reads_pandas_style_dates_and_gaps() {
        let text = "Date,Close,High,Low,Open,Volume\n2024-02-01 00:00:00,10.5,11,10,10.2,100\n2024-02-02,,11,10,10.2,\n";
        let series = read_series("TSLA", text.as_bytes()).unwrap();
        assert_eq!(series.bars()[0].close, 10.5);
        assert!(series.bars()[1].close.is_nan());
        assert_eq!(series.bars()[1].volume, 0);
    }

    #[test]
    fn missing_column_is_reported() {
        let err = read_raw_bars("Date,Open\n2024-02-01,1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, CsvError::MissingColumn("High")));
    }

    #[test]
    fn bad_date_is_reported() {
        let text = "Date,Open,High,Low,Close,Volume\nyesterday,1,1,1,1,1\n";
        let err = read_raw_bars(text.as_bytes()).unwrap_err();
        assert!(matches!(err, CsvError::InvalidDate { row: 1, .. }));
    }
}
