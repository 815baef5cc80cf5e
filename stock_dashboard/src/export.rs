//! CSV downloads offered by the two pages.

use std::path::{Path, PathBuf};

use market_data_ingestor::io::{
    csv_codec::format_price,
    sink::{CsvFileSink, SinkError},
};
use price_analytics::forecast::ForecastPoint;
use thiserror::Error;
use tracing::info;

use crate::{report::AnalysisReport, validation::DateRange};

/// Header of the forecast CSV.
pub const FORECAST_HEADER: [&str; 2] = ["Date", "Predicted_Close"];

/// Failure to produce or write an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Writing the historical CSV failed.
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// The forecast rows could not be encoded.
    #[error("failed to encode forecast CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The forecast file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        /// Target file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// `<SYMBOL>_historical_<start>_<end>.csv`, named after the range the user picked.
pub fn historical_file_name(symbol: &str, range: DateRange) -> String {
    format!("{symbol}_historical_{}_{}.csv", range.start(), range.end())
}

/// `<SYMBOL>_arima_forecast.csv`.
pub fn forecast_file_name(symbol: &str) -> String {
    format!("{symbol}_arima_forecast.csv")
}

/// Encode forecast points as `Date,Predicted_Close` rows.
pub fn forecast_to_csv(points: &[ForecastPoint]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(FORECAST_HEADER)?;
    for point in points {
        writer.write_record([point.date.to_string(), format_price(point.predicted_close)])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write the selected range of an analysis report into `dir`.
pub async fn export_historical(dir: &Path, report: &AnalysisReport) -> Result<PathBuf, ExportError> {
    let sink = CsvFileSink::new(dir);
    let name = historical_file_name(&report.symbol, report.range);
    Ok(sink.write_as(&report.series, &name).await?)
}

/// Write a forecast into `dir`.
pub async fn export_forecast(dir: &Path, symbol: &str, points: &[ForecastPoint]) -> Result<PathBuf, ExportError> {
    let text = forecast_to_csv(points)?;
    tokio::fs::create_dir_all(dir).await.map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(forecast_file_name(symbol));
    tokio::fs::write(&path, text).await.map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;
    info!(symbol, path = %path.display(), rows = points.len(), "wrote forecast CSV");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn file_names_use_the_selected_range() {
        let range = DateRange::new(ymd(2023, 1, 1), ymd(2023, 12, 31)).unwrap();
        assert_eq!(historical_file_name("TSLA", range), "TSLA_historical_2023-01-01_2023-12-31.csv");
        assert_eq!(forecast_file_name("TSLA"), "TSLA_arima_forecast.csv");
    }

    #[test]
    fn forecast_csv_layout() {
        let points = [
            ForecastPoint {
                date: ymd(2024, 4, 10),
                predicted_close: 141.5,
            },
            ForecastPoint {
                date: ymd(2024, 4, 11),
                predicted_close: 142.25,
            },
        ];
        insta::assert_snapshot!(forecast_to_csv(&points).unwrap(), @r"
        Date,Predicted_Close
        2024-04-10,141.5
        2024-04-11,142.25
        ");
    }

    #[tokio::test]
    async fn forecast_file_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let points = [ForecastPoint {
            date: ymd(2024, 4, 10),
            predicted_close: 1.0,
        }];
        let path = export_forecast(&dir.path().join("out"), "TSLA", &points).await.unwrap();
        assert!(path.ends_with("out/TSLA_arima_forecast.csv"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "Date,Predicted_Close\n2024-04-10,1\n");
    }
}
