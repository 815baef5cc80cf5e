use std::path::PathBuf;

use async_trait::async_trait;
use snafu::{Backtrace, ResultExt, Snafu};
use tracing::info;

use crate::io::csv_codec::series_to_csv;
use crate::models::bar_series::PriceSeries;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SinkError {
    /// An error occurred while trying to write the data (e.g., file I/O error).
    #[snafu(display("Failed to write {}: {source}", path.display()))]
    Write {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// An error occurred while converting the `PriceSeries` into the destination format.
    #[snafu(display("Data conversion error: {message}"))]
    Conversion {
        message: String,
        backtrace: Backtrace,
    },
}

#[async_trait]
pub trait DataSink {
    /// The type of output returned after a successful write operation.
    ///
    /// A file sink returns the path it created; other sinks may return a row count.
    type Output;

    /// Writes one series to the destination.
    async fn write(&self, series: &PriceSeries) -> Result<Self::Output, SinkError>;
}

/// Writes each series as `<dir>/<SYMBOL>_historical_<first>_<last>.csv`.
#[derive(Debug, Clone)]
pub struct CsvFileSink {
    dir: PathBuf,
}

impl CsvFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File name used for `series`.
    pub fn file_name(series: &PriceSeries) -> String {
        format!(
            "{}_historical_{}_{}.csv",
            series.symbol(),
            series.first_date(),
            series.last_date()
        )
    }
}

impl CsvFileSink {
    /// Write `series` under an explicit file name inside the sink directory.
    pub async fn write_as(&self, series: &PriceSeries, file_name: &str) -> Result<PathBuf, SinkError> {
        let text = series_to_csv(series).map_err(|e| {
            ConversionSnafu {
                message: e.to_string(),
            }
            .build()
        })?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .context(WriteSnafu { path: &self.dir })?;

        let path = self.dir.join(file_name);
        tokio::fs::write(&path, text)
            .await
            .context(WriteSnafu { path: &path })?;

        info!(symbol = series.symbol(), path = %path.display(), rows = series.len(), "wrote CSV export");
        Ok(path)
    }
}

#[async_trait]
impl DataSink for CsvFileSink {
    type Output = PathBuf;

    async fn write(&self, series: &PriceSeries) -> Result<PathBuf, SinkError> {
        self.write_as(series, &Self::file_name(series)).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::io::csv_codec::read_series;
    use crate::models::bar::PriceBar;

    #[tokio::test]
    async fn writes_named_file_that_parses_back() {
        let dir = tempfile::tempdir().unwrap();
        let d1 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let series = PriceSeries::new(
            "TSLA",
            vec![
                PriceBar::new(d1, 1.0, 2.0, 0.5, 1.5, 10),
                PriceBar::new(d2, 1.5, 2.5, 1.0, 2.0, 20),
            ],
        )
        .unwrap();

        let sink = CsvFileSink::new(dir.path().join("exports"));
        let path = sink.write(&series).await.unwrap();

        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "TSLA_historical_2024-01-02_2024-01-03.csv"
        );
        let file = std::fs::File::open(&path).unwrap();
        assert_eq!(read_series("TSLA", file).unwrap(), series);
    }
}
