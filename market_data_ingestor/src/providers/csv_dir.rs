//! Offline provider backed by a directory of exported files.
//!
//! Bars are read from `<dir>/<SYMBOL>.csv` in the historical CSV format and
//! profiles from an optional `<dir>/<SYMBOL>.profile.json` holding a flat
//! object keyed by provider field names (`"sector"`, `"marketCap"`, ...).

use std::{io::ErrorKind, path::PathBuf};

use async_trait::async_trait;
use snafu::IntoError;
use tracing::{debug, instrument};

use crate::{
    io::csv_codec::read_raw_bars,
    models::{
        bar::RawBar,
        profile::{CompanyProfile, FieldValue},
        request_params::BarsRequest,
    },
    providers::{DataProvider, DecodeSnafu, IoSnafu, ProviderError},
};

#[derive(Debug, Clone)]
pub struct CsvDirProvider {
    dir: PathBuf,
}

impl CsvDirProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Read a file, treating "not found" as `None`.
    async fn read_optional(&self, file_name: String) -> Result<Option<Vec<u8>>, ProviderError> {
        let path = self.dir.join(file_name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no local file");
                Ok(None)
            }
            Err(source) => Err(IoSnafu { path }.into_error(source)),
        }
    }
}

#[async_trait]
impl DataProvider for CsvDirProvider {
    #[instrument(name = "csv_dir_bars", skip(self), fields(symbol = %request.symbol))]
    async fn fetch_bars(&self, request: &BarsRequest) -> Result<Vec<RawBar>, ProviderError> {
        let Some(bytes) = self.read_optional(format!("{}.csv", request.symbol)).await? else {
            return Ok(vec![]);
        };

        let mut bars = read_raw_bars(bytes.as_slice()).map_err(|e| {
            DecodeSnafu {
                message: e.to_string(),
            }
            .build()
        })?;

        let (start, end) = request.date_range();
        bars.retain(|b| b.date >= start && b.date <= end);
        debug!(rows = bars.len(), "loaded bars");
        Ok(bars)
    }

    async fn fetch_profile(&self, symbol: &str) -> Result<CompanyProfile, ProviderError> {
        let Some(bytes) = self.read_optional(format!("{symbol}.profile.json")).await? else {
            return Ok(CompanyProfile::unavailable(symbol));
        };

        let payload: serde_json::Value = serde_json::from_slice(&bytes).map_err(|e| {
            DecodeSnafu {
                message: e.to_string(),
            }
            .build()
        })?;

        Ok(CompanyProfile::from_lookup(symbol, |field| {
            payload.get(field.key()).map(FieldValue::from_json)
        }))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::profile::ProfileField;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[tokio::test]
    async fn reads_and_filters_symbol_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("TSLA.csv"),
            "Date,Open,High,Low,Close,Volume\n\
             2024-03-01,1,2,0.5,1.5,100\n\
             2024-03-04,1.5,2.5,1,2,200\n\
             2024-03-05,2,3,1.5,2.5,300\n",
        )
        .unwrap();

        let provider = CsvDirProvider::new(dir.path());
        let bars = provider
            .fetch_bars(&BarsRequest::for_dates("TSLA", day(2), day(5), day(5)))
            .await
            .unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, day(4));
    }

    #[tokio::test]
    async fn missing_files_mean_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let provider = CsvDirProvider::new(dir.path());

        let bars = provider
            .fetch_bars(&BarsRequest::for_dates("ZZZZ", day(1), day(5), day(5)))
            .await
            .unwrap();
        assert!(bars.is_empty());
        assert_eq!(provider.fetch_profile("ZZZZ").await.unwrap().available_count(), 0);
    }

    #[tokio::test]
    async fn profile_json_is_read_by_field_key() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("TSLA.profile.json"),
            r#"{"sector": "Consumer Cyclical", "beta": 2.3, "unknownKey": 1}"#,
        )
        .unwrap();

        let profile = CsvDirProvider::new(dir.path()).fetch_profile("TSLA").await.unwrap();
        assert_eq!(profile.get(ProfileField::Beta), &FieldValue::Number(2.3));
        assert_eq!(profile.available_count(), 2);
    }
}
