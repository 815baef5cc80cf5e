//! Provider abstraction for market data sources.
//!
//! This module defines the [`DataProvider`] trait, which serves as a unified interface
//! for fetching daily bars and company metadata from any market data vendor.
//!
//! Each concrete provider (Yahoo, Alpaca, a directory of CSV exports) implements
//! [`DataProvider`] and handles its vendor-specific API logic. The trait is designed
//! for async usage and supports dynamic dispatch (`dyn DataProvider`) so the
//! provider can be chosen at runtime with [`build_provider`].
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use market_data_ingestor::models::{
//!     bar::RawBar,
//!     profile::CompanyProfile,
//!     request_params::BarsRequest,
//! };
//! use market_data_ingestor::providers::{DataProvider, ProviderError};
//!
//! struct MyProvider;
//!
//! #[async_trait]
//! impl DataProvider for MyProvider {
//!     async fn fetch_bars(&self, _request: &BarsRequest) -> Result<Vec<RawBar>, ProviderError> {
//!         Ok(vec![])
//!     }
//!
//!     async fn fetch_profile(&self, symbol: &str) -> Result<CompanyProfile, ProviderError> {
//!         Ok(CompanyProfile::unavailable(symbol))
//!     }
//! }
//! ```
//!

pub mod alpaca_rest;
pub mod csv_dir;
pub mod yahoo_rest;

use std::{num::NonZeroU32, path::PathBuf};

use async_trait::async_trait;
use nonzero_ext::nonzero;
use serde::{Deserialize, Serialize};
use shared_utils::env::MissingEnvVarError;
use snafu::{Backtrace, IntoError, Snafu};

use crate::models::{bar::RawBar, profile::CompanyProfile, request_params::BarsRequest};

/// Trait for fetching daily bars and company metadata from a market data provider.
#[async_trait]
pub trait DataProvider {
    /// Fetches daily bars for the given request.
    ///
    /// # Returns
    ///
    /// * `Ok(bars)` - Bars in ascending date order. An unknown ticker or an
    ///   empty range yields `Ok(vec![])`, not an error.
    /// * `Err(ProviderError)` - Transport or API failure.
    async fn fetch_bars(&self, request: &BarsRequest) -> Result<Vec<RawBar>, ProviderError>;

    /// Fetches descriptive metadata for `symbol`.
    ///
    /// Fields the provider does not know are reported as not available.
    async fn fetch_profile(&self, symbol: &str) -> Result<CompanyProfile, ProviderError>;
}

#[async_trait]
impl<P: DataProvider + Send + Sync + ?Sized> DataProvider for Box<P> {
    async fn fetch_bars(&self, request: &BarsRequest) -> Result<Vec<RawBar>, ProviderError> {
        (**self).fetch_bars(request).await
    }

    async fn fetch_profile(&self, symbol: &str) -> Result<CompanyProfile, ProviderError> {
        (**self).fetch_profile(symbol).await
    }
}

/// Errors that can occur during the creation of a provider instance
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// missed environment variable.
    #[snafu(display("Missing environment variable: {source}"))]
    MissingEnvVar {
        source: MissingEnvVarError,
        backtrace: Backtrace,
    },

    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// API key contains invalid characters.
    #[snafu(display("Invalid API key format: {source}"))]
    InvalidApiKey {
        source: reqwest::header::InvalidHeaderValue,
        backtrace: Backtrace,
    },

    /// The CSV provider was selected without a data directory.
    #[snafu(display("The csv_dir provider needs `csv_dir` to be set"))]
    MissingCsvDir { backtrace: Backtrace },
}

/// Errors that can occur within a `DataProvider` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout).
    #[snafu(display("API request failed: {source}"))]
    Reqwest {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The provider's API returned a specific error message (e.g., invalid API key).
    #[snafu(display("API error: {message}"))]
    Api {
        message: String,
        backtrace: Backtrace,
    },

    /// The request parameters were invalid for this specific provider.
    #[snafu(display("Invalid parameters for provider: {message}"))]
    Validation {
        message: String,
        backtrace: Backtrace,
    },

    /// The provider answered with a payload we could not interpret.
    #[snafu(display("Malformed provider payload: {message}"))]
    Decode {
        message: String,
        backtrace: Backtrace,
    },

    /// Reading local provider data failed.
    #[snafu(display("Failed to read {}: {source}", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// An error during provider configuration or initialization.
    #[snafu(display("Provider initialization error: {source}"))]
    Init {
        #[snafu(backtrace)]
        source: ProviderInitError,
    },
}

impl From<reqwest::Error> for ProviderError {
    fn from(source: reqwest::Error) -> Self {
        ReqwestSnafu.into_error(source)
    }
}

impl From<ProviderInitError> for ProviderError {
    fn from(source: ProviderInitError) -> Self {
        InitSnafu.into_error(source)
    }
}

/// Which upstream to use (serde snake_case).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Yahoo Finance chart and quote-summary endpoints.
    #[default]
    Yahoo,
    /// Alpaca market data API (bars only).
    Alpaca,
    /// A local directory of CSV exports.
    CsvDir,
}

fn default_chart_url() -> String {
    yahoo_rest::CHART_URL.to_string()
}

fn default_quote_summary_url() -> String {
    yahoo_rest::QUOTE_SUMMARY_URL.to_string()
}

fn default_alpaca_url() -> String {
    alpaca_rest::BASE_URL.to_string()
}

fn default_user_agent() -> String {
    concat!("stock-dashboard/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_requests_per_second() -> NonZeroU32 {
    nonzero!(2u32)
}

/// Provider selection and connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default)]
    pub kind: ProviderKind,
    #[serde(default = "default_chart_url")]
    pub chart_url: String,
    #[serde(default = "default_quote_summary_url")]
    pub quote_summary_url: String,
    #[serde(default = "default_alpaca_url")]
    pub alpaca_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: NonZeroU32,
    /// Data directory for [`ProviderKind::CsvDir`].
    #[serde(default)]
    pub csv_dir: Option<PathBuf>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            chart_url: default_chart_url(),
            quote_summary_url: default_quote_summary_url(),
            alpaca_url: default_alpaca_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            requests_per_second: default_requests_per_second(),
            csv_dir: None,
        }
    }
}

/// Build and return a boxed data provider corresponding to `settings.kind`.
pub fn build_provider(
    settings: &ProviderSettings,
) -> Result<Box<dyn DataProvider + Send + Sync>, ProviderInitError> {
    match settings.kind {
        ProviderKind::Yahoo => Ok(Box::new(yahoo_rest::YahooProvider::new(settings)?)),
        ProviderKind::Alpaca => Ok(Box::new(alpaca_rest::AlpacaProvider::new(settings)?)),
        ProviderKind::CsvDir => {
            let dir = settings
                .csv_dir
                .clone()
                .ok_or_else(|| MissingCsvDirSnafu.build())?;
            Ok(Box::new(csv_dir::CsvDirProvider::new(dir)))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    struct EmptyProvider;

    #[async_trait]
    impl DataProvider for EmptyProvider {
        async fn fetch_bars(&self, _request: &BarsRequest) -> Result<Vec<RawBar>, ProviderError> {
            Ok(vec![])
        }

        async fn fetch_profile(&self, symbol: &str) -> Result<CompanyProfile, ProviderError> {
            Ok(CompanyProfile::unavailable(symbol))
        }
    }

    #[tokio::test]
    async fn boxed_providers_dispatch() {
        let provider: Box<dyn DataProvider + Send + Sync> = Box::new(EmptyProvider);
        let today = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let request = BarsRequest::for_dates("ZZZZ", today, today, today);

        assert!(provider.fetch_bars(&request).await.unwrap().is_empty());
        assert_eq!(provider.fetch_profile("ZZZZ").await.unwrap().available_count(), 0);
    }

    #[test]
    fn settings_defaults_from_empty_object() {
        let settings: ProviderSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, ProviderSettings::default());
        assert_eq!(settings.kind, ProviderKind::Yahoo);
    }

    #[test]
    fn csv_dir_requires_directory() {
        let settings = ProviderSettings {
            kind: ProviderKind::CsvDir,
            ..Default::default()
        };
        assert!(matches!(
            build_provider(&settings),
            Err(ProviderInitError::MissingCsvDir { .. })
        ));
    }
}
