//! Errors surfaced to the user. Every failure of a request ends up as one of
//! these; none of them is fatal to the process.

use market_data_ingestor::{
    models::bar_series::SeriesError,
    providers::{ProviderError, ProviderInitError},
};
use price_analytics::{forecast::ModelFitError, indicators::IndicatorError};
use shared_utils::config::ConfigError;
use thiserror::Error;

/// Reportable failure of a dashboard request.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Malformed ticker, bad date range or an impossible chart selection.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The provider had no bars for the ticker and range.
    #[error("no historical price data found for {symbol} in the given date range")]
    NoDataFound {
        /// Normalized ticker.
        symbol: String,
    },

    /// The provider could not be reached or answered with an error.
    #[error("market data provider unavailable: {message}")]
    ProviderUnavailable {
        /// Underlying provider message.
        message: String,
    },

    /// The forecast model could not be fit.
    #[error("ARIMA model failed: {0}")]
    ModelFit(#[from] ModelFitError),

    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl DashboardError {
    /// Process exit code used by the command-line front end.
    pub fn exit_code(&self) -> u8 {
        match self {
            DashboardError::InvalidInput(_) => 2,
            DashboardError::NoDataFound { .. } => 3,
            DashboardError::ProviderUnavailable { .. } => 4,
            DashboardError::ModelFit(_) => 5,
            DashboardError::Config(_) => 6,
        }
    }
}

impl From<SeriesError> for DashboardError {
    fn from(err: SeriesError) -> Self {
        match err {
            SeriesError::Empty { symbol } => DashboardError::NoDataFound { symbol },
            other => DashboardError::InvalidInput(other.to_string()),
        }
    }
}

impl From<ProviderError> for DashboardError {
    fn from(err: ProviderError) -> Self {
        DashboardError::ProviderUnavailable {
            message: err.to_string(),
        }
    }
}

impl From<ProviderInitError> for DashboardError {
    fn from(err: ProviderInitError) -> Self {
        DashboardError::ProviderUnavailable {
            message: err.to_string(),
        }
    }
}

impl From<IndicatorError> for DashboardError {
    fn from(err: IndicatorError) -> Self {
        DashboardError::InvalidInput(err.to_string())
    }
}
