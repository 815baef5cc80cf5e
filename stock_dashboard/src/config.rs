//! `stock_dashboard.toml`: provider selection, analysis defaults and logging.
//!
//! Every field has a default, so an empty file (or no file at all) is a
//! valid configuration.

use std::{
    num::NonZeroUsize,
    ops::RangeInclusive,
    path::{Path, PathBuf},
};

use market_data_ingestor::providers::ProviderSettings;
use nonzero_ext::nonzero;
use price_analytics::{
    forecast::{ArimaOrder, ConfidenceLevel},
    indicators::{MacdParams, RsiParams},
};
use serde::{Deserialize, Serialize};
use shared_utils::config::{ConfigError, load_toml, parse_toml};
use tracing::debug;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "stock_dashboard.toml";

/// Accepted moving-average windows.
pub const MA_WINDOW_RANGE: RangeInclusive<usize> = 5..=200;
/// Accepted history look-back, in days.
pub const LOOKBACK_DAYS_RANGE: RangeInclusive<u32> = 30..=3650;
/// Accepted forecast horizons, in business days.
pub const FORECAST_DAYS_RANGE: RangeInclusive<usize> = 5..=60;

/// Whole configuration file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Market data provider.
    pub provider: ProviderSettings,
    /// Indicator and forecast parameters.
    pub analysis: AnalysisSettings,
    /// Log output.
    pub logging: LoggingSettings,
    /// CSV export location.
    pub export: ExportSettings,
}

/// Parameters of the analysis and prediction pages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Moving-average window.
    pub ma_window: NonZeroUsize,
    /// RSI smoothing window.
    pub rsi_window: NonZeroUsize,
    /// MACD fast span.
    pub macd_short: NonZeroUsize,
    /// MACD slow span.
    pub macd_long: NonZeroUsize,
    /// MACD signal span.
    pub macd_signal: NonZeroUsize,
    /// Days of history shown when no quick period is selected.
    pub lookback_days: u32,
    /// Business days to forecast.
    pub forecast_days: NonZeroUsize,
    /// Coverage of the forecast bands (80, 90, 95 or 99).
    pub confidence: ConfidenceLevel,
    /// Forecast model order.
    pub arima_order: ArimaOrder,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            ma_window: nonzero!(20usize),
            rsi_window: nonzero!(14usize),
            macd_short: nonzero!(12usize),
            macd_long: nonzero!(26usize),
            macd_signal: nonzero!(9usize),
            lookback_days: 365,
            forecast_days: nonzero!(30usize),
            confidence: ConfidenceLevel::default(),
            arima_order: ArimaOrder::default(),
        }
    }
}

impl AnalysisSettings {
    /// RSI parameters.
    pub fn rsi_params(&self) -> RsiParams {
        RsiParams {
            window: self.rsi_window,
        }
    }

    /// MACD parameters.
    pub fn macd_params(&self) -> MacdParams {
        MacdParams {
            short: self.macd_short,
            long: self.macd_long,
            signal: self.macd_signal,
        }
    }

    /// Check the ranges the pages offer.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !MA_WINDOW_RANGE.contains(&self.ma_window.get()) {
            return Err(out_of_range("ma_window", self.ma_window, &MA_WINDOW_RANGE));
        }
        if !LOOKBACK_DAYS_RANGE.contains(&self.lookback_days) {
            return Err(out_of_range("lookback_days", self.lookback_days, &LOOKBACK_DAYS_RANGE));
        }
        if !FORECAST_DAYS_RANGE.contains(&self.forecast_days.get()) {
            return Err(out_of_range("forecast_days", self.forecast_days, &FORECAST_DAYS_RANGE));
        }
        self.macd_params()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.arima_order.q != 0 {
            return Err(ConfigError::Invalid(format!(
                "arima_order {} has q != 0; only autoregressive models are supported",
                self.arima_order
            )));
        }
        Ok(())
    }
}

fn out_of_range<T: std::fmt::Display, R: std::fmt::Debug>(
    field: &str,
    value: T,
    range: &R,
) -> ConfigError {
    ConfigError::Invalid(format!("{field} = {value} is outside {range:?}"))
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive, e.g. `"info"` or `"stock_dashboard=debug"`.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// `[export]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Directory CSV files are written to.
    pub dir: PathBuf,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("exports"),
        }
    }
}

impl DashboardConfig {
    /// Load `path`, or [`DEFAULT_CONFIG_FILE`] if it exists, or the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config: Self = match path {
            Some(path) => load_toml(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => load_toml(DEFAULT_CONFIG_FILE)?,
            None => {
                debug!("no configuration file, using defaults");
                Self::default()
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = parse_toml(text, "<inline>")?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analysis.validate()?;
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::Invalid("provider.timeout_secs must be positive".into()));
        }
        Ok(())
    }

    /// The defaults as a TOML document.
    pub fn default_toml() -> Result<String, ConfigError> {
        toml::to_string_pretty(&Self::default()).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use market_data_ingestor::providers::ProviderKind;

    use super::*;

    #[test]
    fn empty_document_is_all_defaults() {
        let config = DashboardConfig::from_toml_str("").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.analysis.ma_window.get(), 20);
        assert_eq!(config.analysis.lookback_days, 365);
        assert_eq!(config.analysis.forecast_days.get(), 30);
        assert_eq!(config.analysis.arima_order, ArimaOrder::new(5, 1, 0));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn sections_override_defaults() {
        let config = DashboardConfig::from_toml_str(
            r#"
            [provider]
            kind = "csv_dir"
            csv_dir = "data"

            [analysis]
            ma_window = 50
            confidence = 80

            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.provider.kind, ProviderKind::CsvDir);
        assert_eq!(config.provider.csv_dir, Some(PathBuf::from("data")));
        assert_eq!(config.analysis.ma_window.get(), 50);
        assert_eq!(config.analysis.rsi_window.get(), 14);
        assert_eq!(config.analysis.confidence, ConfidenceLevel::P80);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn out_of_range_values_are_invalid() {
        for doc in [
            "[analysis]\nma_window = 4",
            "[analysis]\nma_window = 201",
            "[analysis]\nlookback_days = 29",
            "[analysis]\nforecast_days = 61",
            "[analysis]\nmacd_short = 26\nmacd_long = 12",
            "[analysis.arima_order]\np = 5\nd = 1\nq = 1",
        ] {
            assert!(
                matches!(DashboardConfig::from_toml_str(doc), Err(ConfigError::Invalid(_))),
                "{doc} should be rejected"
            );
        }
    }

    #[test]
    fn unknown_confidence_is_a_parse_error() {
        assert!(matches!(
            DashboardConfig::from_toml_str("[analysis]\nconfidence = 75"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn default_toml_parses_back() {
        let text = DashboardConfig::default_toml().unwrap();
        assert_eq!(DashboardConfig::from_toml_str(&text).unwrap(), DashboardConfig::default());
    }

    #[test]
    fn loads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dash.toml");
        std::fs::write(&path, "[analysis]\nlookback_days = 90\n").unwrap();
        let config = DashboardConfig::load(Some(&path)).unwrap();
        assert_eq!(config.analysis.lookback_days, 90);
    }
}
