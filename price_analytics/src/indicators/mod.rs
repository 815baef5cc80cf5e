//! Technical indicators over a closing-price series.
//!
//! Numeric kernels work on `&[f64]` and return a vector of the same length
//! where NaN means "undefined". The series-level wrappers attach dates and
//! turn NaN into `None`, which is what the presentation layer consumes.

pub mod ewm;
pub mod macd;
pub mod moving_average;
pub mod rsi;

use chrono::NaiveDate;
use market_data_ingestor::models::bar_series::PriceSeries;
use serde::Serialize;

pub use ewm::{ewm_mean, span_to_alpha, window_to_alpha};
pub use macd::{MacdParams, MacdSeries, macd, macd_values};
pub use moving_average::{moving_average, rolling_mean};
pub use rsi::{OVERBOUGHT, OVERSOLD, RsiParams, RsiZone, rsi, rsi_values};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IndicatorError {
    #[error("invalid indicator parameter: {0}")]
    InvalidParameter(String),
}

/// One dated indicator value; `None` where the indicator is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// Indicator values aligned 1:1 with the dates of the input series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSeries {
    pub name: String,
    pub points: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Pair `values` with the dates of `series`. NaN becomes `None`.
    pub fn from_values(name: impl Into<String>, series: &PriceSeries, values: Vec<f64>) -> Self {
        let points = series
            .bars()
            .iter()
            .zip(values)
            .map(|(bar, v)| IndicatorPoint {
                date: bar.date,
                value: (!v.is_nan()).then_some(v),
            })
            .collect();
        Self {
            name: name.into(),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Value at the series tail, if defined.
    pub fn last_value(&self) -> Option<f64> {
        self.points.last().and_then(|p| p.value)
    }
}
