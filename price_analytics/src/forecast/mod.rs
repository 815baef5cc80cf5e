//! Closing-price forecasts from an ARIMA(p, d, 0) model.
//!
//! [`forecast`] drops NaN closes, fits the model with [`arima::fit`] and
//! dates each step on the business days after the last observed bar.

pub mod arima;
pub mod calendar;
pub mod candles;
pub mod likelihood;
pub mod optimizer;

use std::num::NonZeroUsize;

use chrono::NaiveDate;
use market_data_ingestor::models::bar_series::PriceSeries;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use arima::{ArimaFit, ArimaOrder, MIN_OBSERVATIONS};
pub use calendar::{business_days_after, next_business_day};
pub use candles::{ForecastCandle, forecast_candles};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelFitError {
    #[error("need at least {required} observations to fit the model, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("non-finite value at observation {index}")]
    NonFiniteInput { index: usize },

    #[error("ARIMA{order} is not supported: only q = 0 can be fit")]
    UnsupportedOrder { order: ArimaOrder },

    #[error("differenced series has zero variance")]
    Singular,

    #[error("model optimization failed: {message}")]
    Optimization { message: String },
}

/// Two-sided coverage of the prediction bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ConfidenceLevel {
    P80,
    P90,
    #[default]
    P95,
    P99,
}

impl ConfidenceLevel {
    /// Standard normal quantile for the level.
    pub const fn z(&self) -> f64 {
        match self {
            ConfidenceLevel::P80 => 1.281_551_565_544_600_4,
            ConfidenceLevel::P90 => 1.644_853_626_951_472_2,
            ConfidenceLevel::P95 => 1.959_963_984_540_054,
            ConfidenceLevel::P99 => 2.575_829_303_548_900_4,
        }
    }

    pub const fn percent(&self) -> u8 {
        match self {
            ConfidenceLevel::P80 => 80,
            ConfidenceLevel::P90 => 90,
            ConfidenceLevel::P95 => 95,
            ConfidenceLevel::P99 => 99,
        }
    }
}

impl TryFrom<u8> for ConfidenceLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            80 => Ok(ConfidenceLevel::P80),
            90 => Ok(ConfidenceLevel::P90),
            95 => Ok(ConfidenceLevel::P95),
            99 => Ok(ConfidenceLevel::P99),
            other => Err(format!("unsupported confidence level {other}; use 80, 90, 95 or 99")),
        }
    }
}

impl From<ConfidenceLevel> for u8 {
    fn from(level: ConfidenceLevel) -> Self {
        level.percent()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted_close: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastBand {
    pub date: NaiveDate,
    pub lower: f64,
    pub upper: f64,
}

/// Fitted-model diagnostics shown next to a forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub order: ArimaOrder,
    pub ar_coefficients: Vec<f64>,
    pub sigma2: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    pub nobs: usize,
    pub iterations: usize,
    pub converged: bool,
}

impl From<&ArimaFit> for ModelSummary {
    fn from(fit: &ArimaFit) -> Self {
        Self {
            order: fit.order,
            ar_coefficients: fit.ar.clone(),
            sigma2: fit.sigma2,
            log_likelihood: fit.log_likelihood,
            aic: fit.aic(),
            nobs: fit.nobs,
            iterations: fit.iterations,
            converged: fit.converged,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub points: Vec<ForecastPoint>,
    /// Forecast standard error per point.
    pub std_errors: Vec<f64>,
    pub summary: ModelSummary,
}

impl Forecast {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Prediction interval around every point.
    pub fn bands(&self, level: ConfidenceLevel) -> Vec<ForecastBand> {
        let z = level.z();
        self.points
            .iter()
            .zip(&self.std_errors)
            .map(|(p, se)| ForecastBand {
                date: p.date,
                lower: p.predicted_close - z * se,
                upper: p.predicted_close + z * se,
            })
            .collect()
    }
}

/// Forecast the next `horizon` business-day closes of `series`.
///
/// NaN closes are dropped before fitting; dates continue from the last bar
/// of the series whether or not its close was valid.
pub fn forecast(
    series: &PriceSeries,
    horizon: NonZeroUsize,
    order: ArimaOrder,
) -> Result<Forecast, ModelFitError> {
    let closes: Vec<f64> = series.closes().into_iter().filter(|c| !c.is_nan()).collect();
    let dropped = series.len() - closes.len();
    if dropped > 0 {
        debug!(symbol = series.symbol(), dropped, "dropped NaN closes before fitting");
    }

    let fit = arima::fit(&closes, order)?;
    let steps = horizon.get();
    let dates = business_days_after(series.last_date(), steps);
    let points = dates
        .into_iter()
        .zip(fit.predict(steps))
        .map(|(date, predicted_close)| ForecastPoint { date, predicted_close })
        .collect();

    info!(symbol = series.symbol(), %order, horizon = steps, "forecast ready");
    Ok(Forecast {
        points,
        std_errors: fit.std_errors(steps),
        summary: ModelSummary::from(&fit),
    })
}

#[cfg(test)]
mod tests {
    use chrono::Datelike;
    use market_data_ingestor::models::bar::PriceBar;
    use nonzero_ext::nonzero;

    use super::*;

    fn business_series(closes: &[f64]) -> PriceSeries {
        let mut date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = closes
            .iter()
            .map(|&c| {
                let bar = PriceBar::new(date, c, c, c, c, 1);
                date = next_business_day(date);
                bar
            })
            .collect();
        PriceSeries::new("TEST", bars).unwrap()
    }

    fn wavy(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let t = i as f64;
                100.0 + 0.3 * t + 2.0 * (t * 0.7).sin() + 0.8 * (t * 1.9).cos()
            })
            .collect()
    }

    #[test]
    fn thirty_points_on_following_business_days() {
        let series = business_series(&wavy(60));
        let f = forecast(&series, nonzero!(30usize), ArimaOrder::default()).unwrap();

        assert_eq!(f.len(), 30);
        assert_eq!(f.points[0].date, next_business_day(series.last_date()));
        assert!(f.points.windows(2).all(|w| w[1].date > w[0].date));
        assert!(f.points.iter().all(|p| p.date.weekday().number_from_monday() <= 5));
        assert!(f.points.iter().all(|p| p.predicted_close.is_finite()));
    }

    #[test]
    fn bands_widen_with_horizon() {
        let series = business_series(&wavy(80));
        let f = forecast(&series, nonzero!(10usize), ArimaOrder::default()).unwrap();
        let bands = f.bands(ConfidenceLevel::P95);
        let widths: Vec<f64> = bands.iter().map(|b| b.upper - b.lower).collect();
        assert!(widths.windows(2).all(|w| w[1] >= w[0]));

        let narrow = f.bands(ConfidenceLevel::P80);
        assert!(narrow[0].upper - narrow[0].lower < widths[0]);
    }

    #[test]
    fn repeatable() {
        let series = business_series(&wavy(50));
        let a = forecast(&series, nonzero!(5usize), ArimaOrder::default()).unwrap();
        let b = forecast(&series, nonzero!(5usize), ArimaOrder::default()).unwrap();
        for (x, y) in a.points.iter().zip(&b.points) {
            assert!((x.predicted_close - y.predicted_close).abs() <= 1e-9);
        }
        assert_eq!(a.summary.order, ArimaOrder::default());
        assert_eq!(a.summary.ar_coefficients.len(), 5);
    }

    #[test]
    fn nan_closes_are_dropped_before_the_length_check() {
        let mut closes = wavy(31);
        closes[3] = f64::NAN;
        closes[4] = f64::NAN;
        let err = forecast(&business_series(&closes), nonzero!(1usize), ArimaOrder::default()).unwrap_err();
        assert_eq!(
            err,
            ModelFitError::InsufficientData {
                required: 30,
                actual: 29
            }
        );
    }

    #[test]
    fn confidence_level_from_percent() {
        assert_eq!(ConfidenceLevel::try_from(90), Ok(ConfidenceLevel::P90));
        assert!(ConfidenceLevel::try_from(75).is_err());
        assert_eq!(u8::from(ConfidenceLevel::default()), 95);
    }
}
