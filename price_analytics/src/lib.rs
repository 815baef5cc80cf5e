//! Numeric core of the dashboard.
//!
//! - [`indicators`]: moving average, RSI and MACD over a closing-price series.
//! - [`forecast`]: ARIMA(p, d, 0) fit by exact maximum likelihood and
//!   multi-step business-day forecasts.
//!
//! Everything here is pure and deterministic: the same series and
//! parameters always produce bit-identical output.

pub mod forecast;
pub mod indicators;
