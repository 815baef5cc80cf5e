//! Synthetic candles for drawing a forecast as a candlestick chart.
//!
//! These carry no statistical meaning: the open is the previous predicted
//! close (the last observed close for the first candle) and high/low are a
//! fixed 1% band around the predicted close.

use chrono::NaiveDate;
use serde::Serialize;

use super::ForecastPoint;

/// Relative half-width of the high/low band.
pub const BAND: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastCandle {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

pub fn forecast_candles(last_close: f64, points: &[ForecastPoint]) -> Vec<ForecastCandle> {
    let mut open = last_close;
    points
        .iter()
        .map(|p| {
            let candle = ForecastCandle {
                date: p.date,
                open,
                high: p.predicted_close * (1.0 + BAND),
                low: p.predicted_close * (1.0 - BAND),
                close: p.predicted_close,
            };
            open = p.predicted_close;
            candle
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_chain_from_last_close() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 6, day).unwrap();
        let points = [
            ForecastPoint {
                date: d(10),
                predicted_close: 100.0,
            },
            ForecastPoint {
                date: d(11),
                predicted_close: 102.0,
            },
        ];
        let candles = forecast_candles(98.0, &points);

        assert_eq!(candles[0].open, 98.0);
        assert_eq!(candles[1].open, 100.0);
        assert_eq!(candles[1].close, 102.0);
        assert!((candles[1].high - 103.02).abs() < 1e-9);
        assert!((candles[1].low - 100.98).abs() < 1e-9);
    }
}
