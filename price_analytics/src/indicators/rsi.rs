//! Relative strength index with Wilder smoothing.
//!
//! Where the smoothed loss is zero (or nothing is known yet) the ratio is
//! undefined and the index reports the neutral value 50.

use std::num::NonZeroUsize;

use market_data_ingestor::models::bar_series::PriceSeries;
use nonzero_ext::nonzero;
use serde::Serialize;

use super::{IndicatorSeries, ewm::ewm_mean, ewm::window_to_alpha};

/// Conventional overbought threshold.
pub const OVERBOUGHT: f64 = 70.0;
/// Conventional oversold threshold.
pub const OVERSOLD: f64 = 30.0;
/// Reported when the gain/loss ratio is undefined.
pub const NEUTRAL: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RsiParams {
    pub window: NonZeroUsize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self {
            window: nonzero!(14usize),
        }
    }
}

/// Threshold band an RSI value falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RsiZone {
    Oversold,
    Neutral,
    Overbought,
}

impl RsiZone {
    pub fn classify(value: f64) -> Self {
        if value >= OVERBOUGHT {
            RsiZone::Overbought
        } else if value <= OVERSOLD {
            RsiZone::Oversold
        } else {
            RsiZone::Neutral
        }
    }
}

/// RSI of `closes`; always defined and within `[0, 100]`.
pub fn rsi_values(closes: &[f64], window: NonZeroUsize) -> Vec<f64> {
    let n = closes.len();
    let mut gain = vec![f64::NAN; n];
    let mut loss = vec![f64::NAN; n];
    for i in 1..n {
        let delta = closes[i] - closes[i - 1];
        if !delta.is_nan() {
            gain[i] = delta.max(0.0);
            loss[i] = (-delta).max(0.0);
        }
    }

    let alpha = window_to_alpha(window);
    let avg_gain = ewm_mean(&gain, alpha);
    let avg_loss = ewm_mean(&loss, alpha);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(&g, &l)| {
            let rs = g / l;
            if l == 0.0 || !rs.is_finite() {
                NEUTRAL
            } else {
                100.0 - 100.0 / (1.0 + rs)
            }
        })
        .collect()
}

/// RSI of the series closes, named `RSI <window>`.
pub fn rsi(series: &PriceSeries, params: RsiParams) -> IndicatorSeries {
    IndicatorSeries::from_values(
        format!("RSI {}", params.window),
        series,
        rsi_values(&series.closes(), params.window),
    )
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::indicators::test_support::series_from_closes;

    #[test]
    fn first_value_and_flat_losses_are_neutral() {
        let out = rsi_values(&[100.0, 101.0, 102.0, 103.0], nonzero!(14usize));
        assert!(out.iter().all(|&v| v == NEUTRAL));
    }

    #[test]
    fn rising_series_with_one_dip_climbs_toward_100() {
        let mut closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        closes[2] = 99.0;
        let s = series_from_closes(&closes);
        let values = rsi(&s, RsiParams::default()).values();

        let tail: Vec<f64> = values.iter().skip(5).map(|v| v.unwrap()).collect();
        assert!(tail.windows(2).all(|w| w[1] > w[0]));
        assert!(tail[tail.len() - 1] > 95.0);
        assert_eq!(RsiZone::classify(tail[tail.len() - 1]), RsiZone::Overbought);
    }

    #[test]
    fn falling_series_is_oversold() {
        let closes: Vec<f64> = (0..30).map(|i| 200.0 - 2.0 * i as f64).collect();
        let out = rsi_values(&closes, nonzero!(14usize));
        // no gains at all
        assert_eq!(out[29], 0.0);
        assert_eq!(RsiZone::classify(out[29]), RsiZone::Oversold);
    }

    #[test]
    fn gaps_do_not_break_the_index() {
        let out = rsi_values(&[10.0, 11.0, f64::NAN, 9.0, 10.0], nonzero!(3usize));
        assert!(out.iter().all(|v| (0.0..=100.0).contains(v)));
    }

    proptest! {
        #[test]
        fn always_within_bounds(
            closes in proptest::collection::vec(0.01f64..10_000.0, 0..120),
            w in 1usize..30,
        ) {
            let out = rsi_values(&closes, NonZeroUsize::new(w).unwrap());
            prop_assert_eq!(out.len(), closes.len());
            prop_assert!(out.iter().all(|v| (0.0..=100.0).contains(v)));
            if let Some(first) = out.first() {
                prop_assert_eq!(*first, NEUTRAL);
            }
        }
    }
}
