use std::num::NonZeroUsize;

use market_data_ingestor::models::bar_series::PriceSeries;
use nonzero_ext::nonzero;
use serde::Serialize;

use super::{IndicatorError, IndicatorSeries, ewm::ewm_mean, ewm::span_to_alpha};

/// EMA spans for MACD. `short` must be strictly less than `long`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacdParams {
    pub short: NonZeroUsize,
    pub long: NonZeroUsize,
    pub signal: NonZeroUsize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            short: nonzero!(12usize),
            long: nonzero!(26usize),
            signal: nonzero!(9usize),
        }
    }
}

impl MacdParams {
    pub fn validate(&self) -> Result<(), IndicatorError> {
        if self.short >= self.long {
            return Err(IndicatorError::InvalidParameter(format!(
                "MACD short span ({}) must be less than long span ({})",
                self.short, self.long
            )));
        }
        Ok(())
    }
}

/// MACD line, signal line and histogram, each aligned with the input dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacdSeries {
    pub macd: IndicatorSeries,
    pub signal: IndicatorSeries,
    pub histogram: IndicatorSeries,
}

/// Raw `(macd, signal, histogram)` vectors.
pub fn macd_values(closes: &[f64], params: MacdParams) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>), IndicatorError> {
    params.validate()?;

    let short = ewm_mean(closes, span_to_alpha(params.short));
    let long = ewm_mean(closes, span_to_alpha(params.long));
    let line: Vec<f64> = short.iter().zip(&long).map(|(s, l)| s - l).collect();
    let signal = ewm_mean(&line, span_to_alpha(params.signal));
    let histogram = line.iter().zip(&signal).map(|(m, s)| m - s).collect();

    Ok((line, signal, histogram))
}

pub fn macd(series: &PriceSeries, params: MacdParams) -> Result<MacdSeries, IndicatorError> {
    let (line, signal, histogram) = macd_values(&series.closes(), params)?;
    Ok(MacdSeries {
        macd: IndicatorSeries::from_values("MACD", series, line),
        signal: IndicatorSeries::from_values("Signal", series, signal),
        histogram: IndicatorSeries::from_values("Histogram", series, histogram),
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::indicators::test_support::series_from_closes;

    #[test]
    fn rejects_short_not_below_long() {
        let params = MacdParams {
            short: nonzero!(26usize),
            long: nonzero!(26usize),
            signal: nonzero!(9usize),
        };
        assert!(matches!(
            macd_values(&[1.0, 2.0], params),
            Err(IndicatorError::InvalidParameter(_))
        ));
    }

    #[test]
    fn first_point_is_zero() {
        let (line, signal, hist) = macd_values(&[50.0, 51.0, 52.0], MacdParams::default()).unwrap();
        assert_eq!((line[0], signal[0], hist[0]), (0.0, 0.0, 0.0));
    }

    #[test]
    fn linear_uptrend_has_positive_rising_macd() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let out = macd(&series_from_closes(&closes), MacdParams::default()).unwrap();

        let line: Vec<f64> = out.macd.values().into_iter().map(Option::unwrap).collect();
        let hist: Vec<f64> = out.histogram.values().into_iter().map(Option::unwrap).collect();
        assert!(line[1..].iter().all(|&v| v > 0.0));
        assert!(line.windows(2).all(|w| w[1] > w[0]));
        assert!(hist[1..].iter().all(|&v| v > 0.0));
        assert_eq!(out.macd.len(), 40);
    }

    proptest! {
        #[test]
        fn histogram_is_macd_minus_signal(
            closes in proptest::collection::vec(1.0f64..1_000.0, 1..100),
        ) {
            let (line, signal, hist) = macd_values(&closes, MacdParams::default()).unwrap();
            for i in 0..closes.len() {
                prop_assert_eq!(hist[i], line[i] - signal[i]);
            }
        }

        #[test]
        fn deterministic(closes in proptest::collection::vec(1.0f64..1_000.0, 1..60)) {
            let a = macd_values(&closes, MacdParams::default()).unwrap();
            let b = macd_values(&closes, MacdParams::default()).unwrap();
            prop_assert!(a.0.iter().zip(&b.0).all(|(x, y)| x.to_bits() == y.to_bits()));
            prop_assert!(a.2.iter().zip(&b.2).all(|(x, y)| x.to_bits() == y.to_bits()));
        }
    }
}
