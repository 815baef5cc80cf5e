use std::num::NonZeroUsize;

use market_data_ingestor::models::bar_series::PriceSeries;

use super::IndicatorSeries;

/// Simple rolling mean over `window` values.
///
/// Position `i` is defined when `i >= window - 1` and none of the values in
/// `[i - window + 1, i]` is NaN.
pub fn rolling_mean(values: &[f64], window: NonZeroUsize) -> Vec<f64> {
    let w = window.get();
    let mut out = vec![f64::NAN; values.len()];
    if values.len() < w {
        return out;
    }

    for (i, slot) in out.iter_mut().enumerate().skip(w - 1) {
        let win = &values[i + 1 - w..=i];
        if win.iter().any(|v| v.is_nan()) {
            continue;
        }
        *slot = win.iter().sum::<f64>() / w as f64;
    }
    out
}

/// Moving average of closes, named `MA <window>`.
pub fn moving_average(series: &PriceSeries, window: NonZeroUsize) -> IndicatorSeries {
    IndicatorSeries::from_values(format!("MA {window}"), series, rolling_mean(&series.closes(), window))
}
