//! Series adapter: turns provider [`RawBar`]s into a [`PriceSeries`].
//!
//! Numeric cells are coerced with [`RawValue::to_f64`]; an unparseable price
//! becomes NaN so rolling computations see a gap instead of a fabricated
//! value. Volume is coerced to a non-negative integer, defaulting to zero.
//! Ordering is validated, never repaired: unsorted or duplicate dates are
//! rejected so that a misbehaving provider cannot silently corrupt a chart.

use tracing::debug;

use crate::models::{
    bar::{PriceBar, RawBar, RawValue},
    bar_series::{PriceSeries, SeriesError},
};

/// Normalize raw provider bars for `symbol`.
///
/// # Errors
/// * [`SeriesError::Empty`] when `raw` holds no bars.
/// * [`SeriesError::Unsorted`] / [`SeriesError::DuplicateDate`] when dates are
///   not strictly ascending.
pub fn normalize(symbol: &str, raw: Vec<RawBar>) -> Result<PriceSeries, SeriesError> {
    let mut gaps = 0usize;
    let bars: Vec<PriceBar> = raw
        .into_iter()
        .map(|r| {
            let close = r.close.to_f64();
            if close.is_nan() {
                gaps += 1;
            }
            PriceBar {
                date: r.date,
                open: r.open.to_f64(),
                high: r.high.to_f64(),
                low: r.low.to_f64(),
                close,
                volume: coerce_volume(&r.volume),
                adj_close: r.adj_close.as_ref().map(RawValue::to_f64),
            }
        })
        .collect();

    if gaps > 0 {
        debug!(symbol, gaps, "closes coerced to NaN");
    }

    PriceSeries::new(symbol, bars)
}

fn coerce_volume(value: &RawValue) -> u64 {
    let v = value.to_f64();
    if v.is_finite() && v > 0.0 {
        v.round() as u64
    } else {
        0
    }
}
