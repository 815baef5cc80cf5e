use chrono::{Days, NaiveDate};
use market_data_ingestor::models::{bar::PriceBar, bar_series::PriceSeries};
use nonzero_ext::nonzero;
use price_analytics::{
    forecast::{ArimaOrder, forecast, forecast_candles, next_business_day},
    indicators::{MacdParams, RsiParams, macd, moving_average, rsi},
};

/// 40 daily closes rising linearly by 1.0 from 100.0.
fn linear_series() -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let bars = (0..40)
        .map(|i| {
            let close = 100.0 + i as f64;
            let date = start.checked_add_days(Days::new(i)).unwrap();
            PriceBar::new(date, close - 0.5, close + 1.0, close - 1.0, close, 1_000 + i)
        })
        .collect();
    PriceSeries::new("LIN", bars).unwrap()
}

#[test]
fn moving_average_tail_is_mean_of_last_window() {
    let series = linear_series();
    let ma = moving_average(&series, nonzero!(5usize));

    let expected = (135.0 + 136.0 + 137.0 + 138.0 + 139.0) / 5.0;
    assert_eq!(ma.last_value(), Some(expected));
    assert_eq!(ma.values().iter().filter(|v| v.is_none()).count(), 4);
}

#[test]
fn strictly_increasing_series_keeps_neutral_rsi() {
    // no losses at all, so the gain/loss ratio is never defined
    let values = rsi(&linear_series(), RsiParams::default()).values();
    assert!(values.iter().all(|v| *v == Some(50.0)));
}

#[test]
fn macd_histogram_trends_positive() {
    let out = macd(&linear_series(), MacdParams::default()).unwrap();
    let hist: Vec<f64> = out.histogram.values().into_iter().flatten().collect();

    assert_eq!(hist.len(), 40);
    assert!(hist[1..].iter().all(|h| *h > 0.0));
    for ((m, s), h) in out.macd.points.iter().zip(&out.signal.points).zip(&out.histogram.points) {
        assert_eq!(h.value.unwrap(), m.value.unwrap() - s.value.unwrap());
    }
}

#[test]
fn linear_series_forecast_has_thirty_business_days() {
    let series = linear_series();
    let f = forecast(&series, nonzero!(30usize), ArimaOrder::default()).unwrap();

    assert_eq!(f.points.len(), 30);
    // 2024-04-09 is a Tuesday
    assert_eq!(series.last_date(), NaiveDate::from_ymd_opt(2024, 4, 9).unwrap());
    assert_eq!(f.points[0].date, next_business_day(series.last_date()));
    let mut expected = series.last_date();
    for p in &f.points {
        expected = next_business_day(expected);
        assert_eq!(p.date, expected);
        assert!(p.predicted_close.is_finite());
    }

    let candles = forecast_candles(139.0, &f.points);
    assert_eq!(candles.len(), 30);
    assert_eq!(candles[0].open, 139.0);
}

#[test]
fn moving_average_table() {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let bars = [10.0, 12.0, 11.0, 15.0, 13.0]
        .iter()
        .enumerate()
        .map(|(i, &c)| PriceBar::new(start.checked_add_days(Days::new(i as u64)).unwrap(), c, c, c, c, 0))
        .collect();
    let series = PriceSeries::new("T", bars).unwrap();

    let table = moving_average(&series, nonzero!(3usize))
        .points
        .iter()
        .map(|p| match p.value {
            Some(v) => format!("{} {v}", p.date),
            None => format!("{} -", p.date),
        })
        .collect::<Vec<_>>()
        .join("\n");

    insta::assert_snapshot!(table, @r"
    2024-01-01 -
    2024-01-02 -
    2024-01-03 11
    2024-01-04 12.666666666666666
    2024-01-05 13
    ");
}
