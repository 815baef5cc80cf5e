//! Report structs handed to the presentation layer, and their plain-text
//! rendering for the command line.

use std::{
    fmt::{self, Write as _},
    num::NonZeroUsize,
};

use market_data_ingestor::models::{
    bar::PriceBar,
    bar_series::{CloseSummary, PriceSeries},
    profile::{CompanyProfile, ProfileField},
};
use price_analytics::{
    forecast::{ConfidenceLevel, Forecast, ForecastCandle, ModelFitError},
    indicators::{IndicatorSeries, MacdSeries, RsiZone},
};
use crate::validation::{ChartType, DateRange};

/// Indicator rows printed under the chart.
const INDICATOR_TAIL: usize = 5;

/// Price data behind the history chart.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryView {
    /// Quick-period code or `<days>d`.
    pub label: String,
    /// Bars to draw.
    pub series: PriceSeries,
    /// `true` when the history fetch failed and `series` is the primary range.
    pub fell_back: bool,
}

/// Indicator computed for the history chart.
#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorOutput {
    /// No indicator selected.
    None,
    /// Moving average of the close.
    MovingAverage(IndicatorSeries),
    /// Relative strength index.
    Rsi(IndicatorSeries),
    /// MACD with signal and histogram.
    Macd(MacdSeries),
}

/// Everything the analysis page shows.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    /// Normalized ticker.
    pub symbol: String,
    /// Range the user selected.
    pub range: DateRange,
    /// Company metadata.
    pub profile: CompanyProfile,
    /// Bars in the selected range.
    pub series: PriceSeries,
    /// Latest close and daily change.
    pub summary: CloseSummary,
    /// Last rows of `series`, rounded to three decimals.
    pub recent: Vec<PriceBar>,
    /// Requested chart style.
    pub chart: ChartType,
    /// Data for the history chart.
    pub history: HistoryView,
    /// Indicator computed on the history chart data.
    pub indicator: IndicatorOutput,
}

/// Everything the prediction page shows.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionReport {
    /// Normalized ticker.
    pub symbol: String,
    /// Range the model was fit on.
    pub range: DateRange,
    /// Bars in the range.
    pub series: PriceSeries,
    /// Latest close and daily change.
    pub summary: CloseSummary,
    /// Business days forecast.
    pub horizon: NonZeroUsize,
    /// Coverage of the printed bands.
    pub confidence: ConfidenceLevel,
    /// The forecast, or why the model could not be fit.
    pub forecast: Result<Forecast, ModelFitError>,
    /// Candlestick rendering of the forecast; empty when it failed.
    pub candles: Vec<ForecastCandle>,
}

fn fmt_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{value:.3}")
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

fn write_profile_table(out: &mut impl fmt::Write, title: &str, profile: &CompanyProfile, fields: &[ProfileField]) -> fmt::Result {
    writeln!(out, "{title}")?;
    for (label, value) in profile.rows(fields) {
        writeln!(out, "  {label:<18} {value}")?;
    }
    Ok(())
}

fn write_bars(out: &mut impl fmt::Write, bars: &[PriceBar]) -> fmt::Result {
    writeln!(
        out,
        "  {:<10} {:>10} {:>10} {:>10} {:>10} {:>12}",
        "Date", "Open", "High", "Low", "Close", "Volume"
    )?;
    for bar in bars {
        writeln!(
            out,
            "  {:<10} {:>10} {:>10} {:>10} {:>10} {:>12}",
            bar.date.to_string(),
            fmt_value(bar.open),
            fmt_value(bar.high),
            fmt_value(bar.low),
            fmt_value(bar.close),
            bar.volume
        )?;
    }
    Ok(())
}

fn write_indicator_tail(out: &mut impl fmt::Write, series: &[&IndicatorSeries]) -> fmt::Result {
    let Some(first) = series.first() else {
        return Ok(());
    };
    write!(out, "  {:<10}", "Date")?;
    for s in series {
        write!(out, " {:>12}", s.name)?;
    }
    writeln!(out)?;

    let start = first.len().saturating_sub(INDICATOR_TAIL);
    for i in start..first.len() {
        write!(out, "  {:<10}", first.points[i].date.to_string())?;
        for s in series {
            write!(out, " {:>12}", fmt_opt(s.points.get(i).and_then(|p| p.value)))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_change(out: &mut impl fmt::Write, summary: &CloseSummary) -> fmt::Result {
    writeln!(out, "Current Close: {:.2} ({:+.2})", summary.current, summary.change)
}

/// Plain-text rendering of every section.
impl fmt::Display for AnalysisReport {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(out, "== {} ({} to {}) ==", self.symbol, self.range.start(), self.range.end())?;
        for field in [
            ProfileField::Sector,
            ProfileField::FullTimeEmployees,
            ProfileField::Website,
        ] {
            writeln!(out, "{}: {}", field.label(), self.profile.get(field))?;
        }
        writeln!(out, "{}", self.profile.get(ProfileField::LongBusinessSummary))?;
        writeln!(out)?;
        write_profile_table(out, "Key Financials", &self.profile, &ProfileField::KEY_FINANCIALS)?;
        write_profile_table(out, "Ratios & Margins", &self.profile, &ProfileField::RATIOS)?;
        writeln!(out)?;

        write_change(out, &self.summary)?;
        writeln!(out, "Recent data")?;
        write_bars(out, &self.recent)?;
        writeln!(out)?;

        let h = &self.history;
        write!(
            out,
            "History [{}] {} chart, {} bars {} to {}",
            h.label,
            self.chart,
            h.series.len(),
            h.series.first_date(),
            h.series.last_date()
        )?;
        if h.fell_back {
            write!(out, " (history unavailable, showing the selected range)")?;
        }
        writeln!(out)?;

        match &self.indicator {
            IndicatorOutput::None => {}
            IndicatorOutput::MovingAverage(ma) => write_indicator_tail(out, &[ma])?,
            IndicatorOutput::Rsi(rsi) => {
                write_indicator_tail(out, &[rsi])?;
                if let Some(last) = rsi.last_value() {
                    writeln!(out, "  latest {last:.2}: {:?}", RsiZone::classify(last))?;
                }
            }
            IndicatorOutput::Macd(m) => write_indicator_tail(out, &[&m.macd, &m.signal, &m.histogram])?,
        }
        Ok(())
    }
}

/// Plain-text rendering: close, forecast table and model summary.
impl fmt::Display for PredictionReport {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(out, "== {} ({} to {}) ==", self.symbol, self.range.start(), self.range.end())?;
        write_change(out, &self.summary)?;
        writeln!(out, "{} bars", self.series.len())?;
        writeln!(out)?;

        let forecast = match &self.forecast {
            Ok(f) => f,
            Err(e) => return writeln!(out, "ARIMA model failed: {e}"),
        };

        let s = &forecast.summary;
        writeln!(out, "ARIMA{} {}-day forecast", s.order, self.horizon)?;
        writeln!(
            out,
            "  {:<10} {:>16} {:>12} {:>12}",
            "Date",
            "Predicted_Close",
            format!("lower {}%", self.confidence.percent()),
            format!("upper {}%", self.confidence.percent())
        )?;
        for (point, band) in forecast.points.iter().zip(forecast.bands(self.confidence)) {
            writeln!(
                out,
                "  {:<10} {:>16.3} {:>12.3} {:>12.3}",
                point.date.to_string(),
                point.predicted_close,
                band.lower,
                band.upper
            )?;
        }
        writeln!(out)?;

        let coefficients: Vec<String> = s.ar_coefficients.iter().map(|c| format!("{c:.4}")).collect();
        writeln!(out, "AR coefficients: [{}]", coefficients.join(", "))?;
        writeln!(
            out,
            "sigma2 {:.4}  log-likelihood {:.3}  AIC {:.3}  nobs {}",
            s.sigma2, s.log_likelihood, s.aic, s.nobs
        )?;
        if !s.converged {
            writeln!(out, "optimizer stopped after {} iterations without converging", s.iterations)?;
        }
        Ok(())
    }
}
