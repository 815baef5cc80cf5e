//! The two page pipelines.
//!
//! Both follow the same shape: validate, fetch, normalize, compute, and hand
//! back a report struct. Input problems are reported before the provider is
//! contacted.

use std::num::NonZeroUsize;

use chrono::{Days, NaiveDate};
use market_data_ingestor::{
    models::{
        bar::PriceBar,
        bar_series::{CloseSummary, PriceSeries},
        profile::CompanyProfile,
        request_params::BarsRequest,
    },
    normalize::normalize,
    providers::DataProvider,
};
use price_analytics::{
    forecast::{self, forecast_candles},
    indicators,
};
use tracing::{info, instrument, warn};

use crate::{
    config::{AnalysisSettings, FORECAST_DAYS_RANGE},
    errors::DashboardError,
    report::{AnalysisReport, HistoryView, IndicatorOutput, PredictionReport},
    session::Session,
    validation::{ChartType, DateRange, IndicatorKind, check_chart, normalize_ticker},
};

/// Rows shown in the "recent data" table.
pub const RECENT_ROWS: usize = 10;

/// Inputs of the analysis page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Ticker as typed by the user.
    pub ticker: String,
    /// First day of the primary range.
    pub start: NaiveDate,
    /// Last day of the primary range, inclusive.
    pub end: NaiveDate,
    /// Chart style.
    pub chart: ChartType,
    /// Indicator drawn with the chart.
    pub indicator: IndicatorKind,
    /// Reference date for quick periods and the look-back window.
    pub today: NaiveDate,
}

/// Inputs of the prediction page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRequest {
    /// Ticker as typed by the user.
    pub ticker: String,
    /// First day of the fitted range.
    pub start: NaiveDate,
    /// Last day of the fitted range, inclusive.
    pub end: NaiveDate,
    /// Business days to forecast; the configured default when `None`.
    pub horizon: Option<NonZeroUsize>,
    /// Reference date passed to the provider.
    pub today: NaiveDate,
}

/// Runs the pages against one provider.
#[derive(Debug)]
pub struct Dashboard<P> {
    provider: P,
    settings: AnalysisSettings,
}

impl<P: DataProvider + Send + Sync> Dashboard<P> {
    /// Dashboard with the given analysis parameters.
    pub fn new(provider: P, settings: AnalysisSettings) -> Self {
        Self { provider, settings }
    }

    /// The underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Analysis parameters in use.
    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    /// Company metadata for `ticker`.
    pub async fn profile(&self, ticker: &str) -> Result<CompanyProfile, DashboardError> {
        let symbol = normalize_ticker(ticker)?;
        Ok(self.provider.fetch_profile(&symbol).await?)
    }

    /// Build the analysis page.
    ///
    /// The profile and the primary range must load; the history chart falls
    /// back to the primary range when its own fetch fails or comes back empty.
    #[instrument(skip(self, session), fields(ticker = %request.ticker))]
    pub async fn analyze(
        &self,
        session: &Session,
        request: &AnalysisRequest,
    ) -> Result<AnalysisReport, DashboardError> {
        let symbol = normalize_ticker(&request.ticker)?;
        let range = DateRange::new(request.start, request.end)?;
        check_chart(request.chart, request.indicator)?;

        let profile = self.provider.fetch_profile(&symbol).await?;
        let series = self.fetch_range(&symbol, range, request.today).await?;
        let summary = close_summary(&series)?;
        let recent = series.tail(RECENT_ROWS).iter().map(round_bar).collect();

        let history = self.fetch_history(session, &series, request.today).await;
        let indicator = self.compute_indicator(request.indicator, &history.series)?;

        info!(
            symbol = %symbol,
            rows = series.len(),
            history_rows = history.series.len(),
            indicator = request.indicator.label(),
            "analysis ready"
        );
        Ok(AnalysisReport {
            symbol,
            range,
            profile,
            series,
            summary,
            recent,
            chart: request.chart,
            history,
            indicator,
        })
    }

    /// Build the prediction page.
    ///
    /// A model that cannot be fit does not fail the page: the error is kept
    /// in [`PredictionReport::forecast`] next to the historical data.
    #[instrument(skip(self), fields(ticker = %request.ticker))]
    pub async fn predict(&self, request: &PredictionRequest) -> Result<PredictionReport, DashboardError> {
        let symbol = normalize_ticker(&request.ticker)?;
        let range = DateRange::new(request.start, request.end)?;
        let horizon = request.horizon.unwrap_or(self.settings.forecast_days);
        if !FORECAST_DAYS_RANGE.contains(&horizon.get()) {
            return Err(DashboardError::InvalidInput(format!(
                "forecast horizon {horizon} is outside {FORECAST_DAYS_RANGE:?} business days"
            )));
        }

        let series = self.fetch_range(&symbol, range, request.today).await?;
        let summary = close_summary(&series)?;

        let forecast = forecast::forecast(&series, horizon, self.settings.arima_order);
        let candles = match &forecast {
            Ok(f) => forecast_candles(summary.current, &f.points),
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "forecast unavailable");
                Vec::new()
            }
        };

        Ok(PredictionReport {
            symbol,
            range,
            series,
            summary,
            horizon,
            confidence: self.settings.confidence,
            forecast,
            candles,
        })
    }

    async fn fetch_range(
        &self,
        symbol: &str,
        range: DateRange,
        today: NaiveDate,
    ) -> Result<PriceSeries, DashboardError> {
        let request = BarsRequest::for_dates(symbol, range.start(), range.end(), today);
        let raw = self.provider.fetch_bars(&request).await?;
        if raw.is_empty() {
            return Err(DashboardError::NoDataFound {
                symbol: symbol.to_string(),
            });
        }
        Ok(normalize(symbol, raw)?)
    }

    async fn fetch_history(&self, session: &Session, primary: &PriceSeries, today: NaiveDate) -> HistoryView {
        let symbol = primary.symbol();
        let label = session.history_label(self.settings.lookback_days);
        let request = match session.quick_period() {
            Some(period) => BarsRequest::for_period(symbol, period, today),
            None => {
                let start = today
                    .checked_sub_days(Days::new(u64::from(self.settings.lookback_days)))
                    .unwrap_or(today);
                BarsRequest::for_dates(symbol, start, today, today)
            }
        };

        let fetched = match self.provider.fetch_bars(&request).await {
            Ok(raw) => normalize(symbol, raw).map_err(DashboardError::from),
            Err(e) => Err(e.into()),
        };
        match fetched {
            Ok(series) => HistoryView {
                label,
                series,
                fell_back: false,
            },
            Err(error) => {
                warn!(symbol, %label, %error, "history unavailable, showing the selected range instead");
                HistoryView {
                    label,
                    series: primary.clone(),
                    fell_back: true,
                }
            }
        }
    }

    fn compute_indicator(
        &self,
        kind: IndicatorKind,
        series: &PriceSeries,
    ) -> Result<IndicatorOutput, DashboardError> {
        Ok(match kind {
            IndicatorKind::None => IndicatorOutput::None,
            IndicatorKind::MovingAverage => {
                IndicatorOutput::MovingAverage(indicators::moving_average(series, self.settings.ma_window))
            }
            IndicatorKind::Rsi => IndicatorOutput::Rsi(indicators::rsi(series, self.settings.rsi_params())),
            IndicatorKind::Macd => IndicatorOutput::Macd(indicators::macd(series, self.settings.macd_params())?),
        })
    }
}

fn close_summary(series: &PriceSeries) -> Result<CloseSummary, DashboardError> {
    series.close_summary().ok_or_else(|| DashboardError::NoDataFound {
        symbol: series.symbol().to_string(),
    })
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn round_bar(bar: &PriceBar) -> PriceBar {
    PriceBar {
        date: bar.date,
        open: round3(bar.open),
        high: round3(bar.high),
        low: round3(bar.low),
        close: round3(bar.close),
        volume: bar.volume,
        adj_close: bar.adj_close.map(round3),
    }
}
