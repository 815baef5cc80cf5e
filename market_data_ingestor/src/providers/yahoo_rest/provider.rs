use std::time::Duration;

use async_trait::async_trait;
use chrono::{Days, NaiveDate, NaiveTime};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use snafu::ResultExt;
use tracing::{debug, instrument, warn};

use crate::{
    models::{
        bar::RawBar,
        profile::CompanyProfile,
        request_params::{BarsRequest, RequestSpan},
    },
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, DecodeSnafu, ProviderError, ProviderInitError,
        ProviderSettings,
        yahoo_rest::response::{ChartEnvelope, chart_bars, profile_from_summary},
    },
};

pub const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
pub const QUOTE_SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";

const PROFILE_MODULES: &str = "assetProfile,summaryDetail,defaultKeyStatistics,financialData";

pub struct YahooProvider {
    client: Client,
    chart_url: String,
    quote_summary_url: String,
    limiter: DefaultDirectRateLimiter,
}

impl YahooProvider {
    pub fn new(settings: &ProviderSettings) -> Result<Self, ProviderInitError> {
        let client = Client::builder()
            .user_agent(&settings.user_agent)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            chart_url: settings.chart_url.trim_end_matches('/').to_string(),
            quote_summary_url: settings.quote_summary_url.trim_end_matches('/').to_string(),
            limiter: RateLimiter::direct(Quota::per_second(settings.requests_per_second)),
        })
    }

    async fn get_text(&self, url: &str, query: &[(String, String)]) -> Result<(StatusCode, String), ProviderError> {
        self.limiter.until_ready().await;
        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }
}

fn epoch_seconds(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Query parameters for a daily chart request.
///
/// Quick periods map onto Yahoo's `range` codes; explicit dates become an
/// epoch window whose upper bound is exclusive, so it is pushed one day out.
pub fn chart_query(request: &BarsRequest) -> Vec<(String, String)> {
    let mut query = vec![
        ("interval".to_string(), "1d".to_string()),
        ("includeAdjustedClose".to_string(), "true".to_string()),
    ];
    match request.span {
        RequestSpan::Period(period) => {
            query.push(("range".to_string(), period.as_str().to_string()));
        }
        RequestSpan::Dates { start, end } => {
            let end = end.checked_add_days(Days::new(1)).unwrap_or(end);
            query.push(("period1".to_string(), epoch_seconds(start).to_string()));
            query.push(("period2".to_string(), epoch_seconds(end).to_string()));
        }
    }
    query
}

/// Interpret a quote-summary response.
///
/// 404 carries Yahoo's "Not Found" body and is decoded; any other
/// non-success status fails, quoting the body's error when it has one.
fn profile_response(symbol: &str, status: StatusCode, body: &str) -> Result<CompanyProfile, ProviderError> {
    let payload = serde_json::from_str::<serde_json::Value>(body);
    if !status.is_success() && status != StatusCode::NOT_FOUND {
        let detail = payload
            .ok()
            .and_then(|p| profile_from_summary(symbol, &p).err())
            .map_or_else(|| truncated(body).to_string(), |e| e.to_string());
        return ApiSnafu {
            message: format!("HTTP {status}: {detail}"),
        }
        .fail();
    }
    let payload = payload.map_err(|e| {
        DecodeSnafu {
            message: e.to_string(),
        }
        .build()
    })?;
    profile_from_summary(symbol, &payload)
}

fn truncated(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[async_trait]
impl DataProvider for YahooProvider {
    #[instrument(name = "yahoo_bars", skip(self), fields(symbol = %request.symbol))]
    async fn fetch_bars(&self, request: &BarsRequest) -> Result<Vec<RawBar>, ProviderError> {
        let url = format!("{}/{}", self.chart_url, request.symbol);
        let (status, body) = self.get_text(&url, &chart_query(request)).await?;

        // Unknown symbols come back as 404 with a regular chart error body.
        let envelope: ChartEnvelope = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return ApiSnafu {
                    message: format!("HTTP {status}: {}", truncated(&body)),
                }
                .fail();
            }
            Err(e) => {
                return DecodeSnafu {
                    message: e.to_string(),
                }
                .fail();
            }
        };

        let mut bars = chart_bars(envelope)?;
        if let RequestSpan::Dates { start, end } = request.span {
            bars.retain(|b| b.date >= start && b.date <= end);
        }
        if bars.is_empty() {
            warn!("provider returned no bars");
        } else {
            debug!(rows = bars.len(), "fetched bars");
        }
        Ok(bars)
    }

    #[instrument(name = "yahoo_profile", skip(self))]
    async fn fetch_profile(&self, symbol: &str) -> Result<CompanyProfile, ProviderError> {
        let url = format!("{}/{}", self.quote_summary_url, symbol);
        let query = [("modules".to_string(), PROFILE_MODULES.to_string())];
        let (status, body) = self.get_text(&url, &query).await?;

        let profile = profile_response(symbol, status, &body)?;
        debug!(available = profile.available_count(), "fetched profile");
        Ok(profile)
    }
}
