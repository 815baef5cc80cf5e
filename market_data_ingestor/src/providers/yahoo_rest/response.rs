use chrono::{DateTime, NaiveDate};
use chrono_tz::{America::New_York, Tz};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    models::{
        bar::{RawBar, RawValue},
        profile::{CompanyProfile, FieldValue},
    },
    providers::{ApiSnafu, DecodeSnafu, ProviderError},
};

/// Error code Yahoo uses for unknown symbols.
const NOT_FOUND: &str = "Not Found";

#[derive(Deserialize, Debug)]
pub struct ChartEnvelope {
    pub chart: Chart,
}

#[derive(Deserialize, Debug)]
pub struct Chart {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Deserialize, Debug)]
pub struct ApiError {
    pub code: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize, Debug)]
pub struct ChartResult {
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Option<Vec<i64>>,
    pub indicators: Indicators,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    #[serde(default)]
    pub exchange_timezone_name: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<Quote>,
    #[serde(default)]
    pub adjclose: Option<Vec<AdjClose>>,
}

#[derive(Deserialize, Debug, Default)]
pub struct Quote {
    #[serde(default)]
    pub open: Vec<RawValue>,
    #[serde(default)]
    pub high: Vec<RawValue>,
    #[serde(default)]
    pub low: Vec<RawValue>,
    #[serde(default)]
    pub close: Vec<RawValue>,
    #[serde(default)]
    pub volume: Vec<RawValue>,
}

#[derive(Deserialize, Debug, Default)]
pub struct AdjClose {
    #[serde(default)]
    pub adjclose: Vec<RawValue>,
}

fn cell(values: &[RawValue], i: usize) -> RawValue {
    values.get(i).cloned().unwrap_or_default()
}

/// Extract daily bars from a chart payload.
///
/// An unknown symbol or a payload without results is an empty list.
pub fn chart_bars(envelope: ChartEnvelope) -> Result<Vec<RawBar>, ProviderError> {
    if let Some(err) = envelope.chart.error {
        if err.code == NOT_FOUND {
            debug!(description = %err.description, "symbol not found");
            return Ok(vec![]);
        }
        return ApiSnafu {
            message: format!("{}: {}", err.code, err.description),
        }
        .fail();
    }

    match envelope.chart.result.and_then(|r| r.into_iter().next()) {
        Some(result) => result_bars(result),
        None => Ok(vec![]),
    }
}

fn result_bars(result: ChartResult) -> Result<Vec<RawBar>, ProviderError> {
    let tz: Tz = result
        .meta
        .exchange_timezone_name
        .as_deref()
        .and_then(|name| name.parse().ok())
        .unwrap_or(New_York);

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adj = result
        .indicators
        .adjclose
        .and_then(|a| a.into_iter().next())
        .map(|a| a.adjclose);

    let mut bars: Vec<RawBar> = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.into_iter().enumerate() {
        let date = exchange_date(ts, tz)?;
        let bar = RawBar {
            date,
            open: cell(&quote.open, i),
            high: cell(&quote.high, i),
            low: cell(&quote.low, i),
            close: cell(&quote.close, i),
            volume: cell(&quote.volume, i),
            adj_close: adj.as_deref().map(|a| cell(a, i)),
        };

        // The live session can repeat the last trading day; keep the newer row.
        match bars.last_mut() {
            Some(last) if last.date == date => *last = bar,
            _ => bars.push(bar),
        }
    }
    Ok(bars)
}

fn exchange_date(ts: i64, tz: Tz) -> Result<NaiveDate, ProviderError> {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.with_timezone(&tz).date_naive())
        .ok_or_else(|| {
            DecodeSnafu {
                message: format!("timestamp out of range: {ts}"),
            }
            .build()
        })
}

/// Unwrap Yahoo's `{"raw": .., "fmt": ..}` wrappers.
fn field_value(value: &Value) -> FieldValue {
    match value {
        Value::Object(map) => map.get("raw").map_or(FieldValue::NotAvailable, FieldValue::from_json),
        other => FieldValue::from_json(other),
    }
}

/// Build a [`CompanyProfile`] from a quote-summary payload.
///
/// Every module in the result is searched for each field. Only Yahoo's
/// "Not Found" error yields an all-unavailable profile; any other error body,
/// including the top-level `finance.error` used for auth failures, is an error.
pub fn profile_from_summary(symbol: &str, payload: &Value) -> Result<CompanyProfile, ProviderError> {
    let summary = &payload["quoteSummary"];
    let modules = match summary["result"].as_array().and_then(|r| r.first()) {
        Some(Value::Object(modules)) => modules,
        _ => {
            let error = [&summary["error"], &payload["finance"]["error"]]
                .into_iter()
                .find(|e| e.is_object());
            let Some(error) = error else {
                return DecodeSnafu {
                    message: format!("quote summary for {symbol} has neither a result nor an error"),
                }
                .fail();
            };
            let code = error["code"].as_str().unwrap_or_default();
            if code == NOT_FOUND {
                return Ok(CompanyProfile::unavailable(symbol));
            }
            return ApiSnafu {
                message: format!("{code}: {}", error["description"].as_str().unwrap_or_default()),
            }
            .fail();
        }
    };

    Ok(CompanyProfile::from_lookup(symbol, |field| {
        modules
            .values()
            .filter_map(|module| module.get(field.key()))
            .map(field_value)
            .find(FieldValue::is_available)
    }))
}
