use chrono::{Days, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::request_params::BarsRequest;

/// Specifies the corporate action adjustment for stock data.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    #[default]
    Raw,
    Split,
    Dividend,
    All,
}

impl Adjustment {
    fn as_str(&self) -> &'static str {
        match self {
            Adjustment::Raw => "raw",
            Adjustment::Split => "split",
            Adjustment::Dividend => "dividend",
            Adjustment::All => "all",
        }
    }
}

/// Specifies the source feed for stock data.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Feed {
    Sip,
    /// Free-plan feed.
    #[default]
    Iex,
    Otc,
}

impl Feed {
    fn as_str(&self) -> &'static str {
        match self {
            Feed::Sip => "sip",
            Feed::Iex => "iex",
            Feed::Otc => "otc",
        }
    }
}

/// Specifies the sort order for the bars.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sort {
    #[default]
    Asc,
    Desc,
}

/// Alpaca-specific parameters for a bars request.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AlpacaBarsParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustment: Option<Adjustment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed: Option<Feed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

fn day_start(date: NaiveDate) -> String {
    date.and_time(NaiveTime::MIN).and_utc().to_rfc3339()
}

/// Build the query string for one page of a daily bars request.
///
/// The end of the range is inclusive, so the query runs to midnight of the
/// following day. Results are always sorted ascending.
pub(crate) fn construct_params(
    request: &BarsRequest,
    params: &AlpacaBarsParams,
) -> Vec<(String, String)> {
    let (start, end) = request.date_range();
    let end = end.checked_add_days(Days::new(1)).unwrap_or(end);

    let mut query = vec![
        ("symbols".to_string(), request.symbol.clone()),
        ("timeframe".to_string(), "1Day".to_string()),
        ("start".to_string(), day_start(start)),
        ("end".to_string(), day_start(end)),
        ("sort".to_string(), "asc".to_string()),
        (
            "adjustment".to_string(),
            params.adjustment.unwrap_or_default().as_str().to_string(),
        ),
        (
            "feed".to_string(),
            params.feed.unwrap_or_default().as_str().to_string(),
        ),
    ];
    if let Some(limit) = params.limit {
        query.push(("limit".to_string(), limit.to_string()));
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_range_is_inclusive_of_end() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let request = BarsRequest::for_dates("TSLA", start, end, end);

        let query = construct_params(&request, &AlpacaBarsParams::default());
        let get = |k: &str| {
            query
                .iter()
                .find(|(key, _)| key == k)
                .map(|(_, v)| v.as_str())
                .unwrap()
        };

        assert_eq!(get("symbols"), "TSLA");
        assert_eq!(get("timeframe"), "1Day");
        assert_eq!(get("start"), "2024-01-02T00:00:00+00:00");
        assert_eq!(get("end"), "2024-02-01T00:00:00+00:00");
        assert_eq!(get("feed"), "iex");
        assert!(query.iter().all(|(k, _)| k != "limit"));
    }
}
