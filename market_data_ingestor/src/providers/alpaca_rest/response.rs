use chrono::{DateTime, Utc};
use chrono_tz::America::New_York;
use indexmap::IndexMap;
use serde::Deserialize;

use crate::models::bar::{RawBar, RawValue};

#[derive(Deserialize, Debug)]
pub struct AlpacaBar {
    #[serde(rename = "t")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "o")]
    pub open: f64,
    #[serde(rename = "h")]
    pub high: f64,
    #[serde(rename = "l")]
    pub low: f64,
    #[serde(rename = "c")]
    pub close: f64,
    #[serde(rename = "v")]
    pub volume: f64,
}

impl From<AlpacaBar> for RawBar {
    /// Daily bars are stamped at midnight exchange time.
    fn from(ab: AlpacaBar) -> Self {
        RawBar {
            date: ab.timestamp.with_timezone(&New_York).date_naive(),
            open: RawValue::Number(ab.open),
            high: RawValue::Number(ab.high),
            low: RawValue::Number(ab.low),
            close: RawValue::Number(ab.close),
            volume: RawValue::Number(ab.volume),
            adj_close: None,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct AlpacaResponse {
    #[serde(default)]
    pub bars: Option<IndexMap<String, Vec<AlpacaBar>>>,
    pub next_page_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn parses_page_and_maps_to_exchange_dates() {
        let body = r#"{
            "bars": {"TSLA": [
                {"t": "2024-01-02T05:00:00Z", "o": 250.1, "h": 251.0, "l": 244.4, "c": 248.4, "v": 1045000, "n": 9000, "vw": 248.0}
            ]},
            "next_page_token": "abc"
        }"#;
        let page: AlpacaResponse = serde_json::from_str(body).unwrap();
        assert_eq!(page.next_page_token.as_deref(), Some("abc"));

        let bar: RawBar = page.bars.unwrap().swap_remove("TSLA").unwrap().remove(0).into();
        assert_eq!(bar.date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bar.close.to_f64(), 248.4);
        assert!(bar.adj_close.is_none());
    }

    #[test]
    fn unknown_symbol_page_is_empty() {
        let page: AlpacaResponse = serde_json::from_str(r#"{"bars": {}, "next_page_token": null}"#).unwrap();
        assert!(page.bars.unwrap().is_empty());
        let page: AlpacaResponse = serde_json::from_str(r#"{"bars": null}"#).unwrap();
        assert!(page.bars.is_none());
    }
}
