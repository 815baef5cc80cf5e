//! Canonical in-memory representation of a daily price bar (OHLCV).
//!
//! Providers hand back [`RawBar`]s, whose numeric cells may be missing or
//! arrive as text. The series adapter ([`crate::normalize`]) coerces them into
//! [`PriceBar`]s, which is what every downstream computation consumes.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single numeric cell as delivered by a provider.
///
/// Deserializes from a JSON number, a JSON string, or `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

impl RawValue {
    /// Coerce the cell into a real number.
    ///
    /// Text is trimmed and parsed; anything that does not parse (including
    /// `Missing`) becomes NaN.
    pub fn to_f64(&self) -> f64 {
        match self {
            RawValue::Number(v) => *v,
            RawValue::Text(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
            RawValue::Missing => f64::NAN,
        }
    }

    /// Returns `true` when the cell coerces to a finite number.
    pub fn is_valid(&self) -> bool {
        self.to_f64().is_finite()
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<Option<f64>> for RawValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(RawValue::Missing, RawValue::Number)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        if value.trim().is_empty() {
            RawValue::Missing
        } else {
            RawValue::Text(value.to_string())
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(v) => write!(f, "{v}"),
            RawValue::Text(s) => f.write_str(s),
            RawValue::Missing => f.write_str("<missing>"),
        }
    }
}

/// A provider bar before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: RawValue,
    pub high: RawValue,
    pub low: RawValue,
    pub close: RawValue,
    pub volume: RawValue,
    /// Split/dividend adjusted close. Not all providers supply this.
    #[serde(default)]
    pub adj_close: Option<RawValue>,
}

impl RawBar {
    /// Convenience constructor for fully numeric bars.
    pub fn numeric(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open: open.into(),
            high: high.into(),
            low: low.into(),
            close: close.into(),
            volume: RawValue::Number(volume as f64),
            adj_close: None,
        }
    }
}

/// A single daily bar after normalization.
///
/// `close` may be NaN when the provider delivered an unusable value; the
/// indicator engine treats that as a gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Trading day this bar covers.
    pub date: NaiveDate,

    /// Opening price.
    pub open: f64,

    /// Highest price during the day.
    pub high: f64,

    /// Lowest price during the day.
    pub low: f64,

    /// Closing price.
    pub close: f64,

    /// Shares traded during the day.
    pub volume: u64,

    /// Adjusted close. Not all providers supply this.
    pub adj_close: Option<f64>,
}

impl PriceBar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
            adj_close: None,
        }
    }

    pub fn with_adj_close(mut self, adj_close: f64) -> Self {
        self.adj_close = Some(adj_close);
        self
    }
}
