//! Descriptive company metadata ("fundamentals") for a ticker.
//!
//! Every [`ProfileField`] is always present in a [`CompanyProfile`]; values the
//! provider could not supply are stored as [`FieldValue::NotAvailable`] and
//! render as `N/A`.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Marker rendered for fields the provider did not report.
pub const NOT_AVAILABLE: &str = "N/A";

/// Known company profile fields, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProfileField {
    LongBusinessSummary,
    Sector,
    FullTimeEmployees,
    Website,
    MarketCap,
    Beta,
    TrailingEps,
    #[serde(rename = "trailingPE")]
    TrailingPe,
    QuickRatio,
    RevenuePerShare,
    ProfitMargins,
    DebtToEquity,
    ReturnOnEquity,
}

impl ProfileField {
    pub const ALL: [ProfileField; 13] = [
        ProfileField::LongBusinessSummary,
        ProfileField::Sector,
        ProfileField::FullTimeEmployees,
        ProfileField::Website,
        ProfileField::MarketCap,
        ProfileField::Beta,
        ProfileField::TrailingEps,
        ProfileField::TrailingPe,
        ProfileField::QuickRatio,
        ProfileField::RevenuePerShare,
        ProfileField::ProfitMargins,
        ProfileField::DebtToEquity,
        ProfileField::ReturnOnEquity,
    ];

    /// Rows of the "key financials" table.
    pub const KEY_FINANCIALS: [ProfileField; 4] = [
        ProfileField::MarketCap,
        ProfileField::Beta,
        ProfileField::TrailingEps,
        ProfileField::TrailingPe,
    ];

    /// Rows of the "ratios & margins" table.
    pub const RATIOS: [ProfileField; 5] = [
        ProfileField::QuickRatio,
        ProfileField::RevenuePerShare,
        ProfileField::ProfitMargins,
        ProfileField::DebtToEquity,
        ProfileField::ReturnOnEquity,
    ];

    /// Key used by the provider payloads (Yahoo naming).
    pub const fn key(&self) -> &'static str {
        match self {
            ProfileField::LongBusinessSummary => "longBusinessSummary",
            ProfileField::Sector => "sector",
            ProfileField::FullTimeEmployees => "fullTimeEmployees",
            ProfileField::Website => "website",
            ProfileField::MarketCap => "marketCap",
            ProfileField::Beta => "beta",
            ProfileField::TrailingEps => "trailingEps",
            ProfileField::TrailingPe => "trailingPE",
            ProfileField::QuickRatio => "quickRatio",
            ProfileField::RevenuePerShare => "revenuePerShare",
            ProfileField::ProfitMargins => "profitMargins",
            ProfileField::DebtToEquity => "debtToEquity",
            ProfileField::ReturnOnEquity => "returnOnEquity",
        }
    }

    /// Human-readable row label.
    pub const fn label(&self) -> &'static str {
        match self {
            ProfileField::LongBusinessSummary => "Business Summary",
            ProfileField::Sector => "Sector",
            ProfileField::FullTimeEmployees => "Employees",
            ProfileField::Website => "Website",
            ProfileField::MarketCap => "Market Cap",
            ProfileField::Beta => "Beta",
            ProfileField::TrailingEps => "EPS",
            ProfileField::TrailingPe => "PE Ratio",
            ProfileField::QuickRatio => "Quick Ratio",
            ProfileField::RevenuePerShare => "Revenue per share",
            ProfileField::ProfitMargins => "Profit Margins",
            ProfileField::DebtToEquity => "Debt to Equity",
            ProfileField::ReturnOnEquity => "Return on Equity",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        ProfileField::ALL.into_iter().find(|f| f.key() == key)
    }
}

/// A profile value, or the explicit "not available" marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Number(f64),
    Text(String),
    #[default]
    NotAvailable,
}

impl FieldValue {
    pub fn is_available(&self) -> bool {
        !matches!(self, FieldValue::NotAvailable)
    }

    /// Convert a JSON scalar. Empty strings, `null` and non-scalars are not available.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => n.as_f64().map_or(FieldValue::NotAvailable, FieldValue::Number),
            },
            serde_json::Value::String(s) if !s.trim().is_empty() => FieldValue::Text(s.clone()),
            _ => FieldValue::NotAvailable,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(v) => write!(f, "{v}"),
            FieldValue::Number(v) => write!(f, "{v}"),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

/// Company metadata with every [`ProfileField`] present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub symbol: String,
    fields: IndexMap<ProfileField, FieldValue>,
}

impl CompanyProfile {
    /// A profile where every field is [`FieldValue::NotAvailable`].
    pub fn unavailable(symbol: impl Into<String>) -> Self {
        Self::from_lookup(symbol, |_| None)
    }

    /// Build a profile by asking `lookup` for each known field.
    pub fn from_lookup<F>(symbol: impl Into<String>, mut lookup: F) -> Self
    where
        F: FnMut(ProfileField) -> Option<FieldValue>,
    {
        let fields = ProfileField::ALL
            .into_iter()
            .map(|field| (field, lookup(field).unwrap_or_default()))
            .collect();
        Self {
            symbol: symbol.into(),
            fields,
        }
    }

    pub fn get(&self, field: ProfileField) -> &FieldValue {
        // every field is inserted on construction
        self.fields.get(&field).unwrap_or(&FieldValue::NotAvailable)
    }

    pub fn set(&mut self, field: ProfileField, value: FieldValue) {
        self.fields.insert(field, value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProfileField, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (*k, v))
    }

    /// `(label, value)` rows for a table of the given fields.
    pub fn rows(&self, fields: &[ProfileField]) -> Vec<(&'static str, String)> {
        fields
            .iter()
            .map(|f| (f.label(), self.get(*f).to_string()))
            .collect()
    }

    /// Number of fields the provider actually reported.
    pub fn available_count(&self) -> usize {
        self.fields.values().filter(|v| v.is_available()).count()
    }
}
