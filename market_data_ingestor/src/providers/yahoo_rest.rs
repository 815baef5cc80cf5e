//! Yahoo Finance provider.
//!
//! Bars come from the v8 chart endpoint and company profiles from the
//! quote-summary endpoint. No credentials are needed.

mod provider;
mod response;

pub use provider::{CHART_URL, QUOTE_SUMMARY_URL, YahooProvider, chart_query};
pub use response::{ChartEnvelope, chart_bars, profile_from_summary};
