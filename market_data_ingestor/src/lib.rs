//! Market data ingestion: vendor-agnostic daily bars and company profiles.
//!
//! * [`models`] holds the canonical bar, series, period and profile types.
//! * [`providers`] defines the [`providers::DataProvider`] trait and its
//!   Yahoo, Alpaca and CSV-directory implementations.
//! * [`normalize`] turns provider output into a validated [`models::bar_series::PriceSeries`].
//! * [`io`] reads and writes the historical CSV format.

pub mod io;
pub mod models;
pub mod normalize;
pub mod providers;
