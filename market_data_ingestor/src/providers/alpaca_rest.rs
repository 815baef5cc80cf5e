//! Alpaca market data provider (`/v2/stocks/bars`).
//!
//! Alpaca serves bars only; company profiles are reported as not available.

mod params;
mod provider;
mod response;

pub use params::{Adjustment, AlpacaBarsParams, Feed, Sort};
pub use provider::{AlpacaProvider, BASE_URL};
