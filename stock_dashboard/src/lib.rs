//! Stock dashboard core.
//!
//! Validates what the user asked for, pulls bars and company metadata from a
//! [`DataProvider`](market_data_ingestor::providers::DataProvider), and
//! assembles the analysis and prediction reports a presentation layer renders.

#![deny(missing_docs)]

pub mod config;
pub mod errors;
pub mod export;
pub mod pipeline;
pub mod report;
pub mod session;
pub mod validation;

pub use errors::DashboardError;
pub use pipeline::Dashboard;
pub use session::Session;
