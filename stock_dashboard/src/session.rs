//! Per-user dashboard state.

use market_data_ingestor::models::period::QuickPeriod;
use serde::{Deserialize, Serialize};

/// What the user last picked in the quick-period selector.
///
/// Each user owns one; it is handed to the pipeline explicitly and never
/// shared between sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Session {
    quick_period: Option<QuickPeriod>,
}

impl Session {
    /// Session with nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Session with `period` already selected.
    pub fn with_period(period: QuickPeriod) -> Self {
        Self {
            quick_period: Some(period),
        }
    }

    /// Current selection.
    pub fn quick_period(&self) -> Option<QuickPeriod> {
        self.quick_period
    }

    /// Record a click on a quick-period button.
    pub fn select(&mut self, period: QuickPeriod) {
        self.quick_period = Some(period);
    }

    /// Forget the selection; history falls back to the look-back window.
    pub fn clear(&mut self) {
        self.quick_period = None;
    }

    /// Label for the history chart: the period code, or `<days>d`.
    pub fn history_label(&self, lookback_days: u32) -> String {
        match self.quick_period {
            Some(p) => p.as_str().to_string(),
            None => format!("{lookback_days}d"),
        }
    }
}
