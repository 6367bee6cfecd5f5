//! Market data collaborator
//!
//! The pipeline only sees the [`MarketData`] trait. A provider returns a
//! table of dates with an optional close column, in its own chronological
//! order; validating that table is the caller's job.

pub mod yahoo;

pub use yahoo::YahooFinanceClient;

use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a market data provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarketDataError {
    /// Provider rejected the request or could not be reached
    #[error("Market data provider error: {0}")]
    Provider(String),

    /// Provider did not answer in time
    #[error("Market data request timed out after {0:?}")]
    Timeout(Duration),

    /// Requested date range cannot be expressed
    #[error("Invalid date range: {0}")]
    InvalidRange(String),
}

/// Price table as returned by a provider
///
/// `closes` is `None` when the provider returned no closing-price column at
/// all. Rows are kept in provider order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceHistory {
    pub dates: Vec<NaiveDate>,
    pub closes: Option<Vec<f64>>,
}

impl PriceHistory {
    /// Build a table from `(date, close)` rows
    pub fn from_rows(rows: impl IntoIterator<Item = (NaiveDate, f64)>) -> Self {
        let (dates, closes): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
        Self {
            dates,
            closes: Some(closes),
        }
    }

    /// Table with no rows
    pub fn empty() -> Self {
        Self::from_rows(Vec::new())
    }

    /// Table with dates but no close column
    pub fn without_close(dates: Vec<NaiveDate>) -> Self {
        Self {
            dates,
            closes: None,
        }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Source of daily price history
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Daily history from January 1 of the current year through today
    async fn ytd_history(&self, symbol: &str) -> Result<PriceHistory, MarketDataError>;

    /// Daily history for an explicit inclusive date range
    async fn daily_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceHistory, MarketDataError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    #[test]
    fn test_from_rows_keeps_order() {
        let history = PriceHistory::from_rows(vec![(day(3), 101.0), (day(2), 100.0)]);
        assert_eq!(history.len(), 2);
        assert_eq!(history.dates, vec![day(3), day(2)]);
        assert_eq!(history.closes, Some(vec![101.0, 100.0]));
    }

    #[test]
    fn test_empty_and_missing_close() {
        assert!(PriceHistory::empty().is_empty());

        let history = PriceHistory::without_close(vec![day(2)]);
        assert!(!history.is_empty());
        assert!(history.closes.is_none());
    }
}
