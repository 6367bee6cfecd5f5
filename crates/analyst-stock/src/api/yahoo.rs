//! Yahoo Finance API client

use super::{MarketData, MarketDataError, PriceHistory};
use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate};
use std::future::Future;
use std::time::Duration;
use time::OffsetDateTime;
use yahoo_finance_api as yahoo;

/// Yahoo Finance API client
#[derive(Debug, Clone)]
pub struct YahooFinanceClient {
    timeout: Duration,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client with the given request timeout
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn connector() -> Result<yahoo::YahooConnector, MarketDataError> {
        yahoo::YahooConnector::new().map_err(|e| MarketDataError::Provider(e.to_string()))
    }

    async fn bounded<T>(
        &self,
        request: impl Future<Output = Result<T, MarketDataError>>,
    ) -> Result<T, MarketDataError> {
        tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| MarketDataError::Timeout(self.timeout))?
    }
}

impl Default for YahooFinanceClient {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[async_trait]
impl MarketData for YahooFinanceClient {
    async fn ytd_history(&self, symbol: &str) -> Result<PriceHistory, MarketDataError> {
        tracing::debug!(symbol, "Requesting ytd range from Yahoo Finance");

        self.bounded(async {
            let response = Self::connector()?
                .get_quote_range(symbol, "1d", "ytd")
                .await
                .map_err(|e| MarketDataError::Provider(e.to_string()))?;
            history_from_response(symbol, &response)
        })
        .await
    }

    async fn daily_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceHistory, MarketDataError> {
        let (start_odt, end_odt) = request_window(start, end)?;
        tracing::debug!(symbol, %start, %end, "Requesting daily history from Yahoo Finance");

        self.bounded(async {
            let response = Self::connector()?
                .get_quote_history(symbol, start_odt, end_odt)
                .await
                .map_err(|e| MarketDataError::Provider(e.to_string()))?;
            history_from_response(symbol, &response)
        })
        .await
    }
}

/// Convert an inclusive date range into the half-open timestamp window Yahoo expects
fn request_window(
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(OffsetDateTime, OffsetDateTime), MarketDataError> {
    if start > end {
        return Err(MarketDataError::InvalidRange(format!("{start} is after {end}")));
    }

    let end_exclusive = end
        .checked_add_days(Days::new(1))
        .ok_or_else(|| MarketDataError::InvalidRange(format!("{end} is out of range")))?;

    Ok((to_offset(start)?, to_offset(end_exclusive)?))
}

fn to_offset(date: NaiveDate) -> Result<OffsetDateTime, MarketDataError> {
    let timestamp = date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
    OffsetDateTime::from_unix_timestamp(timestamp)
        .map_err(|e| MarketDataError::InvalidRange(format!("Invalid timestamp for {date}: {e}")))
}

/// An unknown symbol or an empty window comes back as a response without
/// quotes; that is an empty table, not a provider failure.
fn history_from_response(
    symbol: &str,
    response: &yahoo::YResponse,
) -> Result<PriceHistory, MarketDataError> {
    history_from_quotes(symbol, response.quotes())
}

fn history_from_quotes(
    symbol: &str,
    quotes: Result<Vec<yahoo::Quote>, yahoo::YahooError>,
) -> Result<PriceHistory, MarketDataError> {
    match quotes {
        Ok(quotes) => Ok(PriceHistory::from_rows(quotes.iter().filter_map(|q| {
            let date = DateTime::from_timestamp(q.timestamp, 0)?.date_naive();
            Some((date, q.close))
        }))),
        Err(yahoo::YahooError::NoResult | yahoo::YahooError::NoQuotes) => {
            tracing::debug!(symbol, "Yahoo Finance returned no quotes");
            Ok(PriceHistory::empty())
        }
        Err(e) => Err(MarketDataError::Provider(e.to_string())),
    }
}
