//! Error types for stock analysis operations

use crate::api::MarketDataError;
use crate::chart::ChartError;
use thiserror::Error;

/// Stock analysis specific errors
#[derive(Debug, Error)]
pub enum StockError {
    /// No ticker symbol could be found in the query
    #[error("Couldn't detect ticker from query. Try 'TSLA' or 'Tesla' in the query.")]
    NoTickerFound { query: String },

    /// Structured request cannot be turned into an analysis
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Market data collaborator failed
    #[error("Error fetching data for {symbol}: {source}")]
    DataFetch {
        symbol: String,
        #[source]
        source: MarketDataError,
    },

    /// Both the year-to-date and the explicit range request came back empty
    #[error("No data returned for {symbol} (empty price history). Check ticker or network.")]
    NoData { symbol: String },

    /// Price history lacks a required column
    #[error("No '{field}' column in fetched data for {symbol}")]
    MissingField {
        symbol: String,
        field: &'static str,
    },

    /// Price history columns are inconsistent
    #[error("Malformed price history for {symbol}: {reason}")]
    MalformedData { symbol: String, reason: String },

    /// First close cannot serve as the base of a percentage
    #[error("Invalid baseline close for {symbol}: {first_close}")]
    InvalidBaseline { symbol: String, first_close: f64 },

    /// Chart collaborator failed
    #[error("Chart rendering failed: {0}")]
    Render(#[from] ChartError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;
