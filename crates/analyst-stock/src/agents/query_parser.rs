//! Query parsing agent: free text to a structured request

use analyst_core::{Agent, RunContext, Stage};
use async_trait::async_trait;

use crate::config::StockConfig;
use crate::error::{Result, StockError};
use crate::request::{Intent, StructuredRequest};

/// Uppercase words that look like tickers but are part of the query vocabulary
const STOP_WORDS: &[&str] = &["YTD", "STOCK", "GAIN", "PRICE"];

/// Company names checked in order when no literal ticker is present
const ALIASES: &[(&str, &str)] = &[
    ("tesla", "TSLA"),
    ("apple", "AAPL"),
    ("microsoft", "MSFT"),
    ("google", "GOOGL"),
    ("alphabet", "GOOGL"),
    ("amazon", "AMZN"),
];

/// Words asking for the percentage gain
const GAIN_KEYWORDS: &[&str] = &["gain", "percentage", "change"];

/// Extracts a ticker symbol and intent from a natural-language query
#[derive(Debug, Clone)]
pub struct QueryParserAgent {
    aliases: Vec<(String, String)>,
}

impl Default for QueryParserAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryParserAgent {
    /// Parser with the built-in alias table only
    pub fn new() -> Self {
        Self {
            aliases: ALIASES
                .iter()
                .map(|(name, symbol)| ((*name).to_string(), (*symbol).to_string()))
                .collect(),
        }
    }

    /// Append aliases after the built-in table
    pub fn with_aliases<I, N, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = (N, S)>,
        N: AsRef<str>,
        S: AsRef<str>,
    {
        self.aliases.extend(extra.into_iter().map(|(name, symbol)| {
            (
                name.as_ref().trim().to_lowercase(),
                symbol.as_ref().trim().to_ascii_uppercase(),
            )
        }));
        self
    }

    pub fn from_config(config: &StockConfig) -> Self {
        Self::new().with_aliases(config.extra_aliases.iter().map(|(n, s)| (n, s)))
    }

    /// Parse a query into a structured request
    pub fn interpret(&self, query: &str) -> Result<StructuredRequest> {
        let lower = query.to_lowercase();

        let symbol = Self::literal_ticker(query)
            .or_else(|| self.alias_ticker(&lower))
            .ok_or_else(|| StockError::NoTickerFound {
                query: query.to_string(),
            })?;

        Ok(StructuredRequest::new(symbol, Self::detect_intent(&lower)))
    }

    /// First token of 1-5 uppercase letters that is not a stop word
    fn literal_ticker(query: &str) -> Option<&str> {
        query
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .find(|token| {
                token.chars().count() <= 5
                    && token.chars().all(|c| c.is_alphabetic() && c.is_uppercase())
                    && !STOP_WORDS.contains(token)
            })
    }

    fn alias_ticker(&self, lower: &str) -> Option<&str> {
        self.aliases
            .iter()
            .find(|(name, _)| !name.is_empty() && lower.contains(name.as_str()))
            .map(|(_, symbol)| symbol.as_str())
    }

    fn detect_intent(lower: &str) -> Intent {
        if GAIN_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            Intent::PlotYtdAndGain
        } else {
            Intent::PlotYtd
        }
    }
}

#[async_trait]
impl Agent for QueryParserAgent {
    type Input = String;
    type Output = StructuredRequest;
    type Error = StockError;

    async fn process(&self, input: String, _context: &RunContext) -> Result<StructuredRequest> {
        let request = self.interpret(&input)?;
        tracing::info!(symbol = %request.symbol, intent = %request.intent, "Parsed request");
        Ok(request)
    }

    fn name(&self) -> &str {
        "query-parser"
    }

    fn stage(&self) -> Stage {
        Stage::Parse
    }

    fn description(&self) -> &str {
        "Extracts ticker and intent from the query"
    }
}
