//! Structured request produced by the query parser

use serde::{Deserialize, Serialize};
use std::fmt;

/// What the user asked to see
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Plot year-to-date closing prices
    #[default]
    PlotYtd,
    /// Plot year-to-date closing prices and report the gain
    PlotYtdAndGain,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlotYtd => "plot_ytd",
            Self::PlotYtdAndGain => "plot_ytd_and_gain",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ticker and intent extracted from a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredRequest {
    pub symbol: String,
    pub intent: Intent,
}

impl StructuredRequest {
    pub fn new(symbol: impl Into<String>, intent: Intent) -> Self {
        Self {
            symbol: symbol.into(),
            intent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_names() {
        assert_eq!(Intent::default(), Intent::PlotYtd);
        assert_eq!(Intent::PlotYtdAndGain.to_string(), "plot_ytd_and_gain");
        assert_eq!(
            serde_json::to_string(&Intent::PlotYtd).unwrap(),
            "\"plot_ytd\""
        );
    }
}
