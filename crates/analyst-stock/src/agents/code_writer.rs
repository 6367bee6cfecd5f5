//! Analysis building agent: structured request to a deferred analysis

use analyst_core::{Agent, RunContext, Stage};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::PathBuf;

use crate::analysis::DeferredAnalysis;
use crate::config::{OutputNaming, StockConfig};
use crate::error::{Result, StockError};
use crate::request::StructuredRequest;

/// Longest symbol accepted into a file name
const MAX_SYMBOL_LEN: usize = 12;

/// Turns a structured request into a [`DeferredAnalysis`]
#[derive(Debug, Clone, Default)]
pub struct CodeWriterAgent {
    output_dir: Option<PathBuf>,
    naming: OutputNaming,
}

impl CodeWriterAgent {
    pub fn new(output_dir: Option<PathBuf>, naming: OutputNaming) -> Self {
        Self { output_dir, naming }
    }

    pub fn from_config(config: &StockConfig) -> Self {
        Self::new(config.output_dir.clone(), config.output_naming)
    }

    /// Capture the request as an analysis ending on `as_of`
    pub fn build(
        &self,
        request: StructuredRequest,
        as_of: NaiveDate,
        context: &RunContext,
    ) -> Result<DeferredAnalysis> {
        validate_symbol(&request.symbol)?;
        let chart_path = self.chart_path(&request.symbol, context);
        Ok(DeferredAnalysis::new(request, as_of, chart_path))
    }

    /// Where the chart for `symbol` is written
    pub fn chart_path(&self, symbol: &str, context: &RunContext) -> PathBuf {
        let file_name = match self.naming {
            OutputNaming::Fixed => format!("{symbol}_ytd_plot.png"),
            OutputNaming::PerRequest => format!("{symbol}_{}_ytd_plot.png", context.short_id()),
        };

        match &self.output_dir {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        }
    }
}

/// Symbols end up in file names, so only a conservative alphabet is allowed
fn validate_symbol(symbol: &str) -> Result<()> {
    if symbol.is_empty() || symbol.len() > MAX_SYMBOL_LEN {
        return Err(StockError::InvalidRequest(format!(
            "symbol must be 1 to {MAX_SYMBOL_LEN} characters, got {symbol:?}"
        )));
    }
    if let Some(bad) = symbol
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^')))
    {
        return Err(StockError::InvalidRequest(format!(
            "symbol {symbol:?} contains unsupported character {bad:?}"
        )));
    }
    Ok(())
}

#[async_trait]
impl Agent for CodeWriterAgent {
    type Input = StructuredRequest;
    type Output = DeferredAnalysis;
    type Error = StockError;

    async fn process(
        &self,
        input: StructuredRequest,
        context: &RunContext,
    ) -> Result<DeferredAnalysis> {
        let as_of = chrono::Local::now().date_naive();
        let deferred = self.build(input, as_of, context)?;
        tracing::info!(
            symbol = deferred.symbol(),
            %as_of,
            chart = %deferred.chart_path().display(),
            "Analysis prepared"
        );
        Ok(deferred)
    }

    fn name(&self) -> &str {
        "code-writer"
    }

    fn stage(&self) -> Stage {
        Stage::Build
    }

    fn description(&self) -> &str {
        "Captures the request as a deferred analysis"
    }
}
