//! Query pipeline: parse, build, execute

use analyst_core::{OutcomeEnvelope, RunContext, guarded};
use std::sync::Arc;

use crate::agents::{CodeExecutorAgent, CodeWriterAgent, QueryParserAgent};
use crate::analysis::AnalysisResult;
use crate::api::{MarketData, YahooFinanceClient};
use crate::chart::{ChartRenderer, PlottersChartRenderer};
use crate::config::StockConfig;
use crate::error::Result;

/// Envelope returned for every query
pub type Outcome = OutcomeEnvelope<AnalysisResult>;

/// Runs a query through the parser, writer and executor agents
///
/// The pipeline holds no per-query state; each call gets a fresh
/// [`RunContext`] and short-circuits at the first failing stage.
pub struct AnalysisPipeline {
    parser: QueryParserAgent,
    writer: CodeWriterAgent,
    executor: CodeExecutorAgent,
}

impl AnalysisPipeline {
    /// Pipeline backed by Yahoo Finance and the PNG renderer
    pub fn new(config: &StockConfig) -> Result<Self> {
        let market = Arc::new(YahooFinanceClient::new(config.request_timeout));
        let renderer = Arc::new(PlottersChartRenderer::from_config(config));
        Self::with_collaborators(config, market, renderer)
    }

    /// Pipeline with caller-supplied collaborators
    pub fn with_collaborators(
        config: &StockConfig,
        market: Arc<dyn MarketData>,
        renderer: Arc<dyn ChartRenderer>,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            parser: QueryParserAgent::from_config(config),
            writer: CodeWriterAgent::from_config(config),
            executor: CodeExecutorAgent::new(market, renderer),
        })
    }

    /// Run one query. Never panics and never fails; problems come back as
    /// a `Failure` envelope.
    pub async fn run_query(&self, query: &str) -> Outcome {
        self.run_with_context(query, &RunContext::new()).await
    }

    /// Run one query logging into the given context
    pub async fn run_with_context(&self, query: &str, context: &RunContext) -> Outcome {
        {
            let _entered = context.span().enter();
            tracing::info!(query, "Running query");
        }

        let request = match guarded(&self.parser, query.to_string(), context).await {
            Ok(request) => request,
            Err(failure) => return Outcome::failure(failure),
        };

        let deferred = match guarded(&self.writer, request, context).await {
            Ok(deferred) => deferred,
            Err(failure) => return Outcome::failure(failure),
        };

        self.executor.run(deferred, context).await
    }
}
