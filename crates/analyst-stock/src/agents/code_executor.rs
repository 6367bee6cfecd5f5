//! Execution agent: runs a deferred analysis behind the stage guard

use analyst_core::{Agent, OutcomeEnvelope, RunContext, Stage, guarded};
use async_trait::async_trait;
use std::sync::Arc;

use crate::analysis::{AnalysisResult, DeferredAnalysis};
use crate::api::MarketData;
use crate::chart::ChartRenderer;
use crate::error::{Result, StockError};

/// Executes a [`DeferredAnalysis`] against the market data and chart collaborators
pub struct CodeExecutorAgent {
    market: Arc<dyn MarketData>,
    renderer: Arc<dyn ChartRenderer>,
}

impl CodeExecutorAgent {
    pub fn new(market: Arc<dyn MarketData>, renderer: Arc<dyn ChartRenderer>) -> Self {
        Self { market, renderer }
    }

    /// Execute once, turning any error or panic into an Execute failure
    pub async fn run(
        &self,
        deferred: DeferredAnalysis,
        context: &RunContext,
    ) -> OutcomeEnvelope<AnalysisResult> {
        let outcome = guarded(self, deferred, context).await;
        if outcome.is_ok() {
            let _entered = context.span().enter();
            tracing::info!("Execution successful.");
        }
        outcome.into()
    }
}

#[async_trait]
impl Agent for CodeExecutorAgent {
    type Input = DeferredAnalysis;
    type Output = AnalysisResult;
    type Error = StockError;

    async fn process(
        &self,
        input: DeferredAnalysis,
        _context: &RunContext,
    ) -> Result<AnalysisResult> {
        input
            .execute(self.market.as_ref(), self.renderer.as_ref())
            .await
    }

    fn name(&self) -> &str {
        "code-executor"
    }

    fn stage(&self) -> Stage {
        Stage::Execute
    }

    fn description(&self) -> &str {
        "Fetches prices, computes the gain and renders the chart"
    }
}
