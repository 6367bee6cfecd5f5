//! Core Agent trait definition

use crate::{RunContext, Stage, StageFailure};
use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tracing::Instrument;

/// One stage of the query pipeline
///
/// Agents are plain functions of their input: they hold no per-query state
/// and never talk to each other. The runner feeds the output of one agent
/// into the next.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Value the stage consumes
    type Input: Send + 'static;
    /// Value the stage produces
    type Output: Send;
    /// Error the stage reports
    type Error: std::error::Error + Send + Sync + 'static;

    /// Process input and return output
    async fn process(
        &self,
        input: Self::Input,
        context: &RunContext,
    ) -> Result<Self::Output, Self::Error>;

    /// Get the agent's name
    fn name(&self) -> &str;

    /// Pipeline stage failures of this agent are reported under
    fn stage(&self) -> Stage;

    /// Short role description, used in debug logs
    fn description(&self) -> &str {
        ""
    }
}

/// Run an agent, containing every error and panic it raises
///
/// The agent's future runs inside a child span of the run context. Errors
/// become a [`StageFailure`] tagged with the agent's stage; a panic is
/// caught and reported the same way instead of unwinding into the caller.
pub async fn guarded<A: Agent>(
    agent: &A,
    input: A::Input,
    context: &RunContext,
) -> Result<A::Output, StageFailure> {
    let stage = agent.stage();
    let span = tracing::info_span!(
        parent: context.span(),
        "stage",
        stage = %stage,
        agent = agent.name()
    );

    let outcome = AssertUnwindSafe(async {
        tracing::debug!(role = agent.description(), "Stage started");
        agent.process(input, context).await
    })
    .catch_unwind()
    .instrument(span.clone())
    .await;

    let _entered = span.enter();
    match outcome {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(err)) => {
            tracing::error!(error = %err, "Stage failed");
            Err(StageFailure::from_error(stage, err))
        }
        Err(payload) => {
            let failure = StageFailure::from_panic(stage, payload.as_ref());
            tracing::error!(error = %failure.message, "Stage panicked");
            Err(failure)
        }
    }
}
