//! Per-query execution context
//!
//! A `RunContext` is created once per query and handed explicitly to every
//! stage. It carries the request id and the `tracing` span the stages log
//! into, so no component depends on process-wide logging setup.

use tracing::Span;
use uuid::Uuid;

/// Context passed to agents during a single pipeline run
///
/// # Example
///
/// ```
/// use analyst_core::RunContext;
///
/// let ctx = RunContext::new();
/// let other = RunContext::new();
/// assert_ne!(ctx.request_id(), other.request_id());
/// ```
#[derive(Debug, Clone)]
pub struct RunContext {
    request_id: Uuid,
    span: Span,
}

impl RunContext {
    /// Create a context with a fresh request id and its own root span
    pub fn new() -> Self {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("query", request_id = %request_id);
        Self { request_id, span }
    }

    /// Create a context that logs into the given span
    pub fn with_span(span: Span) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            span,
        }
    }

    /// Unique id of this run
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Short form of the request id, suitable for file names
    pub fn short_id(&self) -> String {
        self.request_id.simple().to_string()[..8].to_string()
    }

    /// Span all stages of this run log into
    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}
