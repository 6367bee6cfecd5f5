//! Stage identifiers and the structured failure reported by the pipeline

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Pipeline stage that produced a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Query interpretation
    Parse,
    /// Construction of the deferred analysis
    Build,
    /// Invocation of the deferred analysis
    Execute,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parse => "parse",
            Self::Build => "build",
            Self::Execute => "execute",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single pipeline stage
///
/// `message` is meant for the user; `trace` carries the full error report
/// (cause chain plus backtrace when enabled) for diagnostic logging only.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{stage} stage failed: {message}")]
pub struct StageFailure {
    pub stage: Stage,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

impl StageFailure {
    /// Create a failure without a trace
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
            trace: None,
        }
    }

    /// Build a failure from an error, keeping its full report as the trace
    pub fn from_error<E>(stage: Stage, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let message = err.to_string();
        let report = anyhow::Error::new(err);
        Self {
            stage,
            message,
            trace: Some(format!("{report:?}")),
        }
    }

    /// Build a failure from a caught panic payload
    ///
    /// The payload no longer knows where it was raised, so the backtrace in
    /// `trace` points at the site that caught the unwind, not at the panic.
    pub fn from_panic(stage: Stage, payload: &(dyn std::any::Any + Send)) -> Self {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());

        Self {
            stage,
            message: format!("{stage} stage panicked: {detail}"),
            trace: Some(format!(
                "panic payload: {detail}\nbacktrace at catch site:\n{}",
                std::backtrace::Backtrace::capture()
            )),
        }
    }

    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }
}
