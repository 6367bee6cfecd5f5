//! Core abstractions for ytd-analyst
//!
//! This crate defines the stage trait, the per-query context and the
//! structured outcome types shared by the pipeline and its callers.

pub mod agent;
pub mod context;
pub mod envelope;
pub mod error;

pub use agent::{Agent, guarded};
pub use context::RunContext;
pub use envelope::OutcomeEnvelope;
pub use error::{Stage, StageFailure};
