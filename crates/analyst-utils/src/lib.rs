//! Shared utilities for ytd-analyst
//!
//! This crate provides the logging setup used by the binary. Library crates
//! only emit `tracing` events; installing a subscriber is left to the
//! process entry point.

pub mod config;
pub mod logging;

pub use config::{LogFormat, LoggingConfig};
pub use logging::init_tracing;
