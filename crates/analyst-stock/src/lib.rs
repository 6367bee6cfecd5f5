//! Year-to-date stock analysis
//!
//! Turns a short natural-language request such as "Plot YTD stock gain of
//! Tesla" into a ticker, fetches the year's daily closing prices, computes
//! the percentage gain and writes a line chart to disk.
//!
//! # Architecture
//!
//! Three agents run in sequence, each behind [`analyst_core::guarded`]:
//! - `QueryParserAgent`: query text to a [`StructuredRequest`]
//! - `CodeWriterAgent`: request to a [`DeferredAnalysis`]
//! - `CodeExecutorAgent`: runs the analysis against the [`MarketData`] and
//!   [`ChartRenderer`] collaborators
//!
//! [`AnalysisPipeline`] wires them together and always returns an
//! [`OutcomeEnvelope`](analyst_core::OutcomeEnvelope).
//!
//! # Example
//!
//! ```rust,ignore
//! use analyst_stock::{AnalysisPipeline, StockConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = StockConfig::builder().with_env().build()?;
//!     let pipeline = AnalysisPipeline::new(&config)?;
//!
//!     let outcome = pipeline.run_query("Plot YTD stock gain of Tesla").await;
//!     println!("{}", serde_json::to_string_pretty(&outcome)?);
//!     Ok(())
//! }
//! ```

pub mod agents;
pub mod analysis;
pub mod api;
pub mod chart;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod request;

pub use agents::{CodeExecutorAgent, CodeWriterAgent, QueryParserAgent};
pub use analysis::{AnalysisResult, DeferredAnalysis, PricePoint, PriceSeries};
pub use api::{MarketData, MarketDataError, PriceHistory, YahooFinanceClient};
pub use chart::{ChartError, ChartRenderer, LineChart, PlottersChartRenderer};
pub use config::{OutputNaming, StockConfig};
pub use error::{Result, StockError};
pub use pipeline::{AnalysisPipeline, Outcome};
pub use request::{Intent, StructuredRequest};
