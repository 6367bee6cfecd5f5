//! Command-line interface for year-to-date stock analysis
//!
//! # Usage
//!
//! ```bash
//! # Default query: "Plot YTD stock gain of Tesla"
//! ytd-analyst
//!
//! # Any other query, charts written to ./charts
//! ytd-analyst --output-dir charts Show YTD gain for AAPL
//!
//! # Print the outcome envelope as JSON
//! ytd-analyst --json Plot Microsoft
//! ```

use analyst_stock::{AnalysisPipeline, AnalysisResult, Outcome, OutputNaming, StockConfig};
use analyst_utils::{LoggingConfig, init_tracing};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

const DEFAULT_QUERY: &str = "Plot YTD stock gain of Tesla";

#[derive(Parser, Debug)]
#[command(name = "ytd-analyst", version)]
#[command(about = "Plot a stock's year-to-date close price and gain", long_about = None)]
struct Args {
    /// Query words, joined with spaces
    query: Vec<String>,

    /// Directory charts are written to
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Market data request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Put the request id in the chart file name
    #[arg(long)]
    per_request_output: bool,

    /// TrueType font for chart text
    #[arg(long, value_name = "PATH")]
    font: Option<PathBuf>,

    /// Extra company alias, checked after the built-in ones
    #[arg(long = "alias", value_name = "NAME=SYMBOL", value_parser = parse_alias)]
    aliases: Vec<(String, String)>,

    /// Print the outcome envelope as JSON
    #[arg(long)]
    json: bool,

    /// Print the failure trace
    #[arg(long)]
    trace: bool,

    /// Debug logging for this tool's crates
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn query(&self) -> String {
        if self.query.is_empty() {
            DEFAULT_QUERY.to_string()
        } else {
            self.query.join(" ")
        }
    }

    /// Flags first, then `ANALYST_*` variables, then defaults
    fn stock_config(&self) -> analyst_stock::Result<StockConfig> {
        let mut builder = StockConfig::builder();
        if let Some(dir) = &self.output_dir {
            builder = builder.output_dir(dir.clone());
        }
        if let Some(secs) = self.timeout {
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        if self.per_request_output {
            builder = builder.output_naming(OutputNaming::PerRequest);
        }
        if let Some(font) = &self.font {
            builder = builder.font_path(font.clone());
        }
        for (name, symbol) in &self.aliases {
            builder = builder.alias(name.as_str(), symbol.as_str());
        }

        builder.with_env().build()
    }
}

fn parse_alias(raw: &str) -> Result<(String, String), String> {
    let (name, symbol) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=SYMBOL, got {raw:?}"))?;
    let (name, symbol) = (name.trim(), symbol.trim());
    if name.is_empty() || symbol.is_empty() {
        return Err(format!("alias name and symbol must be non-empty, got {raw:?}"));
    }
    Ok((name.to_string(), symbol.to_string()))
}

/// Lines one run writes to stdout and stderr
#[derive(Debug, Default, PartialEq, Eq)]
struct Report {
    stdout: Vec<String>,
    stderr: Vec<String>,
    success: bool,
}

impl Report {
    fn from_outcome(outcome: &Outcome, json: bool, trace: bool) -> serde_json::Result<Self> {
        let mut report = Self::default();
        if json {
            report.stdout.push(serde_json::to_string_pretty(outcome)?);
        }

        match outcome {
            Outcome::Success { result } => {
                if !json {
                    report.stdout.extend(result_lines(result));
                }
                report.success = true;
            }
            Outcome::Failure(failure) => {
                report.stderr.push(failure.to_string());
                if let Some(text) = failure.trace.as_ref().filter(|_| trace) {
                    report.stderr.push(text.clone());
                }
            }
        }

        Ok(report)
    }

    fn emit(&self) -> ExitCode {
        for line in &self.stdout {
            println!("{line}");
        }
        for line in &self.stderr {
            eprintln!("{line}");
        }

        if self.success {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

fn result_lines(result: &AnalysisResult) -> Vec<String> {
    result
        .fields()
        .into_iter()
        .map(|(field, value)| format!("{field}: {value}"))
        .chain(std::iter::once(format!("Plot saved to: {}", result.chart_path)))
        .collect()
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
    let mut logging = LoggingConfig::from_env();
    if args.verbose {
        logging = logging.verbose();
    }
    init_tracing(&logging)?;

    let config = args.stock_config().context("Invalid configuration")?;
    let pipeline = AnalysisPipeline::new(&config)?;

    let query = args.query();
    tracing::info!("Starting ytd-analyst");
    let outcome = pipeline.run_query(&query).await;

    if let Outcome::Failure(failure) = &outcome {
        tracing::error!(stage = %failure.stage, "{}", failure.message);
    }

    Ok(Report::from_outcome(&outcome, args.json, args.trace)?.emit())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analyst_core::{Stage, StageFailure};
    use analyst_stock::Intent;
    use chrono::NaiveDate;
    use clap::CommandFactory;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("ytd-analyst").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_default_query() {
        assert_eq!(args(&[]).query(), DEFAULT_QUERY);
        assert_eq!(args(&["Show", "YTD", "for", "AAPL"]).query(), "Show YTD for AAPL");
    }

    #[test]
    fn test_flags_reach_config() {
        let parsed = args(&[
            "--output-dir",
            "charts",
            "--timeout",
            "5",
            "--per-request-output",
            "--alias",
            "nvidia=NVDA",
            "Plot",
            "nvidia",
        ]);
        let config = parsed.stock_config().unwrap();

        assert_eq!(config.output_dir, Some(PathBuf::from("charts")));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.output_naming, OutputNaming::PerRequest);
        assert!(config.extra_aliases.contains(&("nvidia".to_string(), "NVDA".to_string())));
        assert_eq!(parsed.query(), "Plot nvidia");
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        assert!(args(&["--timeout", "0"]).stock_config().is_err());
    }

    fn tesla_result() -> AnalysisResult {
        AnalysisResult {
            symbol: "TSLA".to_string(),
            intent: Intent::PlotYtdAndGain,
            first_date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
            last_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            first_close: 100.0,
            last_close: 150.0,
            pct_gain: 50.0,
            chart_path: "TSLA_ytd_plot.png".to_string(),
            row_count: 2,
        }
    }

    fn no_data_failure() -> Outcome {
        Outcome::failure(
            StageFailure::new(Stage::Execute, "No data returned for ZZZZ")
                .with_trace("No data returned for ZZZZ\n\nStack backtrace: ..."),
        )
    }

    #[test]
    fn test_success_report() {
        let report = Report::from_outcome(&Outcome::success(tesla_result()), false, false).unwrap();

        assert!(report.success);
        assert!(report.stderr.is_empty());
        assert_eq!(report.stdout[0], "symbol: TSLA");
        assert!(report.stdout.contains(&"pct_gain: 50.00%".to_string()));
        assert_eq!(
            report.stdout.last().map(String::as_str),
            Some("Plot saved to: TSLA_ytd_plot.png")
        );
    }

    #[test]
    fn test_failure_report() {
        let report = Report::from_outcome(&no_data_failure(), false, false).unwrap();

        assert!(!report.success);
        assert!(report.stdout.is_empty());
        assert_eq!(
            report.stderr,
            vec!["execute stage failed: No data returned for ZZZZ".to_string()]
        );
    }

    #[test]
    fn test_failure_report_with_trace() {
        let report = Report::from_outcome(&no_data_failure(), false, true).unwrap();

        assert_eq!(report.stderr.len(), 2);
        assert!(report.stderr[1].contains("Stack backtrace"));
    }

    #[test]
    fn test_json_report() {
        let report = Report::from_outcome(&Outcome::success(tesla_result()), true, false).unwrap();

        assert!(report.success);
        assert_eq!(report.stdout.len(), 1);
        let value: serde_json::Value = serde_json::from_str(&report.stdout[0]).unwrap();
        assert_eq!(value["outcome"], "success");
        assert_eq!(value["result"]["symbol"], "TSLA");

        let report = Report::from_outcome(&no_data_failure(), true, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&report.stdout[0]).unwrap();
        assert_eq!(value["stage"], "execute");
        assert!(!report.success);
    }

    #[test]
    fn test_parse_alias() {
        assert_eq!(
            parse_alias("nvidia = NVDA"),
            Ok(("nvidia".to_string(), "NVDA".to_string()))
        );
        assert!(parse_alias("nvidia").is_err());
        assert!(parse_alias("=NVDA").is_err());
    }
}
