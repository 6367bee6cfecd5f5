//! Configuration for stock analysis operations

use crate::error::{Result, StockError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// How chart files are named
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputNaming {
    /// `{symbol}_ytd_plot.png`; later runs for the same symbol overwrite it
    #[default]
    Fixed,
    /// `{symbol}_{request_id}_ytd_plot.png`; unique per run
    PerRequest,
}

/// Configuration for stock analysis operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockConfig {
    /// Timeout applied to every market data request
    pub request_timeout: Duration,

    /// Directory charts are written to (working directory when unset)
    pub output_dir: Option<PathBuf>,

    /// Chart file naming scheme
    pub output_naming: OutputNaming,

    /// Chart width in pixels
    pub chart_width: u32,

    /// Chart height in pixels
    pub chart_height: u32,

    /// TrueType font used for chart text
    pub font_path: Option<PathBuf>,

    /// Company name aliases checked after the built-in table
    pub extra_aliases: Vec<(String, String)>,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            output_dir: None,
            output_naming: OutputNaming::Fixed,
            chart_width: 1200,
            chart_height: 675,
            font_path: None,
            extra_aliases: Vec::new(),
        }
    }
}

impl StockConfig {
    /// Create a new configuration builder
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout.is_zero() {
            return Err(StockError::ConfigError(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        if self.chart_width < 200 || self.chart_height < 150 {
            return Err(StockError::ConfigError(format!(
                "chart size {}x{} is too small (minimum 200x150)",
                self.chart_width, self.chart_height
            )));
        }

        for (name, symbol) in &self.extra_aliases {
            if name.trim().is_empty() || symbol.trim().is_empty() {
                return Err(StockError::ConfigError(format!(
                    "invalid alias '{name}={symbol}'"
                )));
            }
        }

        Ok(())
    }
}

/// Builder for StockConfig
#[derive(Debug, Default)]
pub struct StockConfigBuilder {
    request_timeout: Option<Duration>,
    output_dir: Option<PathBuf>,
    output_naming: Option<OutputNaming>,
    chart_width: Option<u32>,
    chart_height: Option<u32>,
    font_path: Option<PathBuf>,
    extra_aliases: Vec<(String, String)>,
}

impl StockConfigBuilder {
    /// Set the market data request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the chart output directory
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Set the chart naming scheme
    pub fn output_naming(mut self, naming: OutputNaming) -> Self {
        self.output_naming = Some(naming);
        self
    }

    /// Set the chart size in pixels
    pub fn chart_size(mut self, width: u32, height: u32) -> Self {
        self.chart_width = Some(width);
        self.chart_height = Some(height);
        self
    }

    /// Set the font used for chart text
    pub fn font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_path = Some(path.into());
        self
    }

    /// Add a company name alias
    pub fn alias(mut self, name: impl Into<String>, symbol: impl Into<String>) -> Self {
        self.extra_aliases.push((name.into(), symbol.into()));
        self
    }

    /// Apply `ANALYST_*` environment variables for unset fields
    pub fn with_env(self) -> Self {
        self.with_vars(|key| std::env::var(key).ok())
    }

    fn with_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if self.request_timeout.is_none() {
            self.request_timeout = var("ANALYST_REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
        }
        if self.output_dir.is_none() {
            self.output_dir = var("ANALYST_OUTPUT_DIR").map(PathBuf::from);
        }
        if self.font_path.is_none() {
            self.font_path = var("ANALYST_FONT_PATH").map(PathBuf::from);
        }
        if self.output_naming.is_none()
            && matches!(var("ANALYST_PER_REQUEST_OUTPUT").as_deref(), Some("1" | "true" | "yes"))
        {
            self.output_naming = Some(OutputNaming::PerRequest);
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<StockConfig> {
        let defaults = StockConfig::default();

        let config = StockConfig {
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            output_dir: self.output_dir,
            output_naming: self.output_naming.unwrap_or(defaults.output_naming),
            chart_width: self.chart_width.unwrap_or(defaults.chart_width),
            chart_height: self.chart_height.unwrap_or(defaults.chart_height),
            font_path: self.font_path,
            extra_aliases: self.extra_aliases,
        };

        config.validate()?;
        Ok(config)
    }
}
