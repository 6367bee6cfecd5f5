//! Logging configuration

use serde::{Deserialize, Serialize};

/// Default filter when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "warn,analyst_stock=info,analyst_core=info,ytd_analyst=info";

/// Output format of log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable single-line output
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives
    pub filter: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl LoggingConfig {
    /// Read `RUST_LOG` and `ANALYST_LOG_JSON` from the environment
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("RUST_LOG").ok(),
            std::env::var("ANALYST_LOG_JSON").ok(),
        )
    }

    fn from_vars(filter: Option<String>, json: Option<String>) -> Self {
        let defaults = Self::default();
        let format = match json.as_deref().map(str::trim) {
            Some("1" | "true" | "yes") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Self {
            filter: filter
                .filter(|f| !f.trim().is_empty())
                .unwrap_or(defaults.filter),
            format,
        }
    }

    /// Raise the filter to `debug` for this workspace's crates
    pub fn verbose(mut self) -> Self {
        self.filter = "warn,analyst_stock=debug,analyst_core=debug,ytd_analyst=debug".to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoggingConfig::from_vars(None, None);
        assert_eq!(config, LoggingConfig::default());
        assert_eq!(config.format, LogFormat::Pretty);
    }

    #[test]
    fn test_env_overrides() {
        let config = LoggingConfig::from_vars(Some("debug".to_string()), Some("true".to_string()));
        assert_eq!(config.filter, "debug");
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn test_blank_filter_falls_back() {
        let config = LoggingConfig::from_vars(Some("  ".to_string()), Some("no".to_string()));
        assert_eq!(config.filter, DEFAULT_FILTER);
        assert_eq!(config.format, LogFormat::Pretty);
    }

    #[test]
    fn test_format_serde() {
        assert_eq!(serde_json::to_string(&LogFormat::Json).unwrap(), "\"json\"");
    }
}
