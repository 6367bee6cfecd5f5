//! Logging and tracing utilities

use crate::config::{LogFormat, LoggingConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber
///
/// Events go to stderr so stdout stays reserved for command output.
pub fn init_tracing(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&config.filter)
        .or_else(|_| EnvFilter::try_new(crate::config::DEFAULT_FILTER))?;

    let json = config.format == LogFormat::Json;
    let json_layer = json.then(|| fmt::layer().json().with_writer(std::io::stderr));
    let pretty_layer = (!json).then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(pretty_layer)
        .try_init()?;

    Ok(())
}
