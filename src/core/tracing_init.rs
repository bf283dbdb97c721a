use crate::core::config::LoggingConfig;
use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let use_console = config.console || config.format == "console";

    // Exactly one of the two formatters is active
    let console = use_console.then(|| {
        fmt::layer()
            .with_target(true)
            .with_ansi(true)
            .with_line_number(true)
            .with_thread_ids(true)
    });
    let json = (!use_console).then(|| {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(json)
        .try_init()
        .context("Failed to install tracing subscriber")
}
