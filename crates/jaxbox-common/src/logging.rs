use crate::config::Config;
use tracing_subscriber::EnvFilter;

/// Log formatter selection, exposed as a CLI flag on both binaries
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum TracingFormat {
    /// Use pretty formatter (default in debug mode)
    Pretty,
    /// Use JSON formatter (default in release mode)
    Json,
}

#[cfg(debug_assertions)]
const DEFAULT_TRACING_FORMAT: TracingFormat = TracingFormat::Pretty;
#[cfg(not(debug_assertions))]
const DEFAULT_TRACING_FORMAT: TracingFormat = TracingFormat::Json;

pub fn default_tracing_format() -> TracingFormat {
    DEFAULT_TRACING_FORMAT
}

/// Configure and initialize logging for the launchers
pub fn setup_logging(config: &Config, format: TracingFormat) {
    // RUST_LOG wins; otherwise scope the configured level to our own crates
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let base_level = &config.log_level;
        EnvFilter::new(format!(
            "warn,jaxbox_run={base_level},jaxbox_shell={base_level},jaxbox_common={base_level}"
        ))
    });

    match format {
        TracingFormat::Pretty => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        TracingFormat::Json => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .json()
                .flatten_event(true)
                .init();
        }
    }
}
