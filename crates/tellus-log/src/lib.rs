//! Structured logging for the terrain engine.
//!
//! Structured, span-based, filterable logging via the `tracing` ecosystem:
//! console output with uptime timestamps and module paths, plus optional
//! JSON file logging for post-mortem analysis. Integrates with the
//! configuration system for runtime log level control.

use std::path::Path;

use tellus_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Console output gets module paths, severity levels, and time since
/// start. The filter comes from `RUST_LOG` when set, otherwise from the
/// config's `debug.log_level`, otherwise from the default. When a log
/// directory is given and `json_file` is set, a structured JSON copy of
/// the stream is written there as well.
///
/// # Examples
///
/// ```no_run
/// use tellus_log::init_logging;
/// use tellus_config::Config;
///
/// // Basic initialization
/// init_logging(None, false, None);
///
/// // With a JSON log file
/// let log_dir = std::path::Path::new("./logs");
/// init_logging(Some(log_dir), true, None);
///
/// // With config override
/// let config = Config::default();
/// init_logging(None, false, Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, json_file: bool, config: Option<&Config>) {
    let filter_str = match config {
        Some(config) if !config.debug.log_level.is_empty() => config.debug.log_level.clone(),
        _ => default_filter_string(),
    };

    // RUST_LOG wins over the configured level.
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if json_file
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join("tellus.log"))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        return;
    }

    subscriber.init();
}

/// Default filter: `info` everywhere, with per-frame terrain and queue
/// chatter kept at `warn` unless explicitly requested.
fn default_filter_string() -> String {
    "info,tellus_terrain=info,tellus_render=info".to_string()
}

/// Create an `EnvFilter` with the default filter string.
///
/// Useful for testing and for getting consistent default behavior.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(default_filter_string())
}
