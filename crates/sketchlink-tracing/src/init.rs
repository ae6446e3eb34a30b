//! Global subscriber setup.

use sketchlink_core::config::LoggingConfig;
use sketchlink_core::error::{BridgeError, Result};
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::event_layer::{BridgeEventLayer, BridgeLogEvent};

/// File name prefix of the daily rolling log files.
pub const LOG_FILE_PREFIX: &str = "sketchlink.log";

/// Noisy dependencies kept at `warn` regardless of the configured level.
const QUIET_TARGETS: &str = "tokio=warn,runtime=warn";

/// Filter directive used by [`init_logging`].
///
/// A non-empty `env_override` (the value of `RUST_LOG`) wins over the
/// configured level.
pub fn filter_directive(config: &LoggingConfig, env_override: Option<&str>) -> String {
    match env_override.map(str::trim).filter(|s| !s.is_empty()) {
        Some(directive) => directive.to_string(),
        None => format!("{},{}", config.level.trim(), QUIET_TARGETS),
    }
}

/// Installs the global tracing subscriber.
///
/// Logs go to stderr (human-readable or JSON lines) and, when
/// `config.directory` is set, to a daily rolling file there. When `events`
/// is given, every event is also forwarded to it as a [`BridgeLogEvent`].
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// life of the process.
///
/// # Errors
///
/// Returns `Config` if the filter directive is invalid or a global
/// subscriber is already installed.
pub fn init_logging(
    config: &LoggingConfig,
    events: Option<mpsc::UnboundedSender<BridgeLogEvent>>,
) -> Result<Option<WorkerGuard>> {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = filter_directive(config, env.as_deref());
    let filter = EnvFilter::try_new(&directive)
        .map_err(|e| BridgeError::config(format!("Invalid log filter '{}': {}", directive, e)))?;

    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let (text_layer, json_layer) = if config.json {
        (None, Some(fmt::layer().json().with_writer(std::io::stderr)))
    } else {
        (Some(fmt::layer().with_target(false).with_writer(std::io::stderr)), None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(text_layer)
        .with(json_layer)
        .with(file_layer)
        .with(events.map(BridgeEventLayer::new))
        .try_init()
        .map_err(|e| BridgeError::config(format!("Failed to install logger: {}", e)))?;

    tracing::debug!(
        directive = %directive,
        json = config.json,
        file = config.directory.is_some(),
        "logging initialized"
    );
    Ok(guard)
}
