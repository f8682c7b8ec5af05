//!
//! Logging subsystem: configuration types and subscriber setup.
//!

use serde::Deserialize;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub use tracing::{debug, error, event, info, trace, warn, Level};

/// Log output format of a sink.
#[derive(Debug, Default, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable single-line output.
    #[default]
    Console,
    /// Structured JSON output, one object per event.
    Json,
}

/// Console sink configuration.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ConsoleLogConfig {
    /// Whether the console sink is enabled.
    pub enabled: bool,
    /// Filtering directive, `RUST_LOG` syntax (e.g. `info,fieldpay_core=debug`).
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for ConsoleLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_owned(),
            format: LogFormat::default(),
        }
    }
}

/// File sink configuration.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FileLogConfig {
    /// Whether the file sink is enabled.
    pub enabled: bool,
    /// Directory the daily-rotated log files are written to.
    pub directory: String,
    /// File name prefix.
    pub file_name: String,
    /// Filtering directive for the file sink.
    pub level: String,
}

impl Default for FileLogConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: "logs".to_owned(),
            file_name: "fieldpay.log".to_owned(),
            level: "info".to_owned(),
        }
    }
}

/// Top-level logging configuration.
#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default)]
pub struct LogConfig {
    /// Console sink.
    pub console: ConsoleLogConfig,
    /// File sink.
    pub file: FileLogConfig,
}

/// Keeps the non-blocking log writers alive; dropping it flushes and stops
/// background log threads.
#[derive(Debug)]
pub struct TelemetryGuard {
    _log_guards: Vec<WorkerGuard>,
}

/// Set up the logging subsystem from the provided configuration.
///
/// The returned guard must be held for the lifetime of the application.
pub fn setup(config: &LogConfig) -> TelemetryGuard {
    let mut guards = Vec::new();
    let mut layers: Vec<Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync>> = Vec::new();

    if config.console.enabled {
        let filter = env_filter(&config.console.level);
        let layer = tracing_subscriber::fmt::layer().with_target(true);
        match config.console.format {
            LogFormat::Console => layers.push(layer.with_filter(filter).boxed()),
            LogFormat::Json => layers.push(layer.json().with_filter(filter).boxed()),
        }
    }

    if config.file.enabled {
        let appender =
            tracing_appender::rolling::daily(&config.file.directory, &config.file.file_name);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        guards.push(guard);
        let filter = env_filter(&config.file.level);
        layers.push(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(filter)
                .boxed(),
        );
    }

    tracing_subscriber::registry().with(layers).init();

    TelemetryGuard { _log_guards: guards }
}

fn env_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"))
}
